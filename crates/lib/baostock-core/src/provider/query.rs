use std::fmt;
use std::str::FromStr;

/// Financial statement categories queried for a quarterly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialKind {
    Profit,
    Operation,
    Growth,
    Balance,
    CashFlow,
}

impl FinancialKind {
    pub const ALL: [Self; 5] = [
        Self::Profit,
        Self::Operation,
        Self::Growth,
        Self::Balance,
        Self::CashFlow,
    ];
}

/// Macro-economic series selectable by `data_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Gdp,
    Ppi,
    Cpi,
    Pmi,
}

impl MacroKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gdp => "gdp",
            Self::Ppi => "ppi",
            Self::Cpi => "cpi",
            Self::Pmi => "pmi",
        }
    }
}

impl FromStr for MacroKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gdp" => Ok(Self::Gdp),
            "ppi" => Ok(Self::Ppi),
            "cpi" => Ok(Self::Cpi),
            "pmi" => Ok(Self::Pmi),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indexes whose constituents can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Hs300,
    Zz500,
    Sz50,
}

impl IndexKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs300 => "hs300",
            Self::Zz500 => "zz500",
            Self::Sz50 => "sz50",
        }
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hs300" => Ok(Self::Hs300),
            "zz500" => Ok(Self::Zz500),
            "sz50" => Ok(Self::Sz50),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VendorQuery {
    StockBasic {
        code: String,
    },
    KData {
        code: String,
        fields: String,
        start_date: String,
        end_date: String,
        frequency: String,
        adjust_flag: String,
    },
    AllStock {
        day: String,
    },
    Financial {
        kind: FinancialKind,
        code: String,
        year: i32,
        quarter: u32,
    },
    TradeDates {
        start_date: String,
        end_date: String,
    },
    Dividend {
        code: String,
        year: String,
        year_type: String,
    },
    Industry {
        code: String,
    },
    Macro {
        kind: MacroKind,
        year: String,
    },
    Constituents {
        index: IndexKind,
        date: String,
    },
    AdjustFactor {
        code: String,
        start_date: String,
        end_date: String,
    },
    PerformanceExpress {
        code: String,
        start_date: String,
        end_date: String,
    },
    Forecast {
        code: String,
        start_date: String,
        end_date: String,
    },
}

impl VendorQuery {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StockBasic { .. } => "stock_basic",
            Self::KData { .. } => "k_data",
            Self::AllStock { .. } => "all_stock",
            Self::Financial { kind, .. } => match kind {
                FinancialKind::Profit => "profit",
                FinancialKind::Operation => "operation",
                FinancialKind::Growth => "growth",
                FinancialKind::Balance => "balance",
                FinancialKind::CashFlow => "cash_flow",
            },
            Self::TradeDates { .. } => "trade_dates",
            Self::Dividend { .. } => "dividend",
            Self::Industry { .. } => "industry",
            Self::Macro { .. } => "macro",
            Self::Constituents { .. } => "constituents",
            Self::AdjustFactor { .. } => "adjust_factor",
            Self::PerformanceExpress { .. } => "performance_express",
            Self::Forecast { .. } => "forecast",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_parse_known_names() {
        assert_eq!("cpi".parse::<MacroKind>(), Ok(MacroKind::Cpi));
        assert_eq!("sz50".parse::<IndexKind>(), Ok(IndexKind::Sz50));
        assert_eq!("GDP".parse::<MacroKind>(), Err("GDP".to_string()));
        assert_eq!("csi1000".parse::<IndexKind>(), Err("csi1000".to_string()));
    }
}
