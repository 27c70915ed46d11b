pub const KDATA_DAILY_FIELDS: &str = "date,code,open,high,low,close,volume,amount,turn";
pub const KDATA_INDEX_FIELDS: &str = "date,code,open,high,low,close,volume,amount";

pub const FREQUENCY_DAILY: &str = "d";
pub const ADJUST_FLAG_NONE: &str = "3";

pub const YEAR_TYPE_REPORT: &str = "report";

pub const FIELDS_STOCK_BASIC: &str = "code,code_name,ipoDate,outDate,type,status";
pub const FIELDS_ALL_STOCK: &str = "code,tradeStatus,code_name";
pub const FIELDS_TRADE_DATES: &str = "calendar_date,is_trading_day";
pub const FIELDS_DIVIDEND: &str = "code,dividPreNoticeDate,dividAgmPumDate,dividPlanAnnounceDate,dividPlanDate,dividRegistDate,dividOperateDate,dividPayDate,dividStockMarketDate,dividCashPsBeforeTax,dividCashPsAfterTax,dividStocksPs,dividCashStock,dividReserveToStockPs";
pub const FIELDS_STOCK_INDUSTRY: &str = "updateDate,code,code_name,industry,industryClassification";
pub const FIELDS_INDEX_CONSTITUENTS: &str = "updateDate,code,code_name";
pub const FIELDS_ADJUST_FACTOR: &str = "code,dividOperateDate,foreAdjustFactor,backAdjustFactor,adjustFactor";
pub const FIELDS_PROFIT: &str = "code,pubDate,statDate,roeAvg,npMargin,gpMargin,netProfit,epsTTM,MBRevenue,totalShare,liqaShare";
pub const FIELDS_OPERATION: &str = "code,pubDate,statDate,NRTurnRatio,NRTurnDays,INVTurnRatio,INVTurnDays,CATurnRatio,AssetTurnRatio";
pub const FIELDS_GROWTH: &str = "code,pubDate,statDate,YOYEquity,YOYAsset,YOYNI,YOYEPSBasic,YOYPNI";
pub const FIELDS_BALANCE: &str = "code,pubDate,statDate,currentRatio,quickRatio,cashRatio,YOYLiability,liabilityToAsset,assetToEquity";
pub const FIELDS_CASH_FLOW: &str = "code,pubDate,statDate,CAToAsset,NCAToAsset,tangibleAssetToAsset,ebitToInterest,CFOToOR,CFOToNP,CFOToGr";
pub const FIELDS_PERFORMANCE_EXPRESS: &str = "code,performanceExpPubDate,performanceExpStatDate,performanceExpUpdateDate,performanceExpressTotalAsset,performanceExpressNetAsset,performanceExpressEPSChgPct,performanceExpressROEWa,performanceExpressEPSDiluted,performanceExpressGRYOY,performanceExpressOPYOY";
pub const FIELDS_FORECAST: &str = "code,profitForcastExpPubDate,profitForcastExpStatDate,profitForcastType,profitForcastAbstract,profitForcastChgPctUp,profitForcastChgPctDwn";

pub const FIELD_CODE: &str = "code";
pub const FIELD_CODE_NAME: &str = "code_name";

/// Splits a comma separated vendor field list into owned names.
#[must_use]
pub fn split_fields(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fields_trims_and_skips_blanks() {
        assert_eq!(split_fields("code, code_name,,"), vec!["code", "code_name"]);
        assert_eq!(split_fields(KDATA_DAILY_FIELDS).len(), 9);
    }
}
