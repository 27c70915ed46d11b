use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use baostock_core::provider::ClientConfig;
use baostock_core::provider::client::{DEFAULT_PASSWORD, DEFAULT_SERVER_ADDR, DEFAULT_USER_ID};
use baostock_mcp::server::{DEFAULT_MCP_HTTP_ADDR, McpHttpServerConfig};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "baostock-mcpd", version, about = "Baostock MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "BAOSTOCK_SERVER_ADDR", default_value = DEFAULT_SERVER_ADDR)]
    server_addr: String,

    #[arg(long, env = "BAOSTOCK_USER_ID", default_value = DEFAULT_USER_ID)]
    user_id: String,

    #[arg(long, env = "BAOSTOCK_PASSWORD", default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    password: String,

    #[arg(
        long,
        env = "BAOSTOCK_CONNECT_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS
    )]
    connect_timeout_secs: u64,

    #[arg(
        long,
        env = "BAOSTOCK_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(
        long = "stdio",
        env = "BAOSTOCK_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(long, env = "BAOSTOCK_MCP_HTTP_ADDR", default_value_t = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "BAOSTOCK_MCP_STATEFUL",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_stateful: bool,

    #[arg(long, env = "BAOSTOCK_LOG")]
    log_filter: Option<String>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct BaostockConfig {
    pub client: ClientConfig,
    pub enable_stdio: bool,
    pub http: McpHttpServerConfig,
    pub log_filter: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl BaostockConfig {
    /// Parses the process arguments and environment.
    ///
    /// # Errors
    /// Returns `ConfigError` when a setting is missing or out of range.
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Log filter directive, falling back to `RUST_LOG` and then `info`.
    #[must_use]
    pub fn log_directive(&self) -> String {
        self.log_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }
}

impl TryFrom<CliArgs> for BaostockConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr = args.server_addr.trim().to_string();
        if server_addr.is_empty() {
            return Err(ConfigError::MissingSetting("BAOSTOCK_SERVER_ADDR"));
        }
        if !server_addr.contains(':') {
            return Err(ConfigError::InvalidSetting {
                name: "BAOSTOCK_SERVER_ADDR",
                value: server_addr,
            });
        }
        if args.user_id.trim().is_empty() {
            return Err(ConfigError::MissingSetting("BAOSTOCK_USER_ID"));
        }
        if args.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "BAOSTOCK_CONNECT_TIMEOUT_SECS",
                value: args.connect_timeout_secs.to_string(),
            });
        }
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "BAOSTOCK_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }

        let client = ClientConfig::new(server_addr)
            .with_credentials(args.user_id.trim(), args.password)
            .with_connect_timeout(Duration::from_secs(args.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(args.request_timeout_secs));
        let http = McpHttpServerConfig::new(args.mcp_http_addr).with_stateful_mode(args.mcp_stateful);
        let log_filter = args.log_filter.filter(|value| !value.trim().is_empty());

        Ok(Self {
            client,
            enable_stdio: args.enable_stdio,
            http,
            log_filter,
        })
    }
}
