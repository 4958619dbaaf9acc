use anyhow::{Context, Result};
use market_data::YahooConfig;
use ml_client::LlmConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MARKET_DATA_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PRICE_HISTORY_MONTHS: u32 = 6;

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
    pub market_data: YahooConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        fn parsed<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match raw {
                Some(value) => value.parse().with_context(|| format!("Invalid {}: {:?}", key, value)),
                None => Ok(default),
            }
        }

        let bind_addr = parsed(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 3000)),
        )?;

        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            endpoint: get("LLM_API_URL").unwrap_or(llm_defaults.endpoint),
            api_key: get("LLM_API_KEY"),
            model: get("LLM_MODEL").unwrap_or(llm_defaults.model),
            timeout: Duration::from_secs(parsed(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
        };

        let market_data = YahooConfig {
            timeout: Duration::from_secs(parsed(
                "MARKET_DATA_TIMEOUT_SECS",
                get("MARKET_DATA_TIMEOUT_SECS"),
                DEFAULT_MARKET_DATA_TIMEOUT_SECS,
            )?),
            history_months: parsed(
                "PRICE_HISTORY_MONTHS",
                get("PRICE_HISTORY_MONTHS"),
                DEFAULT_PRICE_HISTORY_MONTHS,
            )?,
            ..YahooConfig::default()
        };

        Ok(Self { bind_addr, llm, market_data })
    }
}
