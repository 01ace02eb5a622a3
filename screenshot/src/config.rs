//! Service configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CHROME_BIN: &str = "chromium";
pub const DEFAULT_CHROME_DEBUG_PORT: u16 = 9222;
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_CDP_CALL_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub chrome_bin: String,
    pub chrome_debug_port: u16,
    pub page_load_timeout: Duration,
    pub settle_delay: Duration,
    pub cdp_call_timeout: Duration,
}

impl ServiceConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: listen port, default 3000
    /// - `CHROME_BIN`: browser executable, default `chromium`
    /// - `CHROME_DEBUG_PORT`: remote debugging port, default 9222
    /// - `PAGE_LOAD_TIMEOUT_MS`: default 30000
    /// - `SETTLE_DELAY_MS`: pause after load before capture, default 1000
    /// - `CDP_CALL_TIMEOUT_MS`: per-command timeout, default 15000
    #[must_use]
    pub fn from_env() -> Self {
        let chrome_bin = std::env::var("CHROME_BIN")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CHROME_BIN.to_owned());
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            chrome_bin,
            chrome_debug_port: env_parse("CHROME_DEBUG_PORT", DEFAULT_CHROME_DEBUG_PORT),
            page_load_timeout: Duration::from_millis(env_parse("PAGE_LOAD_TIMEOUT_MS", DEFAULT_PAGE_LOAD_TIMEOUT_MS)),
            settle_delay: Duration::from_millis(env_parse("SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)),
            cdp_call_timeout: Duration::from_millis(env_parse("CDP_CALL_TIMEOUT_MS", DEFAULT_CDP_CALL_TIMEOUT_MS)),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            chrome_bin: DEFAULT_CHROME_BIN.to_owned(),
            chrome_debug_port: DEFAULT_CHROME_DEBUG_PORT,
            page_load_timeout: Duration::from_millis(DEFAULT_PAGE_LOAD_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            cdp_call_timeout: Duration::from_millis(DEFAULT_CDP_CALL_TIMEOUT_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
