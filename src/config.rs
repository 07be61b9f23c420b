//! Runtime configuration
//!
//! Defaults come from `constants`; a handful of environment variables can
//! override them:
//!
//! - `MARKET_DASHBOARD_API_URL`: provider base URL
//! - `MARKET_DASHBOARD_REQUEST_TIMEOUT_SECS`: HTTP timeout for market listing calls
//! - `MARKET_DASHBOARD_HISTORY_TIMEOUT_SECS`: bounded wait before chart fallback

use crate::constants::{
    COINGECKO_API_URL, HISTORY_DAYS, HISTORY_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS, USER_AGENT,
};
use std::time::Duration;

pub const ENV_API_URL: &str = "MARKET_DASHBOARD_API_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MARKET_DASHBOARD_REQUEST_TIMEOUT_SECS";
pub const ENV_HISTORY_TIMEOUT_SECS: &str = "MARKET_DASHBOARD_HISTORY_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Provider base URL, without trailing slash
    pub api_url: String,
    /// HTTP timeout for market listing requests
    pub request_timeout: Duration,
    /// Bounded wait for the chart history before using fallback data; also
    /// the HTTP timeout of the chart request
    pub history_timeout: Duration,
    /// Days of history requested for the chart
    pub history_days: u32,
    pub user_agent: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: COINGECKO_API_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            history_timeout: Duration::from_secs(HISTORY_TIMEOUT_SECS),
            history_days: HISTORY_DAYS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unparseable values are
    /// logged and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                tracing::warn!(var = ENV_API_URL, "Ignoring empty API URL override");
            } else {
                config.api_url = url.to_string();
            }
        }

        if let Some(secs) = parse_secs(&lookup, ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout = secs;
        }

        if let Some(secs) = parse_secs(&lookup, ENV_HISTORY_TIMEOUT_SECS) {
            config.history_timeout = secs;
        }

        config
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!(var = key, value = %raw, "Ignoring invalid timeout override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.history_timeout, Duration::from_secs(15));
        assert_eq!(config.history_days, 7);
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://pro-api.coingecko.com/api/v3/"),
            (ENV_REQUEST_TIMEOUT_SECS, "4"),
            (ENV_HISTORY_TIMEOUT_SECS, "30"),
        ]));
        assert_eq!(config.api_url, "https://pro-api.coingecko.com/api/v3");
        assert_eq!(config.request_timeout, Duration::from_secs(4));
        assert_eq!(config.history_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_API_URL, "  "),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
            (ENV_HISTORY_TIMEOUT_SECS, "0"),
        ]));
        assert_eq!(config, DashboardConfig::default());
    }
}
