use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

use crate::attendance::classify::Policy;
use crate::attendance::time::{ParsedTime, parse_time};

pub const DEFAULT_API_PREFIX: &str = "/api";

// A month of terminal export for a few hundred staff is a few MB
const DEFAULT_IMPORT_MAX_BYTES: &str = "16777216";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Without it punches are kept in process memory
    pub database_url: Option<String>,
    pub api_prefix: String,

    // Rate limiting
    pub rate_import_per_min: u32,
    pub rate_report_per_min: u32,

    /// Body limit for the JSON and CSV import routes
    pub import_max_bytes: usize,

    pub policy: Policy,

    pub log_level: tracing::Level,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            api_prefix: var_or("API_PREFIX", DEFAULT_API_PREFIX),

            rate_import_per_min: parse_var("RATE_IMPORT_PER_MIN", &var_or("RATE_IMPORT_PER_MIN", "30"))?,
            rate_report_per_min: parse_var("RATE_REPORT_PER_MIN", &var_or("RATE_REPORT_PER_MIN", "1000"))?,

            import_max_bytes: parse_var(
                "IMPORT_MAX_BYTES",
                &var_or("IMPORT_MAX_BYTES", DEFAULT_IMPORT_MAX_BYTES),
            )?,

            policy: Policy {
                check_in_target: clock_var("CHECK_IN_TARGET", &var_or("CHECK_IN_TARGET", "08:00"))?,
                check_out_target: clock_var("CHECK_OUT_TARGET", &var_or("CHECK_OUT_TARGET", "17:00"))?,
            },

            log_level: parse_var("LOG_LEVEL", &var_or("LOG_LEVEL", "debug"))?,
            log_dir: var_or("LOG_DIR", "logs"),
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("{key} has invalid value {value:?}: {e}"))
}

// Policy targets use the same reader as punch times, but a typo here must
// not silently become midnight.
fn clock_var(key: &str, value: &str) -> Result<u32> {
    match parse_time(value) {
        ParsedTime::Unparseable => Err(anyhow!("{key} is not a time of day: {value:?}")),
        parsed => Ok(parsed.minutes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup_from(&[("SERVER_ADDR", "127.0.0.1:8080")])).unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.database_url, None);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.rate_import_per_min, 30);
        assert_eq!(config.rate_report_per_min, 1000);
        assert_eq!(config.import_max_bytes, 16 * 1024 * 1024);
        assert_eq!(config.policy, Policy::default());
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "0.0.0.0:9000"),
            ("DATABASE_URL", "mysql://hr:hr@localhost/hr"),
            ("API_PREFIX", "/api/v1"),
            ("CHECK_IN_TARGET", "09.00"),
            ("CHECK_OUT_TARGET", "18:30"),
            ("LOG_LEVEL", "info"),
            ("IMPORT_MAX_BYTES", "1048576"),
        ]))
        .unwrap();

        assert_eq!(config.import_max_bytes, 1_048_576);

        assert_eq!(config.database_url.as_deref(), Some("mysql://hr:hr@localhost/hr"));
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.policy.check_in_target, 540);
        assert_eq!(config.policy.check_out_target, 1110);
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn missing_server_addr() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SERVER_ADDR"));
    }

    #[test]
    fn blank_database_url_means_memory_store() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn rejects_garbled_policy_target() {
        let err = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("CHECK_IN_TARGET", "eight"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CHECK_IN_TARGET"));
    }

    #[test]
    fn rejects_bad_rate() {
        let err = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("RATE_IMPORT_PER_MIN", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RATE_IMPORT_PER_MIN"));
    }
}
