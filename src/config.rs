use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::utils::CurrencyStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub api_url: String,
    pub timeout: Duration,
    pub report_path: PathBuf,
    pub currency_style: CurrencyStyle,
}

impl Config {
    /// Builds the config from a key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = match lookup("LOTOFACIL_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("LOTOFACIL_TIMEOUT_SECS is not a number: {}", raw))?;
                if secs == 0 {
                    bail!("LOTOFACIL_TIMEOUT_SECS must be positive");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let currency_style = match lookup("LOTOFACIL_CURRENCY_STYLE") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => CurrencyStyle::default(),
        };

        Ok(Config {
            database_path: lookup("LOTOFACIL_DB_PATH")
                .unwrap_or_else(|| "data/lotofacil.db".to_string())
                .into(),
            api_url: lookup("LOTOFACIL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
            report_path: lookup("LOTOFACIL_REPORT_PATH")
                .unwrap_or_else(|| "reports".to_string())
                .into(),
            currency_style,
        })
    }
}

pub fn load() -> Result<Config> {
    Config::from_lookup(|key| env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.database_path, PathBuf::from("data/lotofacil.db"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.report_path, PathBuf::from("reports"));
        assert_eq!(config.currency_style, CurrencyStyle::BrazilianLocale);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("LOTOFACIL_DB_PATH", "/tmp/cache.db"),
            ("LOTOFACIL_API_URL", "http://localhost:8080/lotofacil"),
            ("LOTOFACIL_TIMEOUT_SECS", "3"),
            ("LOTOFACIL_CURRENCY_STYLE", "manual"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/cache.db"));
        assert_eq!(config.api_url, "http://localhost:8080/lotofacil");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.currency_style, CurrencyStyle::Manual);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup_from(&[("LOTOFACIL_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("LOTOFACIL_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("LOTOFACIL_CURRENCY_STYLE", "yen")])).is_err());
    }
}
