use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_TERM_MONTHS: u32 = 6;

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Length of the term used when a board is opened without dates
    pub term_months: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("GBS_PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("GBS_PORT is not a port: {}", raw))?,
            None => DEFAULT_PORT,
        };
        let term_months = match get("GBS_TERM_MONTHS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("GBS_TERM_MONTHS is not a number: {}", raw))?,
            None => DEFAULT_TERM_MONTHS,
        };

        Ok(Self {
            api_base_url: get("GBS_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_token: get("GBS_API_TOKEN"),
            port,
            static_dir: PathBuf::from(get("GBS_STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())),
            term_months,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api_token, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.term_months, 6);
    }

    #[test]
    fn values_are_read_and_blank_ones_ignored() {
        let config = config_from(&[
            ("GBS_API_BASE_URL", "https://attendance.example.org/api"),
            ("GBS_API_TOKEN", "  "),
            ("GBS_PORT", "9090"),
            ("GBS_TERM_MONTHS", "12"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url, "https://attendance.example.org/api");
        assert_eq!(config.api_token, None);
        assert_eq!(config.port, 9090);
        assert_eq!(config.term_months, 12);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = config_from(&[("GBS_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("GBS_PORT"));
    }
}
