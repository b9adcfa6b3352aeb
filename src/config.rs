use std::time::Duration;

use crate::models::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;
pub const DEFAULT_APP_NAME: &str = "FormFlow";

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub page_size: u32,
    pub autosave_delay: Duration,
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("no .env file loaded: {e}");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset; malformed
    /// numbers fall back to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let page_size = match get("PAGE_SIZE").map(|v| v.parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                log::warn!("PAGE_SIZE is not a positive integer, using {}", defaults.page_size);
                defaults.page_size
            }
            None => defaults.page_size,
        };

        let autosave_delay = match get("AUTOSAVE_DELAY_MS").map(|v| v.parse::<u64>()) {
            Some(Ok(ms)) => Duration::from_millis(ms),
            Some(Err(_)) => {
                log::warn!("AUTOSAVE_DELAY_MS is not an integer, using {DEFAULT_AUTOSAVE_DELAY_MS}");
                defaults.autosave_delay
            }
            None => defaults.autosave_delay,
        };

        Self {
            api_url: get("FORMFLOW_API_URL").unwrap_or(defaults.api_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_key: get("SESSION_KEY"),
            page_size,
            autosave_delay,
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("FORMFLOW_API_URL", "http://api.internal:9000"),
            ("PAGE_SIZE", "25"),
            ("AUTOSAVE_DELAY_MS", "500"),
            ("APP_NAME", "Portal"),
        ]));
        assert_eq!(cfg.api_url, "http://api.internal:9000");
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.autosave_delay, Duration::from_millis(500));
        assert_eq!(cfg.app_name, "Portal");
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let cfg = AppConfig::from_lookup(lookup(&[("PAGE_SIZE", "0"), ("AUTOSAVE_DELAY_MS", "soon"), ("SESSION_KEY", "  ")]));
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.autosave_delay, Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS));
        assert_eq!(cfg.session_key, None);
    }
}
