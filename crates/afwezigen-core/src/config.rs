//! Application configuration management.
//!
//! Configuration is read from `~/.config/afwezigen/config.json` when that
//! file exists, then overridden field by field from `AFWEZIGEN_*`
//! environment variables (a `.env` file is loaded by the binary).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "afwezigen";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_INJURIES_URL: &str = "https://api-football-v1.p.rapidapi.com/v3/injuries";
const DEFAULT_FIXTURES_URL: &str = "https://api-football-v1.p.rapidapi.com/v3/fixtures";

/// Eredivisie
const DEFAULT_LEAGUE: u32 = 88;
const DEFAULT_SEASON: u32 = 2024;

/// Cached injuries are served for 12 hours before refetching.
const DEFAULT_CACHE_TTL_HOURS: u64 = 12;

/// The periodic refresh runs on the same 12-hour rhythm.
const DEFAULT_REFRESH_INTERVAL_HOURS: u64 = 12;

/// Upper bound for the TTL and refresh interval: one year.
const MAX_HOURS: u64 = 24 * 366;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Injuries endpoint. Either the API itself or a backend returning the same JSON.
    pub injuries_url: String,
    /// Sent as `league=` when set. Leave unset for a backend URL.
    pub league: Option<u32>,
    /// Sent as `season=` when set.
    pub season: Option<u32>,
    pub fixtures_url: String,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub cache_ttl_hours: u64,
    pub refresh_interval_hours: u64,
    /// Look up the real next fixture for teams whose list is from a past round.
    pub lookup_next_fixture: bool,
    /// Value of the `next=` parameter for the fixture lookup.
    pub next_fixture_count: u32,
    /// JSON object of extra or replacement reason translations.
    pub translations_file: Option<PathBuf>,
    /// Directory for daily rolling log files; stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            injuries_url: DEFAULT_INJURIES_URL.to_string(),
            league: Some(DEFAULT_LEAGUE),
            season: Some(DEFAULT_SEASON),
            fixtures_url: DEFAULT_FIXTURES_URL.to_string(),
            api_key: None,
            api_host: None,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            refresh_interval_hours: DEFAULT_REFRESH_INTERVAL_HOURS,
            lookup_next_fixture: false,
            next_fixture_count: 1,
            translations_file: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            Ok(_) => Self::default(),
            Err(e) => {
                warn!(error = %e, "No config directory, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from `AFWEZIGEN_*` variables as returned by `lookup`.
    /// Unparseable numbers are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(&format!("AFWEZIGEN_{}", name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("INJURIES_URL") {
            self.injuries_url = v;
        }
        if let Some(v) = get("FIXTURES_URL") {
            self.fixtures_url = v;
        }
        if let Some(v) = get("API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = get("API_HOST") {
            self.api_host = Some(v);
        }
        if let Some(v) = get("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("TRANSLATIONS_FILE") {
            self.translations_file = Some(PathBuf::from(v));
        }

        // "none" drops the query parameter, for backends that take none.
        if let Some(v) = get("LEAGUE") {
            self.league = parse_optional_number("AFWEZIGEN_LEAGUE", &v, self.league);
        }
        if let Some(v) = get("SEASON") {
            self.season = parse_optional_number("AFWEZIGEN_SEASON", &v, self.season);
        }

        if let Some(v) = get("CACHE_TTL_HOURS") {
            match v.parse::<u64>() {
                Ok(n) if n <= MAX_HOURS => self.cache_ttl_hours = n,
                _ => warn!(value = %v, max = MAX_HOURS, "Ignoring invalid AFWEZIGEN_CACHE_TTL_HOURS"),
            }
        }
        if let Some(v) = get("REFRESH_HOURS") {
            match v.parse::<u64>() {
                Ok(n) if n > 0 && n <= MAX_HOURS => self.refresh_interval_hours = n,
                _ => warn!(value = %v, "Ignoring invalid AFWEZIGEN_REFRESH_HOURS"),
            }
        }
        if let Some(v) = get("LOOKUP_NEXT_FIXTURE") {
            self.lookup_next_fixture = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Cache TTL, capped at one year for values from the config file.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_ttl_hours.min(MAX_HOURS) as i64)
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        let hours = self.refresh_interval_hours.clamp(1, MAX_HOURS);
        std::time::Duration::from_secs(hours * 60 * 60)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

fn parse_optional_number(name: &str, value: &str, current: Option<u32>) -> Option<u32> {
    if value.eq_ignore_ascii_case("none") {
        return None;
    }
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(variable = name, value = %value, "Ignoring invalid number");
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.league, Some(88));
        assert_eq!(config.cache_ttl().num_milliseconds(), 43_200_000);
        assert_eq!(config.refresh_interval().as_millis(), 43_200_000);
        assert!(!config.lookup_next_fixture);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("AFWEZIGEN_INJURIES_URL", "http://localhost:5000/injuries"),
            ("AFWEZIGEN_LEAGUE", "none"),
            ("AFWEZIGEN_SEASON", "2025"),
            ("AFWEZIGEN_API_KEY", "  secret  "),
            ("AFWEZIGEN_CACHE_TTL_HOURS", "6"),
            ("AFWEZIGEN_LOOKUP_NEXT_FIXTURE", "yes"),
        ]));

        assert_eq!(config.injuries_url, "http://localhost:5000/injuries");
        assert_eq!(config.league, None);
        assert_eq!(config.season, Some(2025));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.cache_ttl_hours, 6);
        assert!(config.lookup_next_fixture);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("AFWEZIGEN_SEASON", "last year"),
            ("AFWEZIGEN_REFRESH_HOURS", "0"),
            ("AFWEZIGEN_API_HOST", ""),
        ]));
        assert_eq!(config.season, Some(2024));
        assert_eq!(config.refresh_interval_hours, 12);
        assert_eq!(config.api_host, None);
    }

    #[test]
    fn test_out_of_range_hours() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("AFWEZIGEN_CACHE_TTL_HOURS", "9999999999999999"),
            ("AFWEZIGEN_REFRESH_HOURS", "18446744073709551615"),
        ]));
        assert_eq!(config.cache_ttl_hours, 12);
        assert_eq!(config.refresh_interval_hours, 12);

        // Same values straight from a config file
        let config: Config = serde_json::from_str(
            r#"{"cache_ttl_hours": 18446744073709551615, "refresh_interval_hours": 9999999999999999}"#,
        )
        .unwrap();
        assert_eq!(config.cache_ttl(), chrono::Duration::hours(24 * 366));
        assert_eq!(config.refresh_interval().as_secs(), 24 * 366 * 3600);

        let config = Config {
            cache_ttl_hours: 0,
            refresh_interval_hours: 0,
            ..Config::default()
        };
        assert_eq!(config.cache_ttl(), chrono::Duration::zero());
        assert_eq!(config.refresh_interval().as_secs(), 3600);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_key": "abc", "lookup_next_fixture": true}"#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert!(config.lookup_next_fixture);
        assert_eq!(config.injuries_url, DEFAULT_INJURIES_URL);
    }
}
