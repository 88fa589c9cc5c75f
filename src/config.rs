use std::env;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::MatchPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Hour-of-day window during which polling runs, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ActiveHours {
    pub start: u32,
    pub end: u32,
}

impl ActiveHours {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self { start: 6, end: 22 }
    }
}

/// Application configuration.
///
/// Values come from an optional TOML file (`VAXWATCH_CONFIG`, falling back
/// to ./vaxwatch.toml when present), with env-var overrides for the common
/// knobs on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Clinic search endpoint
    pub url: String,
    /// Fixed location code sent as the `location` query parameter
    pub location: String,
    /// Search radius sent as the `search_radius` query parameter
    pub search_radius: String,
    /// Substring looked for in site addresses, case-insensitively
    pub target_address: String,
    pub match_policy: MatchPolicy,
    pub poll_interval_minutes: u64,
    pub active_hours: ActiveHours,
    pub snapshot_file: PathBuf,
    pub recipients_file: PathBuf,
    pub password_file: PathBuf,
    pub smtp_relay: String,
    pub smtp_username: String,
    pub mail_from: String,
    /// Replay a local fixture page, mail only the debug recipient, and
    /// ignore the active-hours gate
    pub debug: bool,
    pub debug_fixture: PathBuf,
    pub debug_recipient: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "https://www.mtreadyclinic.org/clinic/search/".to_string(),
            location: "59715".to_string(),
            search_radius: "50+miles".to_string(),
            target_address: "Bozeman".to_string(),
            match_policy: MatchPolicy::default(),
            poll_interval_minutes: 10,
            active_hours: ActiveHours::default(),
            snapshot_file: PathBuf::from("vaccination_sites.json"),
            recipients_file: PathBuf::from("email_list.csv"),
            password_file: PathBuf::from("password.txt"),
            smtp_relay: "smtp.gmail.com".to_string(),
            smtp_username: String::new(),
            mail_from: String::new(),
            debug: false,
            debug_fixture: PathBuf::from("old_listing.html"),
            debug_recipient: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from the TOML file if present, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("VAXWATCH_CONFIG").unwrap_or_else(|_| "vaxwatch.toml".to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("VAXWATCH_POLL_INTERVAL") {
            self.poll_interval_minutes = v;
        }
        if let Ok(v) = env::var("VAXWATCH_TARGET") {
            self.target_address = v;
        }
        if let Some(v) = env_parse("VAXWATCH_DEBUG") {
            self.debug = v;
        }
        if let Ok(v) = env::var("VAXWATCH_SNAPSHOT_FILE") {
            self.snapshot_file = PathBuf::from(v);
        }
        if let Ok(v) = env::var("VAXWATCH_LOG_LEVEL") {
            self.log_level = v;
        }
    }

    /// Query parameters for the clinic search request
    pub fn query_params(&self) -> Vec<(String, String)> {
        vec![
            ("location".to_string(), self.location.clone()),
            ("search_radius".to_string(), self.search_radius.clone()),
        ]
    }

    /// Reject configurations the watcher cannot run with. Called once at
    /// startup so bad settings fail before the loop, not inside it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_minutes must be at least 1".to_string(),
            ));
        }
        if self.active_hours.start > 23 || self.active_hours.end > 23 {
            return Err(ConfigError::Invalid(
                "active_hours must be within 0-23".to_string(),
            ));
        }
        if self.active_hours.start > self.active_hours.end {
            return Err(ConfigError::Invalid(
                "active_hours.start must not exceed active_hours.end".to_string(),
            ));
        }
        if self.target_address.trim().is_empty() {
            return Err(ConfigError::Invalid("target_address is empty".to_string()));
        }
        if self.smtp_username.is_empty() || self.mail_from.is_empty() {
            return Err(ConfigError::Invalid(
                "smtp_username and mail_from must be set".to_string(),
            ));
        }
        if self.debug && self.debug_recipient.is_empty() {
            return Err(ConfigError::Invalid(
                "debug mode needs debug_recipient".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            smtp_username: "watcher@example.com".to_string(),
            mail_from: "watcher@example.com".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval_minutes, 10);
        assert_eq!(config.active_hours, ActiveHours { start: 6, end: 22 });
        assert_eq!(config.target_address, "Bozeman");
        assert_eq!(config.match_policy, MatchPolicy::All);
        assert!(!config.debug);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config: Config = toml::from_str(
            r#"
            target_address = "Livingston"
            match_policy = "first"
            poll_interval_minutes = 5
            active_hours = { start = 8, end = 20 }
            "#,
        )
        .unwrap();

        assert_eq!(config.target_address, "Livingston");
        assert_eq!(config.match_policy, MatchPolicy::First);
        assert_eq!(config.poll_interval_minutes, 5);
        assert_eq!(config.active_hours, ActiveHours { start: 8, end: 20 });
        // Untouched keys keep their defaults
        assert_eq!(config.location, "59715");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<Config>("targett = \"typo\"").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            poll_interval_minutes: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let config = Config {
            active_hours: ActiveHours { start: 22, end: 6 },
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_mail_settings() {
        assert!(Config::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_active_hours_are_inclusive() {
        let window = ActiveHours { start: 6, end: 22 };
        assert!(window.contains(6));
        assert!(window.contains(22));
        assert!(!window.contains(5));
        assert!(!window.contains(23));
    }
}
