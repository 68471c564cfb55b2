//! # Client Configuration
//!
//! Service endpoint and playback timing in one place.
//!
//! ## Usage
//! ```rust
//! use court_core::config::ClientConfig;
//!
//! let config = ClientConfig::default();
//! assert_eq!(config.playback.frame_interval.as_millis(), 50);
//! ```
//!
//! A file named by `COURT_CONFIG_PATH` (JSON or YAML) replaces the defaults,
//! see [`ClientConfig::from_env_or_default`].

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "COURT_CONFIG_PATH";

/// Remote match service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL; `/match`, `/sequence` and `/health` are appended.
    pub base_url: String,
    /// Per request limit, applied on the HTTP client and around each call.
    #[serde(with = "duration_ms")]
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Frame clock and status display timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Time between frames (20 per second)
    #[serde(with = "duration_ms")]
    pub frame_interval: Duration,
    /// Pause between showing the match result and fetching its frames
    #[serde(with = "duration_ms")]
    pub fetch_delay: Duration,
    /// How long a failed search stays on screen
    #[serde(with = "duration_ms")]
    pub search_failure_display: Duration,
    /// How long a failed sequence fetch stays on screen
    #[serde(with = "duration_ms")]
    pub failure_display: Duration,
    /// How long "complete" stays on screen
    #[serde(with = "duration_ms")]
    pub complete_display: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(50),
            fetch_delay: Duration::from_millis(500),
            search_failure_display: Duration::from_secs(3),
            failure_display: Duration::from_secs(5),
            complete_display: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl ClientConfig {
    /// Local analytics service on the default port.
    pub fn local() -> Self {
        Self::default()
    }

    /// No fetch pause and short display delays, for tests and demos.
    pub fn fast_test() -> Self {
        let mut cfg = Self::default();
        cfg.playback.fetch_delay = Duration::ZERO;
        cfg.playback.search_failure_display = Duration::from_millis(100);
        cfg.playback.failure_display = Duration::from_millis(100);
        cfg.playback.complete_display = Duration::from_millis(100);
        cfg.service.request_timeout = Duration::from_secs(2);
        cfg
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.service.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        let base = self.service.base_url.trim();
        if base.is_empty() {
            return Err("service.base_url must not be empty".to_string());
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(format!("service.base_url must be http(s), got '{base}'"));
        }
        if self.service.request_timeout.is_zero() {
            return Err("service.request_timeout must be > 0".to_string());
        }
        if self.playback.frame_interval.is_zero() {
            return Err("playback.frame_interval must be > 0".to_string());
        }
        Ok(())
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Loads and validates a config file; `.yaml`/`.yml` are read as YAML,
    /// anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse YAML config '{}'", path.display()))?
        } else {
            Self::from_json(&content)
                .with_context(|| format!("Failed to parse JSON config '{}'", path.display()))?
        };

        if let Err(e) = config.validate() {
            bail!("Invalid config '{}': {e}", path.display());
        }
        Ok(config)
    }

    /// Config from `COURT_CONFIG_PATH` when set and non-empty, defaults otherwise.
    pub fn from_env_or_default() -> anyhow::Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        Self::from_path(path).with_context(|| format!("{CONFIG_PATH_ENV}='{path}'"))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.service.base_url, "http://localhost:5001");
        assert_eq!(cfg.playback.frame_interval, Duration::from_millis(50));
        assert_eq!(cfg.playback.fetch_delay, Duration::from_millis(500));
        assert_eq!(cfg.playback.failure_display, Duration::from_secs(5));
        assert_eq!(cfg.playback.complete_display, Duration::from_secs(2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_fast_test_preset_skips_fetch_pause() {
        let cfg = ClientConfig::fast_test();
        assert!(cfg.playback.fetch_delay.is_zero());
        assert!(cfg.playback.failure_display < ClientConfig::default().playback.failure_display);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = ClientConfig::from_json(
            r#"{ "service": { "base_url": "http://court.test:9000" }, "playback": { "frame_interval": 40 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.service.base_url, "http://court.test:9000");
        assert_eq!(cfg.service.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.playback.frame_interval, Duration::from_millis(40));
        assert_eq!(cfg.playback.complete_display, Duration::from_secs(2));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = ClientConfig::default();
        cfg.playback.frame_interval = Duration::ZERO;
        assert!(cfg.validate().unwrap_err().contains("frame_interval"));

        let cfg = ClientConfig::default().with_base_url("ftp://nope");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_path_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "service:\n  base_url: http://10.0.0.2:5001\nplayback:\n  fetch_delay: 0").unwrap();

        let cfg = ClientConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.service.base_url, "http://10.0.0.2:5001");
        assert!(cfg.playback.fetch_delay.is_zero());
    }

    #[test]
    fn test_from_path_reports_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{ "service": {{ "base_url": "" }} }}"#).unwrap();

        let err = ClientConfig::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    // One test owns the variable so parallel tests never race on it
    #[test]
    fn test_from_env_or_default() {
        env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(ClientConfig::from_env_or_default().unwrap(), ClientConfig::default());

        env::set_var(CONFIG_PATH_ENV, "  ");
        assert_eq!(ClientConfig::from_env_or_default().unwrap(), ClientConfig::default());

        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "service:\n  base_url: http://10.0.0.3:5001").unwrap();
        env::set_var(CONFIG_PATH_ENV, file.path());
        let cfg = ClientConfig::from_env_or_default().unwrap();
        assert_eq!(cfg.service.base_url, "http://10.0.0.3:5001");
        assert_eq!(cfg.playback, PlaybackConfig::default());

        env::set_var(CONFIG_PATH_ENV, "/nonexistent/court.yaml");
        let err = ClientConfig::from_env_or_default().unwrap_err();
        env::remove_var(CONFIG_PATH_ENV);
        assert!(format!("{err:#}").contains("COURT_CONFIG_PATH="), "{err:#}");
    }

    #[test]
    fn test_json_round_trip_uses_millis() {
        let json = serde_json::to_value(ClientConfig::default()).unwrap();
        assert_eq!(json["playback"]["frame_interval"], 50);
        assert_eq!(json["service"]["request_timeout"], 10_000);
    }
}
