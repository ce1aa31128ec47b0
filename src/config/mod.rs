//! Configuration management for dailytop.
//!
//! Configuration is read from `~/.config/dailytop/config.toml` at startup
//! (or the path given with `--config`). If the file doesn't exist, a default
//! configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub poll: PollConfig,
    pub store: StoreConfig,
    pub export: ExportConfig,
    pub publish: PublishConfig,
    pub clock: ClockConfig,
}

/// Where ranked listings come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    /// Listing to poll, appended to `base_url` as `<key>.json`
    pub key: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub limit: Option<u32>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com/r/".into(),
            key: "all".into(),
            user_agent: "dailytop:bot".into(),
            timeout_secs: 10,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Minimum time between cycle starts, e.g. "30s", "5m"
    pub interval: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: "30s".into(),
        }
    }
}

impl PollConfig {
    pub fn interval_secs(&self) -> Result<u64, ConfigError> {
        let secs = parse_interval(&self.interval).map_err(ConfigError::Invalid)?;
        if secs == 0 {
            return Err(ConfigError::Invalid("Poll interval must be positive".into()));
        }
        Ok(secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; defaults to the platform data directory
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Prefix for permalinks, category and author links
    pub link_base: String,
    /// Image shown instead of thumbnails of sensitive items
    pub nsfw_image: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            link_base: "http://reddit.com".into(),
            nsfw_image: "../../nsfw.jpg".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    pub remote: String,
    pub branch: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remote: "origin".into(),
            branch: "master".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Fixed UTC offset in hours; the local offset at startup when unset
    pub utc_offset_hours: Option<i32>,
}

/// Parse interval string like "30s", "5m", "1h", "1d", or raw seconds.
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (value, unit, multiplier) = if let Some(hours) = s.strip_suffix('h') {
        (hours, "hours", 3600)
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes, "minutes", 60)
    } else if let Some(days) = s.strip_suffix('d') {
        (days, "days", 86400)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, "seconds", 1)
    } else {
        return s
            .parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '30s', '5m', '1h'", s));
    };

    value
        .parse::<u64>()
        .map_err(|_| format!("Invalid {}: {}", unit, value))?
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Interval too large: {}", s))
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/dailytop/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("dailytop").join("config.toml"))
    }

    /// Database path: the configured one, or `<data_dir>/dailytop/dailytop.db`.
    pub fn db_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.store.path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        let dailytop_dir = data_dir.join("dailytop");
        fs::create_dir_all(&dailytop_dir).map_err(|e| ConfigError::Io {
            path: dailytop_dir.clone(),
            source: e,
        })?;
        Ok(dailytop_dir.join("dailytop.db"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# dailytop configuration

[source]
# Listing endpoint; the source key is appended as "<key>.json"
base_url = "https://www.reddit.com/r/"
key = "all"
user_agent = "dailytop:bot"
timeout_secs = 10
# Number of entries to request (source default when omitted)
# limit = 100

[poll]
# Minimum time between cycle starts: "30s", "5m", "1h"
interval = "30s"

[store]
# Database file (default: <data dir>/dailytop/dailytop.db)
# path = "/var/lib/dailytop/dailytop.db"

[export]
# Daily leaderboards are written to <output_dir>/<YYYY>/<MM>/<MM-DD-YYYY>.md
output_dir = "."
link_base = "http://reddit.com"
# Relative to the generated file, i.e. <output_dir>/nsfw.jpg
nsfw_image = "../../nsfw.jpg"

[publish]
# Commit and push output_dir with git after each export
enabled = false
remote = "origin"
branch = "master"

[clock]
# Fixed UTC offset used to compute the calendar day (default: local offset at startup)
# utc_offset_hours = 0
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for crate::app::DailyTopError {
    fn from(e: ConfigError) -> Self {
        crate::app::DailyTopError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.source.key, "all");
        assert_eq!(config.poll.interval_secs().unwrap(), 30);
        assert!(!config.publish.enabled);
        assert_eq!(config.clock.utc_offset_hours, None);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[source]
key = "pics"

[publish]
enabled = true
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.source.key, "pics");
        assert_eq!(config.source.base_url, "https://www.reddit.com/r/");
        assert!(config.publish.enabled);
        assert_eq!(config.publish.branch, "master");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.source.timeout_secs, 10);
        assert_eq!(config.poll.interval, "30s");
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.source.key, "all");

        // Second load parses the file it just wrote.
        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.poll.interval, "30s");
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[poll\ninterval = ").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("30m").unwrap(), 1800);
        assert_eq!(parse_interval("1d").unwrap(), 86400);
        assert_eq!(parse_interval("30s").unwrap(), 30);
        assert_eq!(parse_interval("45").unwrap(), 45);
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn test_parse_interval_overflow() {
        assert!(parse_interval("9999999999999999h").is_err());
        assert!(parse_interval("999999999999999999d").is_err());
        assert_eq!(parse_interval("2h").unwrap(), 7200);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let poll = PollConfig {
            interval: "0s".into(),
        };
        assert!(poll.interval_secs().is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(30), "30s");
        assert_eq!(format_interval(1800), "30m");
        assert_eq!(format_interval(7200), "2h");
        assert_eq!(format_interval(86400), "1d");
        assert_eq!(format_interval(90), "90s");
    }
}
