//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/trajviz/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/trajviz/` (~/.config/trajviz/)
//! - State/Logs: `$XDG_STATE_HOME/trajviz/` (~/.local/state/trajviz/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
pub(crate) fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where conversations are read from
    #[serde(default)]
    pub input: InputConfig,

    /// Where artifacts are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Turn boundary policy
    #[serde(default)]
    pub timing: TimingConfig,

    /// Batch execution options
    #[serde(default)]
    pub build: BuildConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input directory override
#[derive(Debug, Deserialize, Default, Clone)]
pub struct InputConfig {
    /// Override for the conversations directory (defaults to ~/.openhands/conversations)
    pub conversations_dir: Option<PathBuf>,
}

/// Output directory configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Root of the generated site; artifacts land in `<dir>/data`
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

/// Which event sources delimit agent turns and user waits.
///
/// An interval between two consecutive events is a turn when the later event
/// comes from a turn-closing source. An interval that starts at an event from a
/// wait source is user-wait time and never counts toward the conversation total.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_turn_closing_sources")]
    pub turn_closing_sources: Vec<String>,

    #[serde(default = "default_wait_sources")]
    pub wait_sources: Vec<String>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            turn_closing_sources: default_turn_closing_sources(),
            wait_sources: default_wait_sources(),
        }
    }
}

impl TimingConfig {
    pub fn closes_turn(&self, source: &str) -> bool {
        self.turn_closing_sources.iter().any(|s| s == source)
    }

    pub fn is_wait_source(&self, source: &str) -> bool {
        self.wait_sources.iter().any(|s| s == source)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.turn_closing_sources.is_empty() {
            return Err(Error::Config(
                "timing.turn_closing_sources must name at least one source".to_string(),
            ));
        }
        if let Some(source) = self
            .turn_closing_sources
            .iter()
            .find(|s| self.is_wait_source(s))
        {
            return Err(Error::Config(format!(
                "timing: source '{}' cannot both close turns and mark user wait",
                source
            )));
        }
        Ok(())
    }
}

fn default_turn_closing_sources() -> Vec<String> {
    vec!["agent".to_string()]
}

fn default_wait_sources() -> Vec<String> {
    vec!["user".to_string()]
}

/// Batch execution options
#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    /// Process conversations on the rayon worker pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.timing.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/trajviz/config.toml` (~/.config/trajviz/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("trajviz").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/trajviz/` (~/.local/state/trajviz/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("trajviz")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("trajviz.log")
    }

    /// Returns the default conversations directory (~/.openhands/conversations)
    pub fn default_conversations_dir() -> PathBuf {
        home_dir().join(".openhands").join("conversations")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.conversations_dir.is_none());
        assert_eq!(config.output.dir, PathBuf::from("dist"));
        assert_eq!(config.timing.turn_closing_sources, vec!["agent"]);
        assert_eq!(config.timing.wait_sources, vec!["user"]);
        assert!(config.build.parallel);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[input]
conversations_dir = "/data/conversations"

[output]
dir = "/tmp/site"

[timing]
turn_closing_sources = ["agent", "error"]

[build]
parallel = false

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(
            config.input.conversations_dir,
            Some(PathBuf::from("/data/conversations"))
        );
        assert_eq!(config.output.dir, PathBuf::from("/tmp/site"));
        assert!(config.timing.closes_turn("error"));
        assert!(config.timing.is_wait_source("user"));
        assert!(!config.build.parallel);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_timing_validation() {
        assert!(TimingConfig::default().validate().is_ok());

        let overlapping = TimingConfig {
            turn_closing_sources: vec!["agent".to_string()],
            wait_sources: vec!["agent".to_string()],
        };
        assert!(overlapping.validate().is_err());

        let empty = TimingConfig {
            turn_closing_sources: vec![],
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timing\nwait_sources = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(
            expand_tilde(Path::new("/var/data")),
            PathBuf::from("/var/data")
        );
        assert!(expand_tilde(Path::new("~/convs")).ends_with("convs"));
    }
}
