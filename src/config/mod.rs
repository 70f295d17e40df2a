//! Configuration management.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults ([`WaymarkConfig::default`])
//! 2. A TOML file, either given explicitly or found in the platform config
//!    directory (`~/.config/waymark/config.toml` on Linux)
//! 3. `WAYMARK_*` environment variables
//!
//! ```toml
//! data_dir = "/var/lib/waymark"
//! default_max_tokens = 2000
//!
//! [anchors]
//! min_confidence = 0.6
//! merge_adjacent = false
//!
//! [anchors.weights]
//! marker = 0.95
//!
//! [logging]
//! format = "json"
//! level = "debug"
//! file = "/var/log/waymark.log"
//! ```

use crate::anchors::{AnchorConfig, SignalWeights};
use crate::models::DEFAULT_MAX_TOKENS;
use crate::observability::{LogFormat, LoggingConfig};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "WAYMARK_DATA_DIR";
/// Environment variable overriding the default word budget.
pub const ENV_MAX_TOKENS: &str = "WAYMARK_MAX_TOKENS";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "WAYMARK_LOG_FORMAT";

/// Main configuration for waymark.
#[derive(Debug, Clone, PartialEq)]
pub struct WaymarkConfig {
    /// Directory holding the entry files.
    pub data_dir: PathBuf,
    /// Word budget used when a request does not give one.
    pub default_max_tokens: usize,
    /// Anchor detector settings.
    pub anchors: AnchorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for WaymarkConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            anchors: AnchorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".waymark"),
        |dirs| dirs.data_dir().join("waymark"),
    )
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Default word budget.
    pub default_max_tokens: Option<usize>,
    /// Anchor detector section.
    pub anchors: Option<ConfigFileAnchors>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// `[anchors]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileAnchors {
    /// Minimum confidence.
    pub min_confidence: Option<f64>,
    /// Link related anchors.
    pub include_relationships: Option<bool>,
    /// Merge adjacent anchors.
    pub merge_adjacent: Option<bool>,
    /// Per-type cap.
    pub max_anchors_per_type: Option<usize>,
    /// Signal weights.
    pub weights: Option<ConfigFileWeights>,
}

/// `[anchors.weights]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileWeights {
    /// Marker weight.
    pub marker: Option<f64>,
    /// Explicit phrase weight.
    pub explicit_phrase: Option<f64>,
    /// Context clue weight.
    pub context_clue: Option<f64>,
    /// Punctuation weight.
    pub punctuation: Option<f64>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl WaymarkConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the platform config directory.
    ///
    /// Tries `<config_dir>/waymark/config.toml`, then
    /// `~/.config/waymark/config.toml`. Falls back to defaults when neither
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        let Some(dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        let candidates = [
            dirs.config_dir().join("waymark").join("config.toml"),
            dirs.home_dir()
                .join(".config")
                .join("waymark")
                .join("config.toml"),
        ];
        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Loads the config at `path` if given, otherwise the default location,
    /// then applies process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())
    }

    /// Builds a config from a parsed file, starting from defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file holds an unknown log format or a zero
    /// word budget.
    pub fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = expand_home(&data_dir);
        }
        if let Some(max_tokens) = file.default_max_tokens {
            config.default_max_tokens = validate_max_tokens(max_tokens)?;
        }
        if let Some(anchors) = file.anchors {
            apply_anchor_section(&mut config.anchors, anchors);
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = format.parse()?;
            }
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            if let Some(file) = logging.file {
                config.logging.file = Some(expand_home(&file));
            }
        }

        Ok(config)
    }

    /// Applies `WAYMARK_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed.
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = expand_home(dir.trim());
        }
        if let Some(raw) = lookup(ENV_MAX_TOKENS) {
            let parsed = raw.trim().parse::<usize>().map_err(|e| {
                Error::InvalidInput(format!("{ENV_MAX_TOKENS}={raw:?}: {e}"))
            })?;
            self.default_max_tokens = validate_max_tokens(parsed)?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format.parse()?;
        }
        Ok(self)
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the default word budget.
    #[must_use]
    pub const fn with_default_max_tokens(mut self, max_tokens: usize) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Sets the log format.
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }
}

fn validate_max_tokens(max_tokens: usize) -> Result<usize> {
    if max_tokens == 0 {
        return Err(Error::InvalidInput(
            "default_max_tokens must be greater than zero".to_string(),
        ));
    }
    Ok(max_tokens)
}

fn apply_anchor_section(anchors: &mut AnchorConfig, section: ConfigFileAnchors) {
    if let Some(min_confidence) = section.min_confidence {
        anchors.min_confidence = min_confidence.clamp(0.0, 1.0);
    }
    if let Some(enabled) = section.include_relationships {
        anchors.include_relationships = enabled;
    }
    if let Some(enabled) = section.merge_adjacent {
        anchors.merge_adjacent = enabled;
    }
    if let Some(max) = section.max_anchors_per_type {
        anchors.max_anchors_per_type = max;
    }
    if let Some(weights) = section.weights {
        apply_weights(&mut anchors.weights, &weights);
    }
}

fn apply_weights(weights: &mut SignalWeights, section: &ConfigFileWeights) {
    if let Some(w) = section.marker {
        weights.marker = w;
    }
    if let Some(w) = section.explicit_phrase {
        weights.explicit_phrase = w;
    }
    if let Some(w) = section.context_clue {
        weights.context_clue = w;
    }
    if let Some(w) = section.punctuation {
        weights.punctuation = w;
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
