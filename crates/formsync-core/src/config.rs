#![forbid(unsafe_code)]

//! Binding configuration.
//!
//! [`BindingConfig`] is the user-facing surface (what a host reads from a
//! TOML or JSON file, or builds in code). [`BindingConfig::validate`] turns it
//! into [`BindingSettings`], the checked form the runtime consumes.
//!
//! ```toml
//! path = "todos.newTodoForm"
//! debounce_ms = 250        # negative disables debouncing
//! clear_on_teardown = true
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing `path` | Omitted key | Parse error |
//! | Empty path / segment | `""`, `"a..b"` | [`ConfigError::Path`] |
//! | Unknown key | Typo | Parse error |
//! | Negative `debounce_ms` | Intentional | Debouncing disabled |

use core::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::path::{PathError, RecordPath};

/// Debounce window applied when the configuration does not name one.
pub const DEFAULT_DEBOUNCE_MS: i64 = 100;

fn default_debounce_ms() -> i64 {
    DEFAULT_DEBOUNCE_MS
}

/// Errors from loading or validating a [`BindingConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    Toml(String),
    /// The JSON document could not be parsed.
    Json(String),
    /// The configured path is not a valid record path.
    Path(PathError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml(msg) => write!(f, "invalid binding config (toml): {msg}"),
            Self::Json(msg) => write!(f, "invalid binding config (json): {msg}"),
            Self::Path(err) => write!(f, "invalid binding path: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Path(err) => Some(err),
            Self::Toml(_) | Self::Json(_) => None,
        }
    }
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Path(err)
    }
}

/// Configuration of a single form binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Dotted path of the record in the store.
    pub path: String,

    /// Outbound debounce window in milliseconds. Negative disables it.
    /// Default: 100
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: i64,

    /// Reset the record to nulls when the binding is torn down.
    /// Default: false
    #[serde(default)]
    pub clear_on_teardown: bool,
}

impl BindingConfig {
    /// Configuration for `path` with default debounce and no clearing.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            clear_on_teardown: false,
        }
    }

    #[must_use]
    pub fn with_clear_on_teardown(mut self, clear: bool) -> Self {
        self.clear_on_teardown = clear;
        self
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|err| ConfigError::Toml(err.to_string()))
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(input).map_err(|err| ConfigError::Json(err.to_string()))
    }

    /// Check the configuration and resolve it into [`BindingSettings`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Path`] when `path` is not a valid record path.
    pub fn validate(&self) -> Result<BindingSettings, ConfigError> {
        Ok(BindingSettings {
            path: RecordPath::parse(&self.path)?,
            debounce: DebounceWindow::from_millis(self.debounce_ms),
            clear_on_teardown: self.clear_on_teardown,
        })
    }
}

/// Outbound rate limit of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceWindow {
    /// Forward every emission immediately.
    Disabled,
    /// Trailing-edge debounce over this window.
    Window(Duration),
}

impl DebounceWindow {
    /// Negative values are the "disabled" sentinel.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        u64::try_from(millis).map_or(Self::Disabled, |ms| Self::Window(Duration::from_millis(ms)))
    }

    /// The window, or `None` when disabled.
    #[must_use]
    pub const fn duration(self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Window(window) => Some(window),
        }
    }
}

impl Default for DebounceWindow {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DEBOUNCE_MS)
    }
}

/// Validated binding configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSettings {
    pub path: RecordPath,
    pub debounce: DebounceWindow,
    pub clear_on_teardown: bool,
}

impl BindingSettings {
    /// Settings for `path` with the default window and no clearing.
    #[must_use]
    pub fn new(path: RecordPath) -> Self {
        Self {
            path,
            debounce: DebounceWindow::default(),
            clear_on_teardown: false,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: DebounceWindow) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_clear_on_teardown(mut self, clear: bool) -> Self {
        self.clear_on_teardown = clear;
        self
    }
}

impl TryFrom<&BindingConfig> for BindingSettings {
    type Error = ConfigError;

    fn try_from(config: &BindingConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BindingConfig::new("f");
        assert_eq!(config.debounce_ms, 100);
        assert!(!config.clear_on_teardown);
        let settings = config.validate().unwrap();
        assert_eq!(
            settings.debounce,
            DebounceWindow::Window(Duration::from_millis(100))
        );
    }

    #[test]
    fn toml_with_defaults() {
        let config = BindingConfig::from_toml_str(r#"path = "todos.form""#).unwrap();
        assert_eq!(config, BindingConfig::new("todos.form"));
    }

    #[test]
    fn toml_full() {
        let config = BindingConfig::from_toml_str(
            r#"
            path = "a.b"
            debounce_ms = -1
            clear_on_teardown = true
            "#,
        )
        .unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.path.segments(), ["a", "b"]);
        assert_eq!(settings.debounce, DebounceWindow::Disabled);
        assert!(settings.clear_on_teardown);
    }

    #[test]
    fn toml_rejects_unknown_keys_and_missing_path() {
        assert!(matches!(
            BindingConfig::from_toml_str("path = \"a\"\ndebounce = 5"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            BindingConfig::from_toml_str("debounce_ms = 5"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn json_config() {
        let config =
            BindingConfig::from_json_str(r#"{"path": "f", "debounce_ms": 0}"#).unwrap();
        assert_eq!(
            config.validate().unwrap().debounce,
            DebounceWindow::Window(Duration::ZERO)
        );
        assert!(matches!(
            BindingConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn invalid_path_is_reported() {
        let err = BindingConfig::new("").validate().unwrap_err();
        assert_eq!(err, ConfigError::Path(PathError::Empty));
        assert!(err.to_string().contains("record path is empty"));
        assert!(BindingSettings::try_from(&BindingConfig::new("a..b")).is_err());
    }

    #[test]
    fn window_sentinel() {
        assert_eq!(DebounceWindow::from_millis(-5), DebounceWindow::Disabled);
        assert_eq!(DebounceWindow::Disabled.duration(), None);
        assert_eq!(
            DebounceWindow::from_millis(20).duration(),
            Some(Duration::from_millis(20))
        );
    }
}
