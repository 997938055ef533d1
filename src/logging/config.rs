//! Logging configuration file format
//!
//! The file is a YAML document:
//!
//! ```yaml
//! version: 1
//! formatters:
//!   simple:
//!     format: "{level} - {message}"
//! handlers:
//!   console:
//!     level: WARNING
//!     formatter: simple
//!     stream: stdout
//!   file_handler:
//!     level: DEBUG
//!     filename: debug.log
//! root:
//!   level: WARNING
//!   handlers: [console, file_handler]
//! ```
//!
//! `handlers` and `root` are required, but their presence is checked while
//! reconciling so that a missing key can be reported by name.

use mcuprog_core::LogLevel;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while loading or applying a logging configuration
///
/// Every variant is recoverable: the caller reverts to basic logging.
#[derive(Debug, Error)]
pub enum LoggingConfigError {
    /// Configuration file does not exist
    #[error("Unable to open logging config file '{}'", .0.display())]
    Missing(PathBuf),
    /// Configuration file exists but could not be read
    #[error("Unable to read logging config file '{}': {source}", .path.display())]
    Read {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// Configuration file is not valid YAML or has values of the wrong type
    #[error("Error parsing logging config file '{}'", .path.display())]
    Parse {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        source: serde_yaml::Error,
    },
    /// A required key is missing
    #[error("Key '{0}' not found in logging config file")]
    MissingKey(String),
    /// Log directory could not be created
    #[error("Unable to create log directory '{}': {source}", .path.display())]
    CreateDir {
        /// Log directory
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// A log file could not be opened
    #[error("Unable to open log file '{}': {source}", .path.display())]
    OpenLogFile {
        /// Log file
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl LoggingConfigError {
    pub(crate) fn missing_key(key: &str) -> Self {
        LoggingConfigError::MissingKey(key.to_string())
    }
}

/// A named output format
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatterDescription {
    /// Pattern with `{time}`, `{level}`, `{target}`, `{module}`, `{file}`,
    /// `{line}` and `{message}` placeholders
    pub format: String,
}

/// A log destination
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct HandlerDescription {
    /// Minimum level this handler emits
    #[serde(default, deserialize_with = "deserialize_level")]
    pub level: Option<LogLevel>,
    /// Log file; handlers without one write to a console stream
    #[serde(default)]
    pub filename: Option<PathBuf>,
    /// Name of the formatter to use
    #[serde(default)]
    pub formatter: Option<String>,
    /// Console stream: `stdout` or `stderr` (the default)
    #[serde(default)]
    pub stream: Option<String>,
}

impl HandlerDescription {
    /// Whether this handler writes to a file
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

/// Root logger settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RootDescription {
    /// Most verbose level that reaches any handler
    #[serde(default, deserialize_with = "deserialize_level")]
    pub level: Option<LogLevel>,
    /// Handlers attached to the root logger (all handlers when omitted)
    #[serde(default)]
    pub handlers: Option<Vec<String>>,
}

/// Declarative logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LoggingConfigDescription {
    /// Schema version
    #[serde(default)]
    pub version: Option<u32>,
    /// Named formatters
    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterDescription>,
    /// Named handlers
    #[serde(default)]
    pub handlers: Option<BTreeMap<String, HandlerDescription>>,
    /// Root logger
    #[serde(default)]
    pub root: Option<RootDescription>,
}

impl LoggingConfigDescription {
    /// Parse a configuration from YAML text; `path` is used for diagnostics
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, LoggingConfigError> {
        serde_yaml::from_str(text).map_err(|source| LoggingConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a configuration file
    pub fn from_path(path: &Path) -> Result<Self, LoggingConfigError> {
        if !path.exists() {
            return Err(LoggingConfigError::Missing(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| LoggingConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }
}

/// Accept level names (`INFO`, `warning`) or numeric levels (`20`)
fn deserialize_level<'de, D>(deserializer: D) -> Result<Option<LogLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Severity(u8),
        Name(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Severity(severity) => LogLevel::from_severity(severity)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown log level {}", severity))),
        Repr::Name(name) => name.parse().map(Some).map_err(D::Error::custom),
    }
}
