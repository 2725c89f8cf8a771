//! Moonlink Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It is the shared configuration vocabulary across all Moonlink crates and
//! can be loaded from JSON so embedding applications keep it in their own
//! config files.

use serde::{Deserialize, Serialize};

/// Configuration for one runtime handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Open the runtime's standard libraries (`package`, `string`, ...) on creation
    pub open_stdlibs: bool,
    /// Force a full collection before closing an owned handle
    pub collect_on_close: bool,
    /// Extra stack slots requested before pushing sequences of temporaries
    pub stack_headroom: i32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            open_stdlibs: true,
            collect_on_close: true,
            stack_headroom: 20,
        }
    }
}

/// Log level vocabulary shared by config files and the logger
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the string name of the level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration for logging outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level that reaches the sinks
    pub level: LogLevel,
    /// Mirror records to stderr
    pub stderr: bool,
    /// Keep the last N records in memory (crash dumps, tests)
    pub ring_buffer: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            stderr: false,
            ring_buffer: None,
        }
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonlinkConfig {
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

impl MoonlinkConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Serialize back to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
