//! Moonlink API - Execution orchestration layer
//!
//! Provides unified execution interface, including:
//! - The `Runtime` facade over one interpreter
//! - Configuration abstraction (RunConfig)
//! - Unified error handling (BridgeError) with structured reports
//!
//! For application convenience, this crate provides a global singleton API.
//! For library use, prefer the explicit `run(source, &config)` API.

use moonlink_log::info;

pub mod config;
pub mod error;
pub mod runtime;
pub mod types;

pub use config::{
    config as get_config, config_or_default, init as init_config, is_initialized, RunConfig,
};
pub use error::{BridgeError, ErrorReport};
pub use runtime::Runtime;
pub use types::ExecuteOutput;

// Re-export config and core types
pub use moonlink_config::{LogLevel, LoggingConfig, MoonlinkConfig, StateConfig};
pub use moonlink_core::{LibValue, Library, LuaType, State, Status, Value};

/// Execute with explicit configuration
///
/// A fresh runtime is opened for the call and closed afterwards.
pub fn run(source: &str, config: &RunConfig) -> Result<ExecuteOutput, BridgeError> {
    info!(config.logger, "Starting execution");
    let mut runtime = Runtime::new(config)?;
    let values = runtime.eval(source)?;
    info!(config.logger, "Execution completed ({} results)", values.len());
    Ok(ExecuteOutput::from(values))
}

/// Compile and run (uses global config)
pub fn compile_and_run(source: &str) -> Result<ExecuteOutput, BridgeError> {
    let config = get_config()?;
    run(source, config)
}

/// Quick run with default config (auto-initializes if needed)
pub fn quick_run(source: &str) -> Result<ExecuteOutput, BridgeError> {
    run(source, config_or_default())
}
