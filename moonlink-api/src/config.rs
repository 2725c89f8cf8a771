//! API 层配置
//!
//! 包含执行配置 RunConfig 和全局单例（供应用层便捷使用）

use crate::error::BridgeError;
use moonlink_config::{MoonlinkConfig, StateConfig};
use moonlink_log::{LogConfig, LogRingBuffer, Logger};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Execution configuration
#[derive(Clone)]
pub struct RunConfig {
    /// Configuration of each runtime handle created from this config
    pub state: StateConfig,
    /// Logger handed to every state (and every callback it bridges)
    pub logger: Arc<Logger>,
}

impl RunConfig {
    /// Build from a configuration document.
    ///
    /// Returns the ring buffer as well when the document asks for one.
    pub fn from_config(config: &MoonlinkConfig) -> (Self, Option<Arc<LogRingBuffer>>) {
        let (logger, ring) = LogConfig::from(&config.logging).init();
        (
            Self {
                state: config.state.clone(),
                logger,
            },
            ring,
        )
    }

    /// Parse a JSON document and build from it
    pub fn from_json(source: &str) -> Result<(Self, Option<Arc<LogRingBuffer>>), BridgeError> {
        let config =
            MoonlinkConfig::from_json(source).map_err(|e| BridgeError::Config(e.to_string()))?;
        Ok(Self::from_config(&config))
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("state", &self.state)
            .field("log_level", &self.logger.level())
            .finish()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            state: StateConfig::default(),
            logger: Logger::noop(),
        }
    }
}

// Global config singleton for application convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration; fails if it was initialized already
pub fn init(config: RunConfig) -> Result<(), BridgeError> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| BridgeError::Config("config already initialized".to_string()))
}

/// Get global config reference
pub fn config() -> Result<&'static RunConfig, BridgeError> {
    GLOBAL_CONFIG
        .get()
        .ok_or_else(|| BridgeError::Config("config not initialized".to_string()))
}

/// Global config, initialized with defaults on first use
pub fn config_or_default() -> &'static RunConfig {
    GLOBAL_CONFIG.get_or_init(RunConfig::default)
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
