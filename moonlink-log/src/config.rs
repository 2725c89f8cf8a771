//! 日志配置
//!
//! 提供便捷的日志初始化配置。

use crate::logger::{StderrSink, StdoutSink, TracingSink};
use crate::{Level, LogRingBuffer, Logger};
use moonlink_config::LoggingConfig;
use std::sync::Arc;

/// 日志输出目标配置
#[derive(Clone, Debug, PartialEq)]
pub enum OutputConfig {
    Stdout,
    Stderr,
    /// 转发到 tracing subscriber
    Tracing,
    /// 输出到环形缓冲区（容量）
    RingBuffer(usize),
}

/// 日志配置
///
/// 用于一键初始化日志系统
///
/// ```
/// use moonlink_log::{LogConfig, Level};
///
/// let (logger, ring) = LogConfig::new(Level::Debug).with_ring_buffer(10000).init();
/// assert!(ring.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: Level,
    pub outputs: Vec<OutputConfig>,
}

impl LogConfig {
    pub fn new(level: Level) -> Self {
        LogConfig {
            level,
            outputs: Vec::new(),
        }
    }

    /// 开发环境推荐配置：Debug 级别，stderr + 环形缓冲区
    pub fn dev() -> Self {
        LogConfig {
            level: Level::Debug,
            outputs: vec![OutputConfig::Stderr, OutputConfig::RingBuffer(10000)],
        }
    }

    /// 生产环境推荐配置：Warn 级别，转发到 tracing + 环形缓冲区
    pub fn production() -> Self {
        LogConfig {
            level: Level::Warn,
            outputs: vec![OutputConfig::Tracing, OutputConfig::RingBuffer(1000)],
        }
    }

    /// 测试环境配置（静默）
    pub fn test() -> Self {
        LogConfig {
            level: Level::Error,
            outputs: Vec::new(),
        }
    }

    pub fn with_stdout(self) -> Self {
        self.with_output(OutputConfig::Stdout)
    }

    pub fn with_stderr(self) -> Self {
        self.with_output(OutputConfig::Stderr)
    }

    pub fn with_tracing(self) -> Self {
        self.with_output(OutputConfig::Tracing)
    }

    pub fn with_ring_buffer(mut self, capacity: usize) -> Self {
        self.outputs.push(OutputConfig::RingBuffer(capacity));
        self
    }

    fn with_output(mut self, output: OutputConfig) -> Self {
        if !self.outputs.contains(&output) {
            self.outputs.push(output);
        }
        self
    }

    /// 初始化日志系统
    ///
    /// 返回 (logger, Option<ring_buffer>)；配置了多个环形缓冲区时返回最后一个
    pub fn init(self) -> (Arc<Logger>, Option<Arc<LogRingBuffer>>) {
        let logger = Logger::new(self.level);
        let mut ring_buffer: Option<Arc<LogRingBuffer>> = None;

        for output in self.outputs {
            match output {
                OutputConfig::Stdout => logger.add_sink(StdoutSink),
                OutputConfig::Stderr => logger.add_sink(StderrSink),
                OutputConfig::Tracing => logger.add_sink(TracingSink),
                OutputConfig::RingBuffer(capacity) => {
                    let ring = LogRingBuffer::new(capacity);
                    ring_buffer = Some(Arc::clone(&ring));
                    logger.add_sink(ring);
                }
            }
        }

        (logger, ring_buffer)
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let mut log_config = LogConfig::new(config.level.into());
        if config.stderr {
            log_config = log_config.with_stderr();
        }
        if let Some(capacity) = config.ring_buffer {
            log_config = log_config.with_ring_buffer(capacity);
        }
        log_config
    }
}
