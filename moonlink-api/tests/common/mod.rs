//! 测试辅助工具

#![allow(dead_code)]

use moonlink_api::{RunConfig, Runtime};
use moonlink_log::{Level, LogRingBuffer, Logger};
use std::sync::Arc;

/// 默认配置的运行时
pub fn runtime() -> Runtime {
    Runtime::new(&RunConfig::default()).expect("runtime")
}

/// 日志写入环形缓冲区的运行时
pub fn traced_runtime() -> (Runtime, Arc<LogRingBuffer>) {
    let ring = LogRingBuffer::new(64);
    let logger = Logger::new(Level::Trace).with_sink(ring.clone());
    let config = RunConfig::default().with_logger(logger);
    (Runtime::new(&config).expect("runtime"), ring)
}
