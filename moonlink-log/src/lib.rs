//! moonlink-log - 结构化日志系统
//!
//! Logging for the bridge layer:
//! - **显式传递**：no global logger, every `State` carries an `Arc<Logger>`
//! - **非阻塞**：the ring buffer overwrites the oldest record when full
//! - **可观测**：faults caught at the callback boundary end up here, so tests
//!   and crash dumps can read them back
//!
//! # Quick start
//!
//! ```
//! use moonlink_log::{debug, LogConfig, Level};
//!
//! let (logger, ring) = LogConfig::new(Level::Debug).with_ring_buffer(100).init();
//! debug!(logger, "state opened");
//! assert_eq!(ring.unwrap().len(), 1);
//! ```

mod config;
mod logger;
mod macros;
mod record;
mod ring_buffer;

pub use config::{LogConfig, OutputConfig};
pub use logger::{LogSink, Logger, StderrSink, StdoutSink, TracingSink};
pub use record::{Level, Record};
pub use ring_buffer::{LogRingBuffer, RingBufferStats};
