//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use moonlink_core::{CoreError, Status};
use serde::Serialize;
use thiserror::Error;

/// Moonlink 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// 代码无法编译
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// 受保护调用中抛出的错误
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// 运行时内存分配失败
    #[error("Memory error: {0}")]
    Memory(String),

    /// 脚本文件无法打开或读取
    #[error("File error: {0}")]
    File(String),

    /// 错误处理函数自身出错，或未分类的状态码
    #[error("Handler error: {0}")]
    Handler(String),

    /// 配置无法解析或全局配置状态不对
    #[error("Config error: {0}")]
    Config(String),

    /// 其它核心层错误（名称、栈空间、类型）
    #[error("{0}")]
    Core(CoreError),
}

impl From<CoreError> for BridgeError {
    /// Errors carrying a runtime status map onto the matching variant
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Load { status, message } | CoreError::Call { status, message } => {
                BridgeError::from_status(status, message)
            }
            other => BridgeError::Core(other),
        }
    }
}

impl BridgeError {
    /// Classify a failed status and its message
    pub fn from_status(status: Status, message: String) -> Self {
        match status {
            Status::SyntaxError => BridgeError::Syntax(message),
            Status::MemoryError => BridgeError::Memory(message),
            Status::FileError => BridgeError::File(message),
            Status::RuntimeError => BridgeError::Runtime(message),
            Status::Unclassified | Status::Ok | Status::Yield => BridgeError::Handler(message),
        }
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            BridgeError::Syntax(_) | BridgeError::File(_) => "load",
            BridgeError::Runtime(_) | BridgeError::Memory(_) | BridgeError::Handler(_) => {
                "runtime"
            }
            BridgeError::Config(_) => "config",
            BridgeError::Core(_) => "bridge",
        }
    }

    /// 运行时状态码（如果错误来自运行时）
    pub fn status(&self) -> Option<Status> {
        match self {
            BridgeError::Syntax(_) => Some(Status::SyntaxError),
            BridgeError::Runtime(_) => Some(Status::RuntimeError),
            BridgeError::Memory(_) => Some(Status::MemoryError),
            BridgeError::File(_) => Some(Status::FileError),
            BridgeError::Handler(_) => Some(Status::Unclassified),
            BridgeError::Config(_) | BridgeError::Core(_) => None,
        }
    }

    /// 获取错误行号（如果消息带有 `chunk:line:` 前缀）
    pub fn line(&self) -> Option<usize> {
        match self {
            BridgeError::Syntax(msg) | BridgeError::Runtime(msg) => chunk_line(msg),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            BridgeError::Syntax(msg)
            | BridgeError::Runtime(msg)
            | BridgeError::Memory(msg)
            | BridgeError::File(msg)
            | BridgeError::Handler(msg)
            | BridgeError::Config(msg) => msg.clone(),
            BridgeError::Core(err) => err.to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            BridgeError::Syntax(_) => "SyntaxError",
            BridgeError::Runtime(_) => "RuntimeError",
            BridgeError::Memory(_) => "MemoryError",
            BridgeError::File(_) => "FileError",
            BridgeError::Handler(_) => "HandlerError",
            BridgeError::Config(_) => "ConfigError",
            BridgeError::Core(CoreError::StateAllocation) => "StateAllocation",
            BridgeError::Core(CoreError::InvalidName(_)) => "InvalidName",
            BridgeError::Core(CoreError::NotATable { .. }) => "NotATable",
            BridgeError::Core(CoreError::StackExhausted(_)) => "StackExhausted",
            BridgeError::Core(CoreError::NotPushable(_)) => "NotPushable",
            BridgeError::Core(CoreError::Load { .. } | CoreError::Call { .. }) => "RuntimeError",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            phase: self.phase(),
            line: self.line(),
            error_kind: self.kind().to_string(),
            message: self.message(),
            status_code: self.status().map(|s| s.code()),
        }
    }
}

/// Line number from a runtime message of the form `chunk:LINE: text`
fn chunk_line(message: &str) -> Option<usize> {
    let mut parts = message.splitn(3, ':');
    let _chunk = parts.next()?;
    let line = parts.next()?;
    parts.next()?;
    line.trim().parse().ok()
}

/// 结构化错误报告
///
/// 上层应用（CLI、Web、LSP）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: load, runtime, config, bridge
    pub phase: &'static str,
    /// 错误行号（1-based，如果有）
    pub line: Option<usize>,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
    /// 运行时原始状态码
    pub status_code: Option<i32>,
}

impl ErrorReport {
    /// 单行简短格式
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.error_kind, self.message)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "[line {}] {} error: {}", line, self.phase, self.message),
            None => write!(f, "[{}] {} error: {}", self.phase, self.phase, self.message),
        }
    }
}
