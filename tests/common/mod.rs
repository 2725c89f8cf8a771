//! 测试辅助工具
//!
//! 提供端到端测试的辅助函数

#![allow(dead_code)]

use moonlink::{ExecuteOutput, RunConfig, Value};

/// 使用默认配置执行代码
pub fn run_code(code: &str) -> Result<ExecuteOutput, moonlink::BridgeError> {
    moonlink::run(code, &RunConfig::default())
}

/// 取第一个返回值中的整数
pub fn get_int(output: &ExecuteOutput) -> Option<i64> {
    output.value().and_then(Value::as_integer)
}

/// 取第一个返回值中的字符串
pub fn get_str(output: &ExecuteOutput) -> Option<String> {
    output.value().and_then(Value::as_str).map(str::to_string)
}
