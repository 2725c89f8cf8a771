//! API 类型定义
//!
//! 执行的输出类型。

use moonlink_core::Value;

/// 执行输出
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecuteOutput {
    /// 返回值（按顺序）
    pub values: Vec<Value>,
}

impl ExecuteOutput {
    /// 第一个返回值
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for ExecuteOutput {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}
