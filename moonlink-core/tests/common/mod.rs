//! 测试辅助工具
//!
//! 提供集成测试共用的状态构造和求值函数

#![allow(dead_code)]

use moonlink_core::{State, Value};
use moonlink_log::{Level, LogRingBuffer, Logger};
use std::sync::Arc;

/// 带标准库的新状态，日志静默
pub fn fresh_state() -> State {
    State::new().expect("state allocation")
}

/// 日志写入环形缓冲区的新状态，用于断言桥接错误可观测
pub fn traced_state() -> (State, Arc<LogRingBuffer>) {
    let ring = LogRingBuffer::new(64);
    let logger = Logger::new(Level::Trace).with_sink(ring.clone());
    let state = State::with_config(Default::default(), logger).expect("state allocation");
    (state, ring)
}

/// 执行代码并取出全部返回值，栈恢复原高度
pub fn eval_values(state: &mut State, code: &str) -> Vec<Value> {
    let base = state.top();
    let count = state.eval(code).expect("eval");
    let values = (0..count).map(|i| state.to_value(base + 1 + i)).collect();
    state.set_top(base);
    values
}

/// 单个返回值
pub fn eval_one(state: &mut State, code: &str) -> Value {
    eval_values(state, code)
        .into_iter()
        .next()
        .unwrap_or(Value::Nil)
}
