//! 栈索引规范化
//!
//! Relative indices count back from the top (-1 is the topmost slot) and are
//! resolved against the top *at the moment of the call*. Positive indices,
//! zero and pseudo-indices (registry, upvalues) pass through untouched.

use super::State;
use crate::ffi;

/// Whether `idx` addresses the registry or an upvalue rather than a stack slot
pub fn is_pseudo_index(idx: i32) -> bool {
    idx <= ffi::LUA_REGISTRYINDEX
}

/// Resolve `idx` against a stack of height `top`.
///
/// A relative index that reaches below the bottom yields a position outside
/// the valid range; the next stack operation reports it, not this function.
pub fn normalize_index(idx: i32, top: i32) -> i32 {
    if idx >= 0 || is_pseudo_index(idx) {
        idx
    } else {
        top + idx + 1
    }
}

impl State {
    /// Absolute form of `idx` against the current top
    pub fn abs_index(&self, idx: i32) -> i32 {
        normalize_index(idx, self.top())
    }
}
