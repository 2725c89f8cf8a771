//! 闭包跳板
//!
//! Every bridged closure is the same native function, `callback_trampoline`,
//! with two upvalues: the identity as an integer and the guard userdata that
//! ties the registry entry to the collector (see `lifecycle`).

use super::lifecycle;
use super::registry::{CallbackId, CallbackRegistry, HostFn};
use crate::error::CoreError;
use crate::ffi;
use crate::state::State;
use moonlink_log::{error, trace};
use std::any::Any;
use std::ffi::c_int;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Upvalues carried by each bridged closure: identity, guard
const CALLBACK_UPVALUES: c_int = 2;

impl State {
    /// Bridge `func` and push the resulting function.
    ///
    /// Returns the identity the closure is registered under. The entry is
    /// removed when the runtime collects the pushed function, or earlier via
    /// `release_callbacks`.
    pub fn push_closure<F>(&mut self, func: F) -> Result<CallbackId, CoreError>
    where
        F: Fn(&mut State) -> i32 + Send + Sync + 'static,
    {
        self.push_host_fn(Arc::new(func))
    }

    /// Bridge an already shared closure; the same `Arc` may be bridged many times
    pub fn push_host_fn(&mut self, func: Arc<HostFn>) -> Result<CallbackId, CoreError> {
        self.ensure_stack(CALLBACK_UPVALUES + 2)?;
        let raw = self.as_ptr();
        // 先完成全部分配再登记：分配失败时注册表里不会留下没有函数的条目
        unsafe {
            ffi::lua_pushinteger(raw, 0);
            lifecycle::push_guard(raw, lifecycle::UNBOUND);
            ffi::lua_pushcclosure(raw, callback_trampoline, CALLBACK_UPVALUES);
        }
        let id = CallbackRegistry::global().register(func, self.logger().clone());
        unsafe { bind_identity(raw, id) };
        self.track_callback(id);
        trace!(self.logger(), "bridged callback #{}", id);
        Ok(id)
    }
}

/// Write `id` into both upvalues of the closure on top; allocates nothing
///
/// # Safety
/// The top slot must be a closure built by `push_host_fn`, with one free slot.
unsafe fn bind_identity(raw: *mut ffi::lua_State, id: CallbackId) {
    ffi::lua_pushinteger(raw, id as ffi::lua_Integer);
    ffi::lua_setupvalue(raw, -2, 1);
    ffi::lua_getupvalue(raw, -1, 2);
    lifecycle::bind_guard(raw, -1, id);
    ffi::lua_pop(raw, 1);
}

/// What the trampoline does once every Rust value of the call is gone
enum Outcome {
    Return(c_int),
    Raise,
}

/// Entry point shared by all bridged closures.
///
/// A missing identity (released explicitly) and a panicking closure both
/// come back to the runtime as a call with no results. The panic never
/// crosses into the runtime's frames. A closure ending in `raise_error` has
/// its error raised here, after `invoke` returned and dropped its locals,
/// so the runtime's `longjmp` skips no destructor.
pub(crate) unsafe extern "C-unwind" fn callback_trampoline(raw: *mut ffi::lua_State) -> c_int {
    match invoke(raw) {
        Outcome::Return(count) => count,
        Outcome::Raise => ffi::lua_error(raw),
    }
}

unsafe fn invoke(raw: *mut ffi::lua_State) -> Outcome {
    let mut isnum: c_int = 0;
    let id = ffi::lua_tointegerx(raw, ffi::lua_upvalueindex(1), &mut isnum);
    if isnum == 0 {
        return Outcome::Return(0);
    }
    let id = id as CallbackId;

    let Some(entry) = CallbackRegistry::global().lookup(id) else {
        return Outcome::Return(0);
    };

    let mut state = State::borrowed(raw, entry.logger.clone());
    let outcome = catch_unwind(AssertUnwindSafe(|| (entry.func)(&mut state)));
    match outcome {
        Ok(_) if state.take_raise_request() => {
            trace!(entry.logger, "callback #{} raised a script error", id);
            Outcome::Raise
        }
        Ok(count) => Outcome::Return(count.clamp(0, state.top())),
        Err(payload) => {
            error!(
                entry.logger,
                "callback #{} panicked: {}",
                id,
                panic_message(payload.as_ref())
            );
            Outcome::Return(0)
        }
    }
}

/// Text of a panic payload (`panic!` with a literal or a formatted message)
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonlink_log::{Level, LogRingBuffer, Logger};

    #[test]
    fn test_call_from_script() {
        let mut s = State::new().unwrap();
        s.push_closure(|s| {
            let a = s.to_integer(1).unwrap_or(0);
            let b = s.to_integer(2).unwrap_or(0);
            s.push_integer(a + b);
            1
        })
        .unwrap();
        s.set_global("add").unwrap();
        s.eval("return add(2, 3)").unwrap();
        assert_eq!(s.to_integer(-1), Some(5));
    }

    #[test]
    fn test_multiple_results() {
        let mut s = State::new().unwrap();
        s.push_closure(|s| {
            s.push_string("a");
            s.push_string("b");
            2
        })
        .unwrap();
        s.set_global("pair").unwrap();
        assert_eq!(s.eval("return pair()").unwrap(), 2);
        assert_eq!(s.to_string(1), Some("a".to_string()));
        assert_eq!(s.to_string(2), Some("b".to_string()));
    }

    #[test]
    fn test_result_count_is_clamped() {
        let mut s = State::new().unwrap();
        s.push_closure(|s| {
            s.push_integer(1);
            99
        })
        .unwrap();
        s.set_global("liar").unwrap();
        // 参数 + 压入的值都算作结果，不会越过栈底
        assert_eq!(s.eval("return liar('x')").unwrap(), 2);

        s.push_closure(|_| -3).unwrap();
        s.set_global("negative").unwrap();
        s.set_top(0);
        assert_eq!(s.eval("return negative()").unwrap(), 0);
    }

    #[test]
    fn test_panic_becomes_empty_call() {
        let (ring, logger) = {
            let ring = LogRingBuffer::new(16);
            let logger = Logger::new(Level::Trace).with_sink(ring.clone());
            (ring, logger)
        };
        let mut s = State::with_config(Default::default(), logger).unwrap();
        s.push_closure(|_| panic!("host fault")).unwrap();
        s.set_global("explode").unwrap();

        assert_eq!(s.eval("return explode()").unwrap(), 0);
        assert!(ring.contains("panicked: host fault"));
        // 解释器仍可继续使用
        s.exec("x = 1").unwrap();
    }

    #[test]
    fn test_panic_message_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("lit");
        let owned: Box<dyn Any + Send> = Box::new(format!("n={}", 1));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(literal.as_ref()), "lit");
        assert_eq!(panic_message(owned.as_ref()), "n=1");
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_reentrant_call() {
        let mut s = State::new().unwrap();
        s.exec("function double(n) return n * 2 end").unwrap();
        s.push_closure(|s| {
            // 闭包内部再调用脚本函数
            let n = s.to_integer(1).unwrap_or(0);
            if s.get_global("double").is_err() {
                return 0;
            }
            s.push_integer(n);
            if s.pcall(1, 1, 0).is_ok() {
                1
            } else {
                0
            }
        })
        .unwrap();
        s.set_global("via_host").unwrap();
        s.eval("return via_host(21)").unwrap();
        assert_eq!(s.to_integer(-1), Some(42));
    }

    #[test]
    fn test_raise_error_propagates_to_script() {
        let mut s = State::new().unwrap();
        s.push_closure(|s| {
            s.push_string("refused");
            s.raise_error()
        })
        .unwrap();
        s.set_global("refuse").unwrap();
        s.eval("local ok, msg = pcall(refuse) return ok, msg").unwrap();
        assert!(!s.to_boolean(-2));
        assert_eq!(s.to_string(-1), Some("refused".to_string()));

        // 顶层直接调用时，错误由 eval 报告
        s.set_top(0);
        let err = s.exec("refuse()").unwrap_err();
        assert_eq!(err.message(), Some("refused"));
    }

    #[test]
    fn test_identity_bound_after_registration() {
        let mut s = State::new().unwrap();
        let id = s.push_closure(|_| 0).unwrap();
        let bound = unsafe { ffi::lua_getupvalue(s.as_ptr(), -1, 1) };
        assert!(!bound.is_null());
        assert_eq!(s.to_integer(-1), Some(id as i64));
        assert!(CallbackRegistry::global().contains(id));
    }
}
