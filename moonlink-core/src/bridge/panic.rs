//! 不可恢复错误处理
//!
//! An error raised outside any protected call ends in the runtime's panic
//! function, after which the runtime aborts the process. The handler
//! installed here gets one chance to inspect the state first. The handle
//! must be treated as unusable from then on.

use super::trampoline::panic_message;
use crate::ffi;
use crate::state::State;
use moonlink_log::{error, Level, Logger, StderrSink};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ffi::c_int;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

/// Host hook run on an unprotected runtime error; the error object is on top
pub type PanicHandler = dyn Fn(&mut State) + Send + Sync + 'static;

#[derive(Clone)]
struct PanicEntry {
    handler: Arc<PanicHandler>,
    logger: Arc<Logger>,
    /// Panic function in place before ours, restored on clear
    previous: ffi::lua_CFunction,
}

/// Keyed by the address of the state's main thread
static HANDLERS: Lazy<Mutex<HashMap<usize, PanicEntry>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn handlers() -> MutexGuard<'static, HashMap<usize, PanicEntry>> {
    HANDLERS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Main thread of the state `raw` belongs to (coroutines share its handler)
///
/// # Safety
/// `raw` must be live with one free stack slot.
unsafe fn main_thread(raw: *mut ffi::lua_State) -> *mut ffi::lua_State {
    ffi::lua_rawgeti(raw, ffi::LUA_REGISTRYINDEX, ffi::LUA_RIDX_MAINTHREAD);
    let main = ffi::lua_tothread(raw, -1);
    ffi::lua_pop(raw, 1);
    if main.is_null() {
        raw
    } else {
        main
    }
}

/// Drop the handler of a state being closed; no runtime call is made
pub(crate) fn forget_panic_handler(raw: *mut ffi::lua_State) -> bool {
    handlers().remove(&(raw as usize)).is_some()
}

impl State {
    /// Install `handler` for unprotected errors on this state (and its coroutines).
    ///
    /// Replaces a handler installed earlier through any handle of the same state.
    pub fn set_panic_handler<F>(&mut self, handler: F)
    where
        F: Fn(&mut State) + Send + Sync + 'static,
    {
        let raw = self.as_ptr();
        let key = unsafe { main_thread(raw) } as usize;
        let previous = unsafe { ffi::lua_atpanic(raw, panic_trampoline) };
        let mut table = handlers();
        // 重复安装时保留最初的 panic 函数
        let previous = match table.get(&key) {
            Some(existing) => existing.previous,
            None => previous,
        };
        table.insert(
            key,
            PanicEntry {
                handler: Arc::new(handler),
                logger: self.logger().clone(),
                previous,
            },
        );
    }

    /// Remove the handler and restore the previous panic function
    pub fn clear_panic_handler(&mut self) -> bool {
        let raw = self.as_ptr();
        let key = unsafe { main_thread(raw) } as usize;
        let removed = handlers().remove(&key);
        match removed {
            Some(entry) => {
                unsafe { ffi::lua_atpanic(raw, entry.previous) };
                true
            }
            None => false,
        }
    }

    pub fn has_panic_handler(&self) -> bool {
        let key = unsafe { main_thread(self.as_ptr()) } as usize;
        handlers().contains_key(&key)
    }
}

/// Logger for panics on a state whose handler entry is already gone
fn fallback_logger() -> Arc<Logger> {
    Logger::new(Level::Error).with_sink(StderrSink)
}

fn report(logger: &Logger, raw: *mut ffi::lua_State, state: &State) {
    let message = match state.to_string(-1) {
        Some(message) => message,
        None => format!("(error object is a {} value)", state.type_name(-1)),
    };
    error!(logger, "unprotected error in state {:p}: {}", raw, message);
}

/// Panic function installed by `set_panic_handler`
pub(crate) unsafe extern "C-unwind" fn panic_trampoline(raw: *mut ffi::lua_State) -> c_int {
    let key = main_thread(raw) as usize;
    let entry = handlers().get(&key).cloned();

    let Some(entry) = entry else {
        // 没有安装处理器：仍然报告，然后交给运行时终止进程
        let logger = fallback_logger();
        let state = State::borrowed(raw, logger.clone());
        report(&logger, raw, &state);
        return 0;
    };

    let mut state = State::borrowed(raw, entry.logger.clone());
    report(&entry.logger, raw, &state);
    let outcome = catch_unwind(AssertUnwindSafe(|| (entry.handler)(&mut state)));
    if let Err(payload) = outcome {
        error!(
            entry.logger,
            "panic handler panicked: {}",
            panic_message(payload.as_ref())
        );
    }
    0
}
