//! Runtime handle
//!
//! `State` wraps one interpreter instance and its single shared stack. The
//! operations are split across submodules the same way the handle's concerns
//! are split:
//!
//! - `index` : relative/absolute index normalization
//! - `stack` : raw push/read/type primitives
//! - `table` : composite table and global access
//! - `iter`  : `next`-driven traversal
//! - `protect`: metamethod-safe access under `lua_pcall`
//! - `call`  : loading, invocation, collection, diagnostics

use crate::bridge::{self, CallbackId, CallbackRegistry};
use crate::error::CoreError;
use crate::ffi;
use moonlink_config::StateConfig;
use moonlink_log::{debug, Logger};
use std::sync::Arc;

mod call;
mod index;
mod iter;
mod protect;
mod stack;
mod status;
mod table;

pub use index::{is_pseudo_index, normalize_index};
pub use status::{LuaType, Status};

/// Bridged identities kept before the ownership list prunes released entries
const PRUNE_FLOOR: usize = 64;

/// Handle to one interpreter instance.
///
/// An owning handle (`new`, `with_config`) closes the interpreter exactly
/// once when dropped. A borrowed handle (`from_raw`, or the one handed to a
/// bridged closure) never closes it.
///
/// The handle is neither `Send` nor `Sync`: one interpreter, one thread.
pub struct State {
    raw: *mut ffi::lua_State,
    owned: bool,
    config: StateConfig,
    logger: Arc<Logger>,
    /// Identities bridged through this handle, for explicit release
    bridged: Vec<CallbackId>,
    prune_at: usize,
    /// Set by `raise_error`; read by the trampoline once the closure returns
    raise_pending: bool,
}

impl State {
    /// Create an owning handle with default configuration and a silent logger
    pub fn new() -> Result<Self, CoreError> {
        Self::with_config(StateConfig::default(), Logger::noop())
    }

    /// Create an owning handle
    pub fn with_config(config: StateConfig, logger: Arc<Logger>) -> Result<Self, CoreError> {
        let raw = unsafe { ffi::luaL_newstate() };
        if raw.is_null() {
            return Err(CoreError::StateAllocation);
        }
        if config.open_stdlibs {
            unsafe { ffi::luaL_openlibs(raw) };
        }
        debug!(
            logger,
            "state {:p} opened (stdlibs={}, headroom={})",
            raw,
            config.open_stdlibs,
            config.stack_headroom
        );
        Ok(Self::wrap(raw, true, config, logger))
    }

    /// Wrap a handle owned elsewhere.
    ///
    /// # Safety
    /// `raw` must point to a live interpreter that outlives the returned
    /// handle, and no other thread may use it concurrently.
    pub unsafe fn from_raw(raw: *mut ffi::lua_State, logger: Arc<Logger>) -> Self {
        Self::wrap(raw, false, StateConfig::default(), logger)
    }

    /// Non-owning handle used at the runtime's entry points
    pub(crate) fn borrowed(raw: *mut ffi::lua_State, logger: Arc<Logger>) -> Self {
        Self::wrap(raw, false, StateConfig::default(), logger)
    }

    fn wrap(
        raw: *mut ffi::lua_State,
        owned: bool,
        config: StateConfig,
        logger: Arc<Logger>,
    ) -> Self {
        State {
            raw,
            owned,
            config,
            logger,
            bridged: Vec::new(),
            prune_at: PRUNE_FLOOR,
            raise_pending: false,
        }
    }

    pub fn as_ptr(&self) -> *mut ffi::lua_State {
        self.raw
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Close an owning handle now instead of at end of scope
    pub fn close(self) {
        drop(self);
    }

    /// Make room for `extra` pushes plus the configured headroom
    pub fn ensure_stack(&self, extra: i32) -> Result<(), CoreError> {
        let wanted = extra.saturating_add(self.config.stack_headroom.max(0));
        if self.check_stack(wanted) {
            Ok(())
        } else {
            Err(CoreError::StackExhausted(wanted))
        }
    }

    /// Record an identity bridged through this handle
    pub(crate) fn track_callback(&mut self, id: CallbackId) {
        if self.bridged.len() >= self.prune_at {
            let registry = CallbackRegistry::global();
            self.bridged.retain(|id| registry.contains(*id));
            self.prune_at = (self.bridged.len() * 2).max(PRUNE_FLOOR);
        }
        self.bridged.push(id);
    }

    pub(crate) fn take_tracked_callbacks(&mut self) -> Vec<CallbackId> {
        self.prune_at = PRUNE_FLOOR;
        std::mem::take(&mut self.bridged)
    }

    pub(crate) fn tracked_callbacks(&self) -> &[CallbackId] {
        &self.bridged
    }

    /// Raise the value on top as a script error once the bridged closure
    /// returns.
    ///
    /// Meant as the closure's tail: `return s.raise_error();`. The raise
    /// happens after the trampoline has dropped every Rust value it holds, so
    /// the error can unwind through the runtime safely. Outside a bridged
    /// closure the request is ignored.
    pub fn raise_error(&mut self) -> i32 {
        if self.top() == 0 {
            self.push_nil();
        }
        self.raise_pending = true;
        1
    }

    pub(crate) fn take_raise_request(&mut self) -> bool {
        std::mem::take(&mut self.raise_pending)
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("raw", &self.raw)
            .field("owned", &self.owned)
            .field("top", &self.top())
            .field("bridged", &self.bridged.len())
            .finish()
    }
}

impl Drop for State {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        bridge::forget_panic_handler(self.raw);
        if self.config.collect_on_close {
            // 先触发一次完整回收，让终结器清理注册表条目
            self.collect_garbage();
        }
        unsafe { ffi::lua_close(self.raw) };
        // lua_close 已运行全部终结器，剩下的只是在关闭前被显式释放过的
        let leftovers = CallbackRegistry::global().release(self.take_tracked_callbacks());
        debug!(
            self.logger,
            "state {:p} closed ({} leftover callbacks released)",
            self.raw,
            leftovers
        );
    }
}
