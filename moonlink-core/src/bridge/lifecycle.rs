//! 回调生命周期
//!
//! Lua functions cannot carry their own metatable and `__gc` only fires for
//! tables and full userdata. Each bridged closure therefore holds a small
//! guard userdata as its second upvalue: the guard stores the identity and
//! its metatable's `__gc` removes the registry entry. The guard is reachable
//! only through its closure, so both are reclaimed in the same cycle.

use super::registry::{CallbackId, CallbackRegistry};
use crate::ffi;
use crate::state::State;
use moonlink_log::{debug, trace};
use std::ffi::c_int;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Identity held by a guard before `bind_guard`; the registry never issues it
pub(crate) const UNBOUND: CallbackId = 0;

/// Push a guard userdata for `id`.
///
/// # Safety
/// `raw` must be a live state with at least three free stack slots.
pub(crate) unsafe fn push_guard(raw: *mut ffi::lua_State, id: CallbackId) {
    let slot = ffi::lua_newuserdatauv(raw, mem::size_of::<CallbackId>(), 0) as *mut CallbackId;
    slot.write(id);
    if ffi::luaL_newmetatable(raw, ffi::CALLBACK_GUARD.as_ptr()) != 0 {
        ffi::lua_pushcclosure(raw, finalize_callback, 0);
        ffi::lua_setfield(raw, -2, c"__gc".as_ptr());
        // 脚本侧 getmetatable 拿不到守卫元表
        ffi::lua_pushboolean(raw, 0);
        ffi::lua_setfield(raw, -2, c"__metatable".as_ptr());
    }
    ffi::lua_setmetatable(raw, -2);
}

/// Point the guard at `idx` to `id`
///
/// # Safety
/// The slot at `idx` must be a guard pushed by `push_guard`.
pub(crate) unsafe fn bind_guard(raw: *mut ffi::lua_State, idx: c_int, id: CallbackId) {
    let slot = ffi::lua_touserdata(raw, idx) as *mut CallbackId;
    if !slot.is_null() {
        slot.write(id);
    }
}

/// `__gc` of the guard metatable
unsafe extern "C-unwind" fn finalize_callback(raw: *mut ffi::lua_State) -> c_int {
    let slot = ffi::lua_touserdata(raw, 1) as *const CallbackId;
    if slot.is_null() {
        return 0;
    }
    let id = slot.read();
    // 闭包的 Drop 可能 panic，不能越过运行时的栈帧
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if let Some(entry) = CallbackRegistry::global().take(id) {
            trace!(entry.logger, "finalized callback #{}", id);
        }
    }));
    0
}

impl State {
    /// Remove every entry bridged through this handle now.
    ///
    /// The script-side functions stay valid; calling one after release does
    /// nothing and returns no results. Returns how many entries were live.
    pub fn release_callbacks(&mut self) -> usize {
        let ids = self.take_tracked_callbacks();
        let bridged = ids.len();
        let released = CallbackRegistry::global().release(ids);
        debug!(
            self.logger(),
            "released {} of {} bridged callbacks",
            released,
            bridged
        );
        released
    }

    /// Identities bridged through this handle that are still registered
    pub fn bridged_callbacks(&self) -> Vec<CallbackId> {
        let registry = CallbackRegistry::global();
        self.tracked_callbacks()
            .iter()
            .copied()
            .filter(|id| registry.contains(*id))
            .collect()
    }

    pub fn live_callbacks(&self) -> usize {
        self.bridged_callbacks().len()
    }
}
