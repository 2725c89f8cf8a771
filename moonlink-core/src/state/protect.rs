//! 受保护的原语
//!
//! Table access can run `__index`/`__newindex`, and a raising metamethod
//! unwinds with a C `longjmp`. Rust frames holding destructors must never sit
//! between the raise and the runtime's catch point, so every operation that can
//! run a metamethod goes through `lua_pcall` on one of the shims below. The
//! shims own nothing and may be jumped over.

use super::State;
use crate::error::CoreError;
use crate::ffi;
use std::ffi::c_int;

/// `(t, k) -> t[k]`
unsafe extern "C-unwind" fn get_table_shim(raw: *mut ffi::lua_State) -> c_int {
    ffi::lua_gettable(raw, 1);
    1
}

/// `(t, k, v) -> ()` with `t[k] = v`
unsafe extern "C-unwind" fn set_table_shim(raw: *mut ffi::lua_State) -> c_int {
    ffi::lua_settable(raw, 1);
    0
}

impl State {
    /// Run `shim` over the `nargs` values on top, under `lua_pcall`.
    ///
    /// On error the arguments are consumed and the message becomes a
    /// `CoreError::Call`.
    fn run_protected(
        &mut self,
        shim: ffi::lua_CFunction,
        nargs: i32,
        nresults: i32,
    ) -> Result<(), CoreError> {
        self.push_native_function(shim);
        self.insert(-(nargs + 1));
        let status = self.pcall(nargs, nresults, 0);
        if status.is_ok() {
            return Ok(());
        }
        let message = self.pop_error_message();
        Err(CoreError::Call { status, message })
    }

    /// `(t, k)` on top becomes `t[k]`
    pub(crate) fn protected_get(&mut self) -> Result<(), CoreError> {
        self.run_protected(get_table_shim, 2, 1)
    }

    /// `(t, k, v)` on top is consumed by `t[k] = v`
    pub(crate) fn protected_set(&mut self) -> Result<(), CoreError> {
        self.run_protected(set_table_shim, 3, 0)
    }

    /// Push the globals table (a raw registry read, never raises)
    pub(crate) fn push_globals(&mut self) {
        unsafe {
            ffi::lua_rawgeti(self.raw, ffi::LUA_REGISTRYINDEX, ffi::LUA_RIDX_GLOBALS);
        }
    }
}
