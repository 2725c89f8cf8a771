//! 加载、调用、回收与诊断

use super::table::c_name;
use super::{LuaType, State, Status};
use crate::error::CoreError;
use crate::ffi;
use std::ffi::{c_char, CString};
use std::fmt::Write as _;
use std::path::Path;
use std::ptr;

/// Longest string preview written by `dump_stack`
const PREVIEW_LEN: usize = 40;

impl State {
    // ==================== 加载 ====================

    /// Compile `code` as a chunk and push it (or the error message)
    pub fn load_string(&mut self, code: &str) -> Status {
        self.load_buffer(code.as_bytes(), ffi::DEFAULT_CHUNK_NAME.as_ptr())
    }

    /// Like `load_string`, with the chunk name shown in error messages.
    ///
    /// Lua convention: a leading `=` uses the name verbatim, `@` marks a file.
    pub fn load_named(&mut self, code: &str, chunk_name: &str) -> Result<Status, CoreError> {
        let name = c_name(chunk_name)?;
        Ok(self.load_buffer(code.as_bytes(), name.as_ptr()))
    }

    fn load_buffer(&mut self, code: &[u8], name: *const c_char) -> Status {
        let code_ptr = code.as_ptr() as *const c_char;
        Status::from_code(unsafe {
            ffi::luaL_loadbufferx(self.raw, code_ptr, code.len(), name, ptr::null())
        })
    }

    /// Compile a source file and push it (or the error message).
    ///
    /// A missing or unreadable file reports `Status::FileError`.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Status, CoreError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let c_path = CString::new(path.as_str()).map_err(|_| CoreError::InvalidName(path))?;
        Ok(Status::from_code(unsafe {
            ffi::luaL_loadfilex(self.raw, c_path.as_ptr(), ptr::null())
        }))
    }

    // ==================== 调用 ====================

    /// Unprotected call of the function below `nargs` arguments.
    ///
    /// An error raised by the callee unwinds with a C `longjmp` to the
    /// innermost protected call. Outside any protected call that is the panic
    /// function, and the runtime aborts the process once it returns. Inside a
    /// bridged closure or a script-level `pcall`, the jump lands in a runtime
    /// frame above the caller's Rust frames and skips their destructors.
    ///
    /// Use `pcall` instead. A bridged closure that wants to propagate the
    /// error returns `raise_error()`.
    ///
    /// # Safety
    /// Either the callee cannot raise, or no Rust frame with pending
    /// destructors may sit between this call and the innermost protected call
    /// (in practice: only at top level, with the process abort accepted).
    pub unsafe fn call(&mut self, nargs: i32, nresults: i32) {
        ffi::lua_call(self.raw, nargs, nresults)
    }

    /// Protected call.
    ///
    /// On error the function and its arguments are replaced by the error
    /// object, left on top. `handler` is the stack index of a message
    /// handler, or 0 for none.
    pub fn pcall(&mut self, nargs: i32, nresults: i32, handler: i32) -> Status {
        let handler = if handler == 0 { 0 } else { self.abs_index(handler) };
        Status::from_code(unsafe { ffi::lua_pcall(self.raw, nargs, nresults, handler) })
    }

    /// Load and run `code`, discarding its results
    pub fn exec(&mut self, code: &str) -> Result<(), CoreError> {
        self.load_checked(code)?;
        self.pcall_checked(0, 0)
    }

    /// Load and run `code`, leaving all of its results on the stack.
    ///
    /// Returns how many values were pushed.
    pub fn eval(&mut self, code: &str) -> Result<i32, CoreError> {
        let base = self.top();
        self.load_checked(code)?;
        self.pcall_checked(0, ffi::LUA_MULTRET)?;
        Ok(self.top() - base)
    }

    fn load_checked(&mut self, code: &str) -> Result<(), CoreError> {
        self.ensure_stack(1)?;
        let status = self.load_string(code);
        if status.is_ok() {
            return Ok(());
        }
        let message = self.pop_error_message();
        Err(CoreError::Load { status, message })
    }

    fn pcall_checked(&mut self, nargs: i32, nresults: i32) -> Result<(), CoreError> {
        let status = self.pcall(nargs, nresults, 0);
        if status.is_ok() {
            return Ok(());
        }
        let message = self.pop_error_message();
        Err(CoreError::Call { status, message })
    }

    /// Pop the error object on top and describe it
    pub fn pop_error_message(&mut self) -> String {
        let message = match self.to_string(-1) {
            Some(message) => message,
            None => format!("(error object is a {} value)", self.type_name(-1)),
        };
        self.pop(1);
        message
    }

    // ==================== 回收 ====================

    /// Run a full collection cycle; finalizers of unreachable values run now
    pub fn collect_garbage(&mut self) {
        unsafe { ffi::lua_gc(self.raw, ffi::LUA_GCCOLLECT) };
    }

    /// Memory held by the runtime, in KiB
    pub fn memory_in_use_kb(&self) -> usize {
        let kb = unsafe { ffi::lua_gc(self.raw, ffi::LUA_GCCOUNT) };
        kb.max(0) as usize
    }

    // ==================== 诊断 ====================

    /// One line per slot, bottom first: index, type and a value preview
    pub fn dump_stack(&self) -> String {
        let top = self.top();
        let mut out = String::new();
        let _ = writeln!(out, "stack ({} slots):", top);
        for idx in 1..=top {
            let ty = self.type_of(idx);
            let preview = match ty {
                LuaType::Nil => "nil".to_string(),
                LuaType::Boolean => self.to_boolean(idx).to_string(),
                LuaType::Number => self.to_string(idx).unwrap_or_default(),
                LuaType::String => {
                    let text = self.to_string(idx).unwrap_or_default();
                    let clipped: String = text.chars().take(PREVIEW_LEN).collect();
                    if clipped.len() < text.len() {
                        format!("{:?}...", clipped)
                    } else {
                        format!("{:?}", clipped)
                    }
                }
                _ => format!("{:p}", self.to_pointer(idx)),
            };
            let _ = writeln!(out, "  [{}] {} {}", idx, ty, preview);
        }
        out
    }
}
