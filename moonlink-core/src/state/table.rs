//! 表与全局变量访问
//!
//! Composite helpers stage copies of caller-designated slots onto the top in
//! the order the runtime's primitives expect, then let the primitive consume
//! them. Every caller index is resolved to an absolute one *before* the first
//! push, since each push moves the meaning of a relative index.
//!
//! Metamethods (`__index`, `__newindex`) still run. Access that may reach
//! one runs under `lua_pcall` (see `protect`), so a raising metamethod comes
//! back as `CoreError::Call` instead of unwinding through the caller.

use super::{LuaType, State};
use crate::error::CoreError;
use crate::ffi;
use std::ffi::CString;

/// Convert a name for the C API; names with interior NULs are rejected
pub(crate) fn c_name(name: &str) -> Result<CString, CoreError> {
    CString::new(name).map_err(|_| CoreError::InvalidName(name.to_string()))
}

impl State {
    // ==================== 创建 ====================

    pub fn new_table(&mut self) {
        self.create_table(0, 0);
    }

    /// Push a new table with preallocated room.
    ///
    /// `narr` is the expected sequence length, `nrec` the expected number of
    /// other entries. Both are allocator hints only.
    pub fn create_table(&mut self, narr: i32, nrec: i32) {
        unsafe { ffi::lua_createtable(self.raw, narr.max(0), nrec.max(0)) }
    }

    /// Absolute index of `table`, or `NotATable`
    pub(crate) fn table_at(&self, table: i32) -> Result<i32, CoreError> {
        let abs = self.abs_index(table);
        match self.type_of(abs) {
            LuaType::Table => Ok(abs),
            found => Err(CoreError::NotATable { index: abs, found }),
        }
    }

    // ==================== 消耗型原语 ====================

    /// `t[k] = v` with the value on top and the key just below; pops both,
    /// also when a `__newindex` metamethod raises
    pub fn set_table(&mut self, table: i32) -> Result<(), CoreError> {
        let t = self.table_at(table)?;
        self.ensure_stack(2)?;
        self.push_value(t);
        self.insert(-3);
        self.protected_set()
    }

    /// Replace the key on top with `t[k]`; returns the fetched type
    pub fn get_table(&mut self, table: i32) -> Result<LuaType, CoreError> {
        let t = self.table_at(table)?;
        self.ensure_stack(2)?;
        self.push_value(t);
        self.insert(-2);
        self.protected_get()?;
        Ok(self.type_of(-1))
    }

    // ==================== 暂存型组合操作 ====================

    /// `t[k] = v` for values already sitting at `key` and `value`.
    ///
    /// The slots themselves are left in place; copies are staged on top and
    /// consumed, so the stack height is unchanged.
    pub fn set_table_kv(&mut self, table: i32, key: i32, value: i32) -> Result<(), CoreError> {
        let t = self.table_at(table)?;
        let k = self.abs_index(key);
        let v = self.abs_index(value);
        self.ensure_stack(4)?;
        self.push_value(t);
        self.push_value(k);
        self.push_value(v);
        self.protected_set()
    }

    /// Push `t[k]` for the key sitting at `key`
    pub fn get_table_by_key(&mut self, table: i32, key: i32) -> Result<LuaType, CoreError> {
        let t = self.table_at(table)?;
        let k = self.abs_index(key);
        self.ensure_stack(3)?;
        self.push_value(t);
        self.push_value(k);
        self.protected_get()?;
        Ok(self.type_of(-1))
    }

    /// `t.name = v` for the value sitting at `value`; stack height unchanged
    pub fn set_field(&mut self, table: i32, name: &str, value: i32) -> Result<(), CoreError> {
        let t = self.table_at(table)?;
        let v = self.abs_index(value);
        c_name(name)?;
        self.ensure_stack(4)?;
        self.push_value(t);
        self.push_string(name);
        self.push_value(v);
        self.protected_set()
    }

    /// Push `t.name`
    pub fn get_field(&mut self, table: i32, name: &str) -> Result<LuaType, CoreError> {
        let t = self.table_at(table)?;
        c_name(name)?;
        self.ensure_stack(3)?;
        self.push_value(t);
        self.push_string(name);
        self.protected_get()?;
        Ok(self.type_of(-1))
    }

    // ==================== 序列 ====================

    /// Push `t[n]` without metamethods
    pub fn raw_get_index(&mut self, table: i32, n: i64) -> Result<LuaType, CoreError> {
        let t = self.table_at(table)?;
        self.ensure_stack(1)?;
        Ok(LuaType::from_code(unsafe {
            ffi::lua_rawgeti(self.raw, t, n as ffi::lua_Integer)
        }))
    }

    /// Pop the top value into `t[n]` without metamethods
    pub fn raw_set_index(&mut self, table: i32, n: i64) -> Result<(), CoreError> {
        let t = self.table_at(table)?;
        unsafe { ffi::lua_rawseti(self.raw, t, n as ffi::lua_Integer) };
        Ok(())
    }

    // ==================== 全局变量 ====================

    /// Push the global `name`
    pub fn get_global(&mut self, name: &str) -> Result<LuaType, CoreError> {
        c_name(name)?;
        self.ensure_stack(3)?;
        self.push_globals();
        self.push_string(name);
        self.protected_get()?;
        Ok(self.type_of(-1))
    }

    /// Pop the top value into the global `name`; the value is popped on
    /// failure as well
    pub fn set_global(&mut self, name: &str) -> Result<(), CoreError> {
        if let Err(err) = c_name(name).and_then(|_| self.ensure_stack(3)) {
            self.pop(1);
            return Err(err);
        }
        self.push_globals();
        self.insert(-2);
        self.push_string(name);
        self.insert(-2);
        self.protected_set()
    }
}
