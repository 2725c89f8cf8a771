//! 原始栈操作
//!
//! One method per primitive: each push grows the top by one, reads never
//! change the stack. Readers return `None` where the runtime reports the
//! value as absent or not convertible.

use super::{LuaType, State};
use crate::ffi;
use std::ffi::{c_char, c_int, c_void};

impl State {
    // ==================== 栈顶 ====================

    /// Index of the topmost slot (also the number of slots in use)
    pub fn top(&self) -> i32 {
        unsafe { ffi::lua_gettop(self.raw) }
    }

    /// Truncate, or extend with nils, so that `idx` becomes the top
    pub fn set_top(&mut self, idx: i32) {
        unsafe { ffi::lua_settop(self.raw, idx) }
    }

    pub fn pop(&mut self, n: i32) {
        unsafe { ffi::lua_pop(self.raw, n) }
    }

    /// Ask the runtime for `n` more free slots
    pub fn check_stack(&self, n: i32) -> bool {
        unsafe { ffi::lua_checkstack(self.raw, n) != 0 }
    }

    // ==================== 压栈 ====================

    pub fn push_nil(&mut self) {
        unsafe { ffi::lua_pushnil(self.raw) }
    }

    pub fn push_boolean(&mut self, value: bool) {
        unsafe { ffi::lua_pushboolean(self.raw, c_int::from(value)) }
    }

    pub fn push_integer(&mut self, value: i64) {
        unsafe { ffi::lua_pushinteger(self.raw, value as ffi::lua_Integer) }
    }

    pub fn push_number(&mut self, value: f64) {
        unsafe { ffi::lua_pushnumber(self.raw, value as ffi::lua_Number) }
    }

    pub fn push_string(&mut self, value: &str) {
        self.push_bytes(value.as_bytes());
    }

    /// Strings are byte strings on the runtime side; embedded NULs survive
    pub fn push_bytes(&mut self, value: &[u8]) {
        unsafe {
            ffi::lua_pushlstring(self.raw, value.as_ptr() as *const c_char, value.len());
        }
    }

    /// `None` is pushed as nil and reads back as `None`
    pub fn push_opt_string(&mut self, value: Option<&str>) {
        match value {
            Some(s) => self.push_string(s),
            None => self.push_nil(),
        }
    }

    pub fn push_light_userdata(&mut self, ptr: *mut c_void) {
        unsafe { ffi::lua_pushlightuserdata(self.raw, ptr) }
    }

    /// Push a plain native function; host closures go through `push_closure`
    pub fn push_native_function(&mut self, func: ffi::lua_CFunction) {
        unsafe { ffi::lua_pushcclosure(self.raw, func, 0) }
    }

    /// Push a copy of the value at `idx`
    pub fn push_value(&mut self, idx: i32) {
        unsafe { ffi::lua_pushvalue(self.raw, idx) }
    }

    // ==================== 栈内移动 ====================

    pub fn remove(&mut self, idx: i32) {
        unsafe { ffi::lua_remove(self.raw, idx) }
    }

    /// Move the top value into `idx`, shifting the slots above it up
    pub fn insert(&mut self, idx: i32) {
        unsafe { ffi::lua_insert(self.raw, idx) }
    }

    /// Pop the top value into `idx`
    pub fn replace(&mut self, idx: i32) {
        unsafe { ffi::lua_replace(self.raw, idx) }
    }

    pub fn copy(&mut self, from: i32, to: i32) {
        unsafe { ffi::lua_copy(self.raw, from, to) }
    }

    // ==================== 读取 ====================

    pub fn type_of(&self, idx: i32) -> LuaType {
        LuaType::from_code(unsafe { ffi::lua_type(self.raw, idx) })
    }

    pub fn type_name(&self, idx: i32) -> &'static str {
        self.type_of(idx).name()
    }

    pub fn is_nil(&self, idx: i32) -> bool {
        self.type_of(idx) == LuaType::Nil
    }

    pub fn is_none_or_nil(&self, idx: i32) -> bool {
        self.type_of(idx).is_none_or_nil()
    }

    pub fn is_boolean(&self, idx: i32) -> bool {
        self.type_of(idx) == LuaType::Boolean
    }

    pub fn is_number(&self, idx: i32) -> bool {
        self.type_of(idx) == LuaType::Number
    }

    /// Number slot holding an integer representation
    pub fn is_integer(&self, idx: i32) -> bool {
        unsafe { ffi::lua_isinteger(self.raw, idx) != 0 }
    }

    pub fn is_string(&self, idx: i32) -> bool {
        self.type_of(idx) == LuaType::String
    }

    pub fn is_table(&self, idx: i32) -> bool {
        self.type_of(idx) == LuaType::Table
    }

    pub fn is_function(&self, idx: i32) -> bool {
        self.type_of(idx) == LuaType::Function
    }

    /// Runtime truthiness: only nil and false are false
    pub fn to_boolean(&self, idx: i32) -> bool {
        unsafe { ffi::lua_toboolean(self.raw, idx) != 0 }
    }

    pub fn to_integer(&self, idx: i32) -> Option<i64> {
        let mut isnum: c_int = 0;
        let value = unsafe { ffi::lua_tointegerx(self.raw, idx, &mut isnum) };
        (isnum != 0).then_some(value as i64)
    }

    pub fn to_number(&self, idx: i32) -> Option<f64> {
        let mut isnum: c_int = 0;
        let value = unsafe { ffi::lua_tonumberx(self.raw, idx, &mut isnum) };
        (isnum != 0).then_some(value as f64)
    }

    /// String contents of a string or number slot.
    ///
    /// Numbers are converted through a temporary copy, so the slot itself
    /// keeps its number type (the runtime's own conversion rewrites it).
    pub fn to_bytes(&self, idx: i32) -> Option<Vec<u8>> {
        match self.type_of(idx) {
            LuaType::String => unsafe { read_lstring(self.raw, idx) },
            LuaType::Number => unsafe {
                ffi::lua_pushvalue(self.raw, idx);
                let bytes = read_lstring(self.raw, -1);
                ffi::lua_pop(self.raw, 1);
                bytes
            },
            _ => None,
        }
    }

    /// Like `to_bytes`, decoded as UTF-8 with replacement characters
    pub fn to_string(&self, idx: i32) -> Option<String> {
        self.to_bytes(idx)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn to_userdata(&self, idx: i32) -> *mut c_void {
        unsafe { ffi::lua_touserdata(self.raw, idx) }
    }

    /// Identity of a reference value (table, function, userdata, thread)
    pub fn to_pointer(&self, idx: i32) -> *const c_void {
        unsafe { ffi::lua_topointer(self.raw, idx) }
    }

    /// Length without metamethods (strings: bytes, tables: border)
    pub fn raw_len(&self, idx: i32) -> usize {
        unsafe { ffi::lua_rawlen(self.raw, idx) as usize }
    }

    pub fn raw_equal(&self, a: i32, b: i32) -> bool {
        unsafe { ffi::lua_rawequal(self.raw, a, b) != 0 }
    }
}

/// # Safety
/// `idx` must be an acceptable index of `raw`.
unsafe fn read_lstring(raw: *mut ffi::lua_State, idx: i32) -> Option<Vec<u8>> {
    let mut len: usize = 0;
    let data = ffi::lua_tolstring(raw, idx, &mut len);
    if data.is_null() {
        return None;
    }
    if len == 0 {
        return Some(Vec::new());
    }
    Some(std::slice::from_raw_parts(data as *const u8, len).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State {
        State::new().unwrap()
    }

    #[test]
    fn test_push_increments_top() {
        let mut s = state();
        s.push_nil();
        s.push_boolean(true);
        s.push_integer(3);
        s.push_number(1.5);
        s.push_string("x");
        assert_eq!(s.top(), 5);
        s.pop(5);
        assert_eq!(s.top(), 0);
    }

    #[test]
    fn test_roundtrip_primitives() {
        let mut s = state();

        s.push_string("hello");
        assert_eq!(s.to_string(-1), Some("hello".to_string()));

        s.push_number(2.5);
        assert_eq!(s.to_number(-1), Some(2.5));

        s.push_integer(-42);
        assert_eq!(s.to_integer(-1), Some(-42));
        assert!(s.is_integer(-1));

        s.push_boolean(false);
        assert!(!s.to_boolean(-1));
        assert!(s.is_boolean(-1));

        assert_eq!(s.top(), 4);
    }

    #[test]
    fn test_absent_string_is_none() {
        let mut s = state();
        s.push_opt_string(None);
        assert!(s.is_nil(-1));
        assert_eq!(s.to_string(-1), None);
        s.push_boolean(true);
        assert_eq!(s.to_string(-1), None);
        // 空字符串不是“缺失”
        s.push_string("");
        assert_eq!(s.to_string(-1), Some(String::new()));
    }

    #[test]
    fn test_reading_number_as_string_keeps_slot_type() {
        let mut s = state();
        s.push_integer(10);
        assert_eq!(s.to_string(-1), Some("10".to_string()));
        assert_eq!(s.type_of(-1), LuaType::Number);
        assert_eq!(s.top(), 1);
    }

    #[test]
    fn test_numeric_string_converts() {
        let mut s = state();
        s.push_string("12");
        assert_eq!(s.to_integer(-1), Some(12));
        assert_eq!(s.to_number(-1), Some(12.0));
        s.push_string("twelve");
        assert_eq!(s.to_integer(-1), None);
        assert_eq!(s.to_number(-1), None);
    }

    #[test]
    fn test_bytes_with_nul() {
        let mut s = state();
        s.push_bytes(b"a\0b");
        assert_eq!(s.to_bytes(-1), Some(b"a\0b".to_vec()));
        assert_eq!(s.raw_len(-1), 3);
    }

    #[test]
    fn test_set_top_extends_with_nil() {
        let mut s = state();
        s.push_integer(1);
        s.set_top(3);
        assert_eq!(s.top(), 3);
        assert!(s.is_nil(2));
        assert!(s.is_nil(3));
        s.set_top(1);
        assert_eq!(s.to_integer(1), Some(1));
    }

    #[test]
    fn test_type_of_none_beyond_top() {
        let mut s = state();
        s.push_integer(1);
        assert_eq!(s.type_of(2), LuaType::None);
        assert!(s.is_none_or_nil(2));
    }

    #[test]
    fn test_insert_remove_replace_copy() {
        let mut s = state();
        s.push_integer(1);
        s.push_integer(2);
        s.push_integer(3);

        s.insert(1); // 3 1 2
        assert_eq!(s.to_integer(1), Some(3));

        s.remove(1); // 1 2
        assert_eq!(s.to_integer(1), Some(1));

        s.push_integer(9);
        s.replace(1); // 9 2
        assert_eq!(s.to_integer(1), Some(9));
        assert_eq!(s.top(), 2);

        s.copy(1, 2); // 9 9
        assert!(s.raw_equal(1, 2));
    }

    #[test]
    fn test_push_value_copies() {
        let mut s = state();
        s.push_string("a");
        s.push_value(-1);
        assert_eq!(s.top(), 2);
        assert!(s.raw_equal(1, 2));
    }
}
