//! 栈值快照
//!
//! `Value` copies a slot out of the runtime. Scalars are copied by value;
//! reference types keep only their identity, so they cannot be pushed back.

use crate::error::CoreError;
use crate::state::{LuaType, State};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    /// Identity (address) of a table
    Table(usize),
    Function(usize),
    Userdata(usize),
    Thread(usize),
    LightUserdata(usize),
}

impl Value {
    pub fn lua_type(&self) -> LuaType {
        match self {
            Value::Nil => LuaType::Nil,
            Value::Boolean(_) => LuaType::Boolean,
            Value::Integer(_) | Value::Number(_) => LuaType::Number,
            Value::String(_) => LuaType::String,
            Value::Table(_) => LuaType::Table,
            Value::Function(_) => LuaType::Function,
            Value::Userdata(_) => LuaType::Userdata,
            Value::Thread(_) => LuaType::Thread,
            Value::LightUserdata(_) => LuaType::LightUserdata,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Table(p) => write!(f, "table: {:#x}", p),
            Value::Function(p) => write!(f, "function: {:#x}", p),
            Value::Userdata(p) => write!(f, "userdata: {:#x}", p),
            Value::Thread(p) => write!(f, "thread: {:#x}", p),
            Value::LightUserdata(p) => write!(f, "userdata: {:#x}", p),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl State {
    /// Snapshot of the slot at `idx`; an empty slot reads as `Nil`
    pub fn to_value(&self, idx: i32) -> Value {
        match self.type_of(idx) {
            LuaType::None | LuaType::Nil => Value::Nil,
            LuaType::Boolean => Value::Boolean(self.to_boolean(idx)),
            LuaType::Number => {
                if self.is_integer(idx) {
                    Value::Integer(self.to_integer(idx).unwrap_or_default())
                } else {
                    Value::Number(self.to_number(idx).unwrap_or_default())
                }
            }
            LuaType::String => Value::String(self.to_string(idx).unwrap_or_default()),
            LuaType::Table => Value::Table(self.to_pointer(idx) as usize),
            LuaType::Function => Value::Function(self.to_pointer(idx) as usize),
            LuaType::Userdata => Value::Userdata(self.to_pointer(idx) as usize),
            LuaType::Thread => Value::Thread(self.to_pointer(idx) as usize),
            LuaType::LightUserdata => Value::LightUserdata(self.to_userdata(idx) as usize),
        }
    }

    /// Push a scalar snapshot back; reference types are refused
    pub fn push_value_of(&mut self, value: &Value) -> Result<(), CoreError> {
        match value {
            Value::Nil => self.push_nil(),
            Value::Boolean(b) => self.push_boolean(*b),
            Value::Integer(n) => self.push_integer(*n),
            Value::Number(n) => self.push_number(*n),
            Value::String(s) => self.push_string(s),
            other => return Err(CoreError::NotPushable(other.lua_type())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_scalars() {
        let mut s = State::new().unwrap();
        s.push_nil();
        s.push_boolean(true);
        s.push_integer(3);
        s.push_number(0.5);
        s.push_string("s");
        assert_eq!(s.to_value(1), Value::Nil);
        assert_eq!(s.to_value(2), Value::Boolean(true));
        assert_eq!(s.to_value(3), Value::Integer(3));
        assert_eq!(s.to_value(4), Value::Number(0.5));
        assert_eq!(s.to_value(5), Value::from("s"));
        assert_eq!(s.to_value(6), Value::Nil);
    }

    #[test]
    fn test_reference_identity() {
        let mut s = State::new().unwrap();
        s.new_table();
        s.push_value(-1);
        let a = s.to_value(1);
        assert!(matches!(a, Value::Table(_)));
        assert_eq!(a, s.to_value(2));
        assert_eq!(
            s.push_value_of(&a),
            Err(CoreError::NotPushable(LuaType::Table))
        );
        assert_eq!(s.top(), 2);
    }

    #[test]
    fn test_push_back() {
        let mut s = State::new().unwrap();
        for v in [Value::Integer(9), Value::from("x"), Value::Boolean(false)] {
            s.push_value_of(&v).unwrap();
            assert_eq!(s.to_value(-1), v);
        }
    }

    #[test]
    fn test_accessors_and_display() {
        assert_eq!(Value::Integer(2).as_number(), Some(2.0));
        assert_eq!(Value::Number(2.5).as_integer(), None);
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Table(0x10).to_string(), "table: 0x10");
    }
}
