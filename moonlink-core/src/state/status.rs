//! Status codes and type tags reported by the runtime

use crate::ffi;
use std::ffi::c_int;
use std::fmt;

/// Result of a load or a protected invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Yield,
    RuntimeError,
    SyntaxError,
    MemoryError,
    /// Error while running the message handler, or a code this binding does not know
    Unclassified,
    FileError,
}

impl Status {
    pub fn from_code(code: c_int) -> Self {
        match code {
            ffi::LUA_OK => Status::Ok,
            ffi::LUA_YIELD => Status::Yield,
            ffi::LUA_ERRRUN => Status::RuntimeError,
            ffi::LUA_ERRSYNTAX => Status::SyntaxError,
            ffi::LUA_ERRMEM => Status::MemoryError,
            ffi::LUA_ERRFILE => Status::FileError,
            _ => Status::Unclassified,
        }
    }

    pub fn code(&self) -> c_int {
        match self {
            Status::Ok => ffi::LUA_OK,
            Status::Yield => ffi::LUA_YIELD,
            Status::RuntimeError => ffi::LUA_ERRRUN,
            Status::SyntaxError => ffi::LUA_ERRSYNTAX,
            Status::MemoryError => ffi::LUA_ERRMEM,
            Status::Unclassified => ffi::LUA_ERRERR,
            Status::FileError => ffi::LUA_ERRFILE,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Whether the status carries an error object on the stack
    pub fn is_error(&self) -> bool {
        !matches!(self, Status::Ok | Status::Yield)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Yield => "yield",
            Status::RuntimeError => "runtime error",
            Status::SyntaxError => "syntax error",
            Status::MemoryError => "memory error",
            Status::Unclassified => "error",
            Status::FileError => "file error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag of a stack slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LuaType {
    /// Acceptable index with no value
    None,
    Nil,
    Boolean,
    LightUserdata,
    Number,
    String,
    Table,
    Function,
    Userdata,
    Thread,
}

impl LuaType {
    pub fn from_code(code: c_int) -> Self {
        match code {
            ffi::LUA_TNIL => LuaType::Nil,
            ffi::LUA_TBOOLEAN => LuaType::Boolean,
            ffi::LUA_TLIGHTUSERDATA => LuaType::LightUserdata,
            ffi::LUA_TNUMBER => LuaType::Number,
            ffi::LUA_TSTRING => LuaType::String,
            ffi::LUA_TTABLE => LuaType::Table,
            ffi::LUA_TFUNCTION => LuaType::Function,
            ffi::LUA_TUSERDATA => LuaType::Userdata,
            ffi::LUA_TTHREAD => LuaType::Thread,
            _ => LuaType::None,
        }
    }

    /// Same names the runtime's `type()` returns
    pub fn name(&self) -> &'static str {
        match self {
            LuaType::None => "no value",
            LuaType::Nil => "nil",
            LuaType::Boolean => "boolean",
            LuaType::LightUserdata | LuaType::Userdata => "userdata",
            LuaType::Number => "number",
            LuaType::String => "string",
            LuaType::Table => "table",
            LuaType::Function => "function",
            LuaType::Thread => "thread",
        }
    }

    pub fn is_none_or_nil(&self) -> bool {
        matches!(self, LuaType::None | LuaType::Nil)
    }
}

impl fmt::Display for LuaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
