//! Raw Lua 5.4 C API surface used by the bridge.
//!
//! The interpreter is compiled from vendored sources by `mlua-sys`; this
//! module narrows its bindings to what the crate actually calls and adds the
//! few names the bridge defines on top of the ABI.

use std::ffi::CStr;

pub use mlua_sys::{
    lua_CFunction, lua_Integer, lua_Number, lua_State, LUA_ERRERR, LUA_ERRFILE, LUA_ERRMEM,
    LUA_ERRRUN, LUA_ERRSYNTAX, LUA_GCCOLLECT, LUA_GCCOUNT, LUA_MULTRET, LUA_OK,
    LUA_REGISTRYINDEX, LUA_RIDX_GLOBALS, LUA_RIDX_MAINTHREAD, LUA_TBOOLEAN, LUA_TFUNCTION, LUA_TLIGHTUSERDATA,
    LUA_TNIL, LUA_TNONE, LUA_TNUMBER, LUA_TSTRING, LUA_TTABLE, LUA_TTHREAD, LUA_TUSERDATA, LUA_YIELD,
};

// -- State management --
pub use mlua_sys::{lua_atpanic, lua_close, luaL_newstate, luaL_openlibs};

// -- Stack manipulation --
pub use mlua_sys::{
    lua_checkstack, lua_copy, lua_gettop, lua_insert, lua_pop, lua_pushvalue, lua_remove,
    lua_replace, lua_settop,
};

// -- Push / read --
pub use mlua_sys::{
    lua_isinteger, lua_pushboolean, lua_pushcclosure, lua_pushinteger, lua_pushlightuserdata,
    lua_pushlstring, lua_pushnil, lua_pushnumber, lua_rawequal, lua_rawlen, lua_toboolean,
    lua_tointegerx, lua_tolstring, lua_tonumberx, lua_topointer, lua_tothread, lua_touserdata,
    lua_type,
};

// -- Tables --
pub use mlua_sys::{
    lua_createtable, lua_gettable, lua_next, lua_rawgeti,
    lua_rawseti, lua_setfield, lua_setmetatable, lua_settable, luaL_getsubtable,
    luaL_newmetatable,
};

// -- Closures and userdata --
pub use mlua_sys::{lua_getupvalue, lua_newuserdatauv, lua_setupvalue, lua_upvalueindex};

// -- Execution --
pub use mlua_sys::{lua_call, lua_error, lua_gc, lua_pcall, luaL_loadbufferx, luaL_loadfilex};

/// Registry key of the loaded-modules table (`package.loaded` aliases it).
pub const LOADED_TABLE: &CStr = c"_LOADED";

/// Registry name of the metatable carried by callback guards.
pub const CALLBACK_GUARD: &CStr = c"moonlink.callback";

/// Chunk name used when the caller does not provide one.
pub const DEFAULT_CHUNK_NAME: &CStr = c"=moonlink";
