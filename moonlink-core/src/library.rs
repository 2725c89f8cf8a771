//! 库构建器
//!
//! A `Library` is a host-side description of a module table: scalars, nested
//! tables, host closures and plain native functions. Building it pushes one
//! runtime table; registering it also makes it a global and a loaded module,
//! so `require(name)` returns the same table without building it again.

use crate::bridge::HostFn;
use crate::error::CoreError;
use crate::ffi;
use crate::state::State;
use moonlink_log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One entry of a library table
#[derive(Clone)]
pub enum LibValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Table(Library),
    /// Host closure, bridged when the library is built
    Function(Arc<HostFn>),
    /// Plain native function, pushed without bridging
    Native(ffi::lua_CFunction),
}

impl std::fmt::Debug for LibValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibValue::Nil => write!(f, "Nil"),
            LibValue::Boolean(b) => write!(f, "Boolean({})", b),
            LibValue::Integer(n) => write!(f, "Integer({})", n),
            LibValue::Number(n) => write!(f, "Number({})", n),
            LibValue::String(s) => write!(f, "String({:?})", s),
            LibValue::Table(lib) => f.debug_tuple("Table").field(lib).finish(),
            LibValue::Function(_) => write!(f, "Function(..)"),
            LibValue::Native(func) => write!(f, "Native({:p})", *func as *const ()),
        }
    }
}

impl From<bool> for LibValue {
    fn from(b: bool) -> Self {
        LibValue::Boolean(b)
    }
}

impl From<i64> for LibValue {
    fn from(n: i64) -> Self {
        LibValue::Integer(n)
    }
}

impl From<i32> for LibValue {
    fn from(n: i32) -> Self {
        LibValue::Integer(n as i64)
    }
}

impl From<f64> for LibValue {
    fn from(n: f64) -> Self {
        LibValue::Number(n)
    }
}

impl From<&str> for LibValue {
    fn from(s: &str) -> Self {
        LibValue::String(s.to_string())
    }
}

impl From<String> for LibValue {
    fn from(s: String) -> Self {
        LibValue::String(s)
    }
}

impl From<Library> for LibValue {
    fn from(lib: Library) -> Self {
        LibValue::Table(lib)
    }
}

/// Ordered name → value mapping
#[derive(Clone, Debug, Default)]
pub struct Library {
    entries: BTreeMap<String, LibValue>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<LibValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn function<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut State) -> i32 + Send + Sync + 'static,
    {
        self.with(name, LibValue::Function(Arc::new(func)))
    }

    pub fn native(self, name: impl Into<String>, func: ffi::lua_CFunction) -> Self {
        self.with(name, LibValue::Native(func))
    }

    pub fn table(self, name: impl Into<String>, nested: Library) -> Self {
        self.with(name, LibValue::Table(nested))
    }

    /// Insert or replace; returns the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<LibValue>) -> Option<LibValue> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&LibValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LibValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl State {
    /// Build `library` and push the resulting table.
    ///
    /// On error the stack is restored to its height before the call.
    /// Closures bridged before the failure stay registered until the
    /// collector reclaims them.
    pub fn push_library(&mut self, library: &Library) -> Result<(), CoreError> {
        let base = self.top();
        let result = self.build_table(library);
        if result.is_err() {
            self.set_top(base);
        }
        result
    }

    fn build_table(&mut self, library: &Library) -> Result<(), CoreError> {
        self.ensure_stack(2)?;
        let nrec = i32::try_from(library.len()).unwrap_or(i32::MAX);
        self.create_table(0, nrec);
        for (name, value) in library.iter() {
            self.push_lib_value(value)?;
            self.set_field(-2, name, -1)?;
            self.pop(1);
        }
        Ok(())
    }

    fn push_lib_value(&mut self, value: &LibValue) -> Result<(), CoreError> {
        match value {
            LibValue::Nil => self.push_nil(),
            LibValue::Boolean(b) => self.push_boolean(*b),
            LibValue::Integer(n) => self.push_integer(*n),
            LibValue::Number(n) => self.push_number(*n),
            LibValue::String(s) => self.push_string(s),
            LibValue::Table(nested) => self.build_table(nested)?,
            LibValue::Function(func) => {
                self.push_host_fn(func.clone())?;
            }
            LibValue::Native(func) => self.push_native_function(*func),
        }
        Ok(())
    }

    /// Build `library`, bind it as the global `name` and mark it loaded.
    ///
    /// The table is left on top.
    pub fn register_library(&mut self, name: &str, library: &Library) -> Result<(), CoreError> {
        let base = self.top();
        let result = self.register_built(name, library);
        if result.is_err() {
            self.set_top(base);
        } else {
            debug!(
                self.logger(),
                "registered library '{}' ({} entries)",
                name,
                library.len()
            );
        }
        result
    }

    fn register_built(&mut self, name: &str, library: &Library) -> Result<(), CoreError> {
        self.push_library(library)?;
        self.ensure_stack(2)?;

        self.push_value(-1);
        self.set_global(name)?;

        unsafe {
            ffi::luaL_getsubtable(
                self.as_ptr(),
                ffi::LUA_REGISTRYINDEX,
                ffi::LOADED_TABLE.as_ptr(),
            );
        }
        self.set_field(-1, name, -2)?;
        self.pop(1);
        Ok(())
    }
}
