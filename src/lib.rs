//! Moonlink - host bindings over the Lua 5.4 C API
//!
//! Moonlink lets host closures be called from scripts as if they were native
//! functions, keeps the bookkeeping for them in step with the runtime's
//! garbage collector, and wraps the shared value stack in index-safe
//! primitives.
//!
//! # Architecture
//!
//! ```text
//! moonlink-config  - pure configuration data
//! moonlink-log     - explicit logger, sinks, ring buffer
//! moonlink-core    - State, stack/table/iteration, callback bridge, libraries
//! moonlink-api     - Runtime facade, RunConfig, BridgeError
//! ```
//!
//! # Quick Start
//!
//! ```
//! use moonlink::{Library, RunConfig, Runtime, Value};
//!
//! let mut rt = Runtime::new(&RunConfig::default()).unwrap();
//! let lib = Library::new().function("greet", |s| {
//!     s.push_string("hello");
//!     1
//! });
//! rt.register("mylib", &lib).unwrap();
//! assert_eq!(rt.eval("return mylib.greet()").unwrap(), vec![Value::from("hello")]);
//! ```

pub use moonlink_api::{
    compile_and_run, config_or_default, get_config, init_config, is_initialized, quick_run, run,
    BridgeError, ErrorReport, ExecuteOutput, RunConfig, Runtime,
};
pub use moonlink_config::{LogLevel, LoggingConfig, MoonlinkConfig, StateConfig};
pub use moonlink_core::{
    normalize_index, CallbackId, CallbackRegistry, CoreError, HostFn, LibValue, Library, LuaType,
    State, Status, Value,
};
pub use moonlink_log::{Level, LogConfig, LogRingBuffer, Logger};

/// Raw runtime ABI, for native functions written against it directly
pub use moonlink_core::ffi;
