//! moonlink-core - Lua C API 桥接核心
//!
//! Stack abstraction and native callback bridge over the Lua 5.4 C API:
//!
//! - [`State`]: one interpreter and its shared stack, with index
//!   normalization, raw push/read primitives, table helpers and iteration
//! - host closures callable from scripts through one fixed trampoline,
//!   reclaimed when the runtime's collector finalizes them
//! - [`Library`]: nested host-side tables materialized as modules
//!
//! ```
//! use moonlink_core::{Library, State};
//!
//! let mut state = State::new().unwrap();
//! let lib = Library::new().function("greet", |s| {
//!     s.push_string("hello");
//!     1
//! });
//! state.register_library("mylib", &lib).unwrap();
//! state.eval("return mylib.greet()").unwrap();
//! assert_eq!(state.to_string(-1).as_deref(), Some("hello"));
//! ```

pub mod bridge;
pub mod error;
pub mod ffi;
pub mod library;
pub mod state;
pub mod value;

pub use bridge::{CallbackId, CallbackRegistry, HostFn, PanicHandler};
pub use error::CoreError;
pub use library::{LibValue, Library};
pub use state::{is_pseudo_index, normalize_index, LuaType, State, Status};
pub use value::Value;
