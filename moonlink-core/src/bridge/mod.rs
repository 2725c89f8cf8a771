//! 原生回调桥
//!
//! - `registry`  : process-wide identity → closure map
//! - `trampoline`: the one native entry point all bridged closures share
//! - `lifecycle` : collector-driven and explicit removal of entries
//! - `panic`     : hook for unprotected runtime errors

mod lifecycle;
mod panic;
mod registry;
mod trampoline;

pub(crate) use panic::forget_panic_handler;
pub use panic::PanicHandler;
pub use registry::{CallbackEntry, CallbackId, CallbackRegistry, HostFn};
