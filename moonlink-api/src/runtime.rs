//! 运行时门面
//!
//! `Runtime` owns one `State` and turns the stack protocol into
//! value-returning calls: results are copied out as `Value`s and the stack is
//! put back to the height it had before the call.

use crate::config::RunConfig;
use crate::error::BridgeError;
use moonlink_core::ffi::LUA_MULTRET;
use moonlink_core::{CallbackId, Library, State, Value};
use moonlink_log::{debug, error, info, Logger};
use std::path::Path;
use std::sync::Arc;

pub struct Runtime {
    state: State,
    logger: Arc<Logger>,
}

impl Runtime {
    /// Open a state configured by `config`.
    ///
    /// Unprotected errors on the state dump its stack into the logger before
    /// the runtime aborts.
    pub fn new(config: &RunConfig) -> Result<Self, BridgeError> {
        let mut state = State::with_config(config.state.clone(), config.logger.clone())?;
        let logger = config.logger.clone();
        state.set_panic_handler(move |s| {
            error!(logger, "state is unusable after an unprotected error\n{}", s.dump_stack());
        });
        info!(config.logger, "runtime ready");
        Ok(Self {
            state,
            logger: config.logger.clone(),
        })
    }

    /// Run `code`, discarding results
    pub fn exec(&mut self, code: &str) -> Result<(), BridgeError> {
        self.state.exec(code)?;
        Ok(())
    }

    /// Run `code` and return all of its results
    pub fn eval(&mut self, code: &str) -> Result<Vec<Value>, BridgeError> {
        let base = self.state.top();
        let count = self.state.eval(code)?;
        Ok(self.drain_results(base, count))
    }

    /// Run a script file and return all of its results
    pub fn exec_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Value>, BridgeError> {
        let path = path.as_ref();
        debug!(self.logger, "loading {}", path.display());
        let base = self.state.top();
        let status = self.state.load_file(path)?;
        if !status.is_ok() {
            let message = self.state.pop_error_message();
            return Err(BridgeError::from_status(status, message));
        }
        let status = self.state.pcall(0, LUA_MULTRET, 0);
        if !status.is_ok() {
            let message = self.state.pop_error_message();
            return Err(BridgeError::from_status(status, message));
        }
        let count = self.state.top() - base;
        Ok(self.drain_results(base, count))
    }

    fn drain_results(&mut self, base: i32, count: i32) -> Vec<Value> {
        let values = (1..=count)
            .map(|offset| self.state.to_value(base + offset))
            .collect();
        self.state.set_top(base);
        values
    }

    /// Register `library` as global and loaded module `name`
    pub fn register(&mut self, name: &str, library: &Library) -> Result<(), BridgeError> {
        self.state.register_library(name, library)?;
        self.state.pop(1);
        Ok(())
    }

    /// Bridge `func` and bind it to the global `name`
    pub fn register_fn<F>(&mut self, name: &str, func: F) -> Result<CallbackId, BridgeError>
    where
        F: Fn(&mut State) -> i32 + Send + Sync + 'static,
    {
        let id = self.state.push_closure(func)?;
        self.state.set_global(name)?;
        Ok(id)
    }

    /// Read a global as a value snapshot
    pub fn global(&mut self, name: &str) -> Result<Value, BridgeError> {
        self.state.get_global(name)?;
        let value = self.state.to_value(-1);
        self.state.pop(1);
        Ok(value)
    }

    /// Full collection cycle; returns KiB in use afterwards
    pub fn collect_garbage(&mut self) -> usize {
        self.state.collect_garbage();
        self.state.memory_in_use_kb()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").field("state", &self.state).finish()
    }
}
