//! 回调注册表
//!
//! Process-wide map from identity to host closure. Identities come from a
//! counter that starts at 1 and is never rewound, so an identity is never
//! reused while the process lives, whichever state bridged it.
//!
//! The lock is held only for the map operation itself. Callers clone the
//! entry out before running the closure or touching the runtime.

use crate::state::State;
use moonlink_log::Logger;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Host closure callable from scripts.
///
/// Arguments sit at 1..=top on entry. The closure pushes its results and
/// returns how many of the topmost slots are results.
pub type HostFn = dyn Fn(&mut State) -> i32 + Send + Sync + 'static;

/// Identity of a bridged closure
pub type CallbackId = u64;

#[derive(Clone)]
pub struct CallbackEntry {
    pub func: Arc<HostFn>,
    /// Logger of the state that bridged the closure
    pub logger: Arc<Logger>,
}

impl std::fmt::Debug for CallbackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackEntry").finish_non_exhaustive()
    }
}

pub struct CallbackRegistry {
    entries: Mutex<HashMap<CallbackId, CallbackEntry>>,
    next_id: AtomicU64,
}

static GLOBAL: Lazy<CallbackRegistry> = Lazy::new(CallbackRegistry::new);

impl CallbackRegistry {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The registry shared by every state in the process
    pub fn global() -> &'static CallbackRegistry {
        &GLOBAL
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CallbackId, CallbackEntry>> {
        // 条目插入/删除都是单步操作，中毒后数据仍然一致
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `func` under a fresh identity
    pub fn register(&self, func: Arc<HostFn>, logger: Arc<Logger>) -> CallbackId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, CallbackEntry { func, logger });
        id
    }

    /// Clone of the entry for `id`, if still live
    pub fn lookup(&self, id: CallbackId) -> Option<CallbackEntry> {
        self.lock().get(&id).cloned()
    }

    /// Remove and return the entry; absent identities are a no-op
    pub fn take(&self, id: CallbackId) -> Option<CallbackEntry> {
        self.lock().remove(&id)
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Remove a batch; returns how many were still present.
    ///
    /// The removed closures are dropped after the lock is released.
    pub fn release<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = CallbackId>,
    {
        let removed: Vec<CallbackEntry> = {
            let mut entries = self.lock();
            ids.into_iter().filter_map(|id| entries.remove(&id)).collect()
        };
        removed.len()
    }

    /// Live entries across every state in the process
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
