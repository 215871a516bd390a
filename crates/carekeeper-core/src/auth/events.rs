use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Handle returned by `subscribe`, usable to remove the listener again.
/// Repeated login/logout cycles would otherwise accumulate stale listeners
/// for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Minimal publish/subscribe registry for session invalidation.
///
/// Navigation and other UI concerns subscribe here so the session store
/// never has to depend on them. Listeners run synchronously in registration
/// order; a panicking listener is caught and logged so the remaining
/// listeners still run.
#[derive(Default)]
pub struct SessionEvents {
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked when the session transitions to invalid.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a previously registered listener. Removing an unknown or
    /// already-removed id is a no-op.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.lock().listeners.retain(|(lid, _)| *lid != id);
    }

    /// Notify every listener that the session has become invalid.
    pub fn publish(&self) {
        // Snapshot under the lock, call outside it: a listener may
        // subscribe or unsubscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                warn!("Session event listener panicked");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
