use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::config::SessionConfig;

use super::SessionStore;

/// Background task that keeps a valid session alive across its expiry
/// window.
///
/// While running, the monitor wakes on a fixed interval and extends any
/// session that has entered the warning window before its expiry. An expired
/// or absent session is left alone; the store and authenticator have already
/// converged to logged-out by then. The monitor is either stopped or
/// running, and both `start` and `stop` are idempotent.
pub struct ExpiryMonitor {
    store: Arc<SessionStore>,
    config: SessionConfig,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ExpiryMonitor {
    pub fn new(store: Arc<SessionStore>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            task: Mutex::new(None),
        }
    }

    /// Start the polling loop. A no-op when already running.
    pub fn start(&self) {
        let mut task = self.lock_task();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let store = self.store.clone();
        let config = self.config.clone();
        info!(
            poll_minutes = config.poll_interval_minutes,
            warning_minutes = config.expiry_warning_minutes,
            "Starting session expiry monitor"
        );

        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval());
            // The first tick of a tokio interval fires immediately; skip it
            // so the session is not refreshed at startup.
            interval.tick().await;
            loop {
                interval.tick().await;
                poll_once(&store, &config);
            }
        }));
    }

    /// Stop the polling loop. A no-op when already stopped.
    pub fn stop(&self) {
        if let Some(handle) = self.lock_task().take() {
            handle.abort();
            info!("Stopped session expiry monitor");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run one evaluation immediately, outside the polling schedule.
    /// Lets callers (and tests) drive the refresh decision deterministically.
    pub fn tick(&self) {
        poll_once(&self.store, &self.config);
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<tokio::task::JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for ExpiryMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_once(store: &SessionStore, config: &SessionConfig) {
    if !store.is_valid() {
        return;
    }
    if store.expiring_soon(config.warning_window()) {
        debug!("Session expiring soon, refreshing");
        // A failed refresh is retried on the next tick; only reaching true
        // expiry invalidates the session. The refresh write is a single
        // small file replace, short enough to run inline on the worker
        // thread rather than through spawn_blocking.
        match store.refresh(config.ttl()) {
            Ok(()) => info!("Session refreshed"),
            Err(e) => warn!(error = %e, "Session refresh failed, will retry"),
        }
    }
}
