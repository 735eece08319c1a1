//! Bridges asynchronous radio-stack status pushes into the shared state.
//!
//! The push handler runs on the radio stack's own thread and must never
//! block it: the lock is taken with a short timeout and the update is
//! silently dropped on failure or during shutdown. Best-effort freshness is
//! the deliberate tradeoff; the polling worker re-reads the source anyway.

use std::sync::Arc;
use std::time::Duration;

use super::state::{ConnectionState, SharedState};
use crate::radio::ConnectionStatusSource;

/// How long a push may wait for the state lock before being dropped.
pub const PUSH_LOCK_TIMEOUT: Duration = Duration::from_millis(50);

/// Install the typed push handler. Must be paired with
/// [`detach_status_handler`] before the shared state is released.
pub fn install_status_handler(radio: &dyn ConnectionStatusSource, state: &Arc<SharedState>) {
    let weak = Arc::downgrade(state);
    radio.set_status_handler(Some(Arc::new(move |status| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if state.flags().reject_pushes() {
            return;
        }
        let applied = state.try_mutate_for(PUSH_LOCK_TIMEOUT, |m| {
            m.connection = status;
            m.was_connected = status == ConnectionState::Connected;
        });
        // Lock timeouts are transient misses, dropped without logging
        // overhead on the radio thread.
        if applied.is_some() {
            log::debug!("status push applied: {}", status);
        }
    })));
}

/// Detach the push handler; no further pushes mutate state once this returns.
pub fn detach_status_handler(radio: &dyn ConnectionStatusSource) {
    radio.set_status_handler(None);
}
