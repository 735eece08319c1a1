//! External radio collaborators, interfaces only.
//!
//! The monitor core consumes these traits; the shipped implementation is a
//! deterministic simulator ([`sim::SimulatedRadio`]) standing in for a real
//! BLE stack.

pub mod notify;
pub mod sim;

use std::sync::Arc;

use crate::monitor::state::ConnectionState;

/// Typed handler for asynchronous status pushes.
///
/// Invoked on the radio stack's own thread. Handlers must never block that
/// thread; the installed handler drops updates it cannot apply quickly.
pub type StatusHandler = Arc<dyn Fn(ConnectionState) + Send + Sync>;

/// Pollable connection status plus push registration and recovery hooks.
pub trait ConnectionStatusSource: Send + Sync {
    /// Current link status as the radio stack sees it.
    fn status(&self) -> ConnectionState;

    /// Install (`Some`) or detach (`None`) the push handler. Detaching
    /// guarantees no further invocations once the call returns.
    fn set_status_handler(&self, handler: Option<StatusHandler>);

    /// Attempt to (re)start advertising. Returns false if the radio is
    /// incapable.
    fn start_advertising(&self) -> bool;

    /// Whether a bonded peer exists that may auto-connect while advertising.
    fn has_bonded_peer(&self) -> bool;
}

/// Pollable signed RSSI of the current link, in dBm.
pub trait SignalSource: Send + Sync {
    fn rssi(&self) -> i8;
}

pub use notify::{ConsoleSink, LedColor, NotificationSink, NotifyStep};
pub use sim::SimulatedRadio;
