//! Shared monitor state and its guard.
//!
//! A single `parking_lot::Mutex` guards all mutable monitor state; the
//! polling worker, the asynchronous status push and the UI command handler
//! all go through [`SharedState`]. Snapshots are copied out under the lock,
//! nothing blocking ever runs inside a critical section.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

/// RSSI sentinel for "no signal".
pub const NO_SIGNAL_RSSI: i8 = -127;

/// Placeholder RSSI reported while advertising (no peer to measure against).
pub const ADVERTISING_RSSI: i8 = -85;

/// Link state of the monitored peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Off,
    Advertising,
    Connected,
    Unavailable,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Off => "Off",
            ConnectionState::Advertising => "Advertising",
            ConnectionState::Connected => "Connected",
            ConnectionState::Unavailable => "Unavailable",
        };
        f.write_str(s)
    }
}

/// One RSSI reading. `rssi` is always within `[-127, 0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSample {
    pub rssi: i8,
    pub captured_at: DateTime<Local>,
}

impl SignalSample {
    /// Build a sample, clamping the reading into the valid range.
    pub fn new(rssi: i8) -> Self {
        Self {
            rssi: rssi.clamp(NO_SIGNAL_RSSI, 0),
            captured_at: Local::now(),
        }
    }

    /// The "no signal" sample.
    pub fn none() -> Self {
        Self::new(NO_SIGNAL_RSSI)
    }
}

/// Application lifecycle. Monotonic except Foreground -> Hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleState {
    Foreground,
    Hidden,
    Exiting,
    Terminated,
}

/// All mutable monitor state, guarded by the lock in [`SharedState`].
#[derive(Debug, Clone, Copy)]
pub struct MonitorState {
    pub connection: ConnectionState,
    pub last_sample: SignalSample,
    pub was_connected: bool,
    pub enabled: bool,
    pub lifecycle: AppLifecycleState,
}

impl MonitorState {
    fn new(enabled: bool, lifecycle: AppLifecycleState) -> Self {
        Self {
            connection: ConnectionState::Off,
            last_sample: SignalSample::none(),
            was_connected: false,
            enabled,
            lifecycle,
        }
    }
}

/// Immutable copy handed to the renderer and to log consumers.
pub type StateSnapshot = MonitorState;

/// Cooperative cancellation flags shared by every component.
///
/// `exit` means a full shutdown was requested; `processing` means teardown is
/// in progress and external pushes must be dropped. Every sleeping context
/// re-checks these at <= 100 ms granularity.
#[derive(Debug, Default)]
pub struct ShutdownFlags {
    exit: AtomicBool,
    processing: AtomicBool,
}

impl ShutdownFlags {
    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    pub fn set_processing(&self, value: bool) {
        self.processing.store(value, Ordering::SeqCst);
    }

    /// True while an external push must be dropped instead of applied.
    pub fn reject_pushes(&self) -> bool {
        self.exit_requested() || self.processing.load(Ordering::SeqCst)
    }
}

/// The single lock around [`MonitorState`], plus the shutdown flags.
pub struct SharedState {
    inner: Mutex<MonitorState>,
    flags: ShutdownFlags,
}

impl SharedState {
    pub fn new(enabled: bool, lifecycle: AppLifecycleState) -> Self {
        Self {
            inner: Mutex::new(MonitorState::new(enabled, lifecycle)),
            flags: ShutdownFlags::default(),
        }
    }

    pub fn flags(&self) -> &ShutdownFlags {
        &self.flags
    }

    /// Copy the state out under the lock.
    pub fn snapshot(&self) -> StateSnapshot {
        *self.inner.lock()
    }

    /// Apply a transition atomically.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut MonitorState) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Apply a transition only if the lock can be taken within `timeout`.
    ///
    /// This is the path used by the asynchronous status push, which must
    /// never block the radio stack's thread: on timeout the update is simply
    /// dropped by the caller.
    pub fn try_mutate_for<R>(
        &self,
        timeout: Duration,
        f: impl FnOnce(&mut MonitorState) -> R,
    ) -> Option<R> {
        let mut guard = self.inner.try_lock_for(timeout)?;
        Some(f(&mut guard))
    }
}
