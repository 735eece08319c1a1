//! Deterministic simulated radio.
//!
//! Stands in for the real BLE stack: it answers status/RSSI polls, accepts
//! the advertising-restart hook, and runs its own push thread that delivers
//! asynchronous status changes exactly like a radio stack callback would
//! (on a foreign thread, at its own pace).
//!
//! The RSSI walk mirrors a plausible link: a bounded pseudo-random drift
//! clamped to [-90, -30] dBm, so the weak-signal path is exercised without
//! real hardware.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use super::{ConnectionStatusSource, SignalSource, StatusHandler};
use crate::monitor::state::ConnectionState;

/// Simulated push cadence.
const PUSH_INTERVAL: Duration = Duration::from_millis(500);
/// Push intervals spent advertising before the bonded peer "connects".
const CONNECT_AFTER_TICKS: u32 = 6;
/// Push intervals spent connected before the peer "walks away".
const DROP_AFTER_TICKS: u32 = 60;

struct Inner {
    status: ConnectionState,
    handler: Option<StatusHandler>,
    ticks: u32,
    rssi: i8,
    counter: u8,
}

pub struct SimulatedRadio {
    inner: Mutex<Inner>,
    stop: AtomicBool,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedRadio {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: ConnectionState::Off,
                handler: None,
                ticks: 0,
                rssi: -50,
                counter: 0,
            }),
            stop: AtomicBool::new(false),
            thread: Mutex::new(None),
        }
    }

    /// Start the push thread. Idempotent; a spawn failure is reported to
    /// the caller.
    pub fn start(self: &Arc<Self>) -> io::Result<()> {
        let mut slot = self.thread.lock();
        if slot.is_some() {
            return Ok(());
        }
        let radio = Arc::clone(self);
        let handle = std::thread::Builder::new()
            .name("radio-sim".into())
            .spawn(move || radio.push_loop())?;
        *slot = Some(handle);
        Ok(())
    }

    /// Stop the push thread and wait for it. Safe to call more than once.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }

    fn push_loop(&self) {
        while !self.stop.load(Ordering::SeqCst) {
            let (pushed, handler) = {
                let mut inner = self.inner.lock();
                inner.ticks += 1;
                match inner.status {
                    ConnectionState::Advertising if inner.ticks >= CONNECT_AFTER_TICKS => {
                        inner.status = ConnectionState::Connected;
                        inner.ticks = 0;
                        (Some(ConnectionState::Connected), inner.handler.clone())
                    }
                    ConnectionState::Connected if inner.ticks >= DROP_AFTER_TICKS => {
                        inner.status = ConnectionState::Off;
                        inner.ticks = 0;
                        (Some(ConnectionState::Off), inner.handler.clone())
                    }
                    _ => (None, None),
                }
            };

            // Invoke outside the lock: the handler takes the monitor's lock
            // and must not nest inside ours.
            if let (Some(status), Some(handler)) = (pushed, handler) {
                log::debug!("sim radio pushing status {}", status);
                handler(status);
            }

            // Sliced sleep keeps shutdown latency bounded.
            let mut remaining = PUSH_INTERVAL;
            while !remaining.is_zero() && !self.stop.load(Ordering::SeqCst) {
                let slice = remaining.min(Duration::from_millis(100));
                std::thread::sleep(slice);
                remaining -= slice;
            }
        }
    }
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatedRadio {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl ConnectionStatusSource for SimulatedRadio {
    fn status(&self) -> ConnectionState {
        self.inner.lock().status
    }

    fn set_status_handler(&self, handler: Option<StatusHandler>) {
        self.inner.lock().handler = handler;
    }

    fn start_advertising(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.status != ConnectionState::Connected {
            inner.status = ConnectionState::Advertising;
            inner.ticks = 0;
        }
        true
    }

    fn has_bonded_peer(&self) -> bool {
        true
    }
}

impl SignalSource for SimulatedRadio {
    fn rssi(&self) -> i8 {
        let mut inner = self.inner.lock();
        if inner.status != ConnectionState::Connected {
            return crate::monitor::state::NO_SIGNAL_RSSI;
        }
        inner.counter = inner.counter.wrapping_add(1);
        let drift = (inner.counter % 20) as i8 - 10;
        inner.rssi = inner.rssi.saturating_add(drift).clamp(-90, -30);
        inner.rssi
    }
}
