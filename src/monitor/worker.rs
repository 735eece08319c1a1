//! Background polling worker.
//!
//! A dedicated thread samples the link every poll interval, applies the
//! level-triggered recovery table, runs the alert policy on the observed
//! transition and delivers the resulting sequences. The poll sleep is
//! decomposed into short slices so a pending exit is observed within one
//! poll granularity.
//!
//! Alert events are computed and copied out under the lock, then delivered
//! after the lock is released; a notification delay never starves the
//! asynchronous status push.

use std::io;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

use super::alerts::{evaluate_transition, sequence_for, AlertKind};
use super::state::{ConnectionState, SharedState, SignalSample, ADVERTISING_RSSI};
use crate::core::event_log::EventLog;
use crate::radio::notify::{deliver_sequence, NotificationSink};
use crate::radio::{ConnectionStatusSource, SignalSource};

/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Everything the worker needs. The shared state and the notification sink
/// are held weakly: the worker only ever borrows them, and a failed upgrade
/// (an essential dependency gone) is fatal for the loop.
pub struct WorkerDeps {
    pub state: Weak<SharedState>,
    pub sink: Weak<dyn NotificationSink>,
    pub radio: Arc<dyn ConnectionStatusSource>,
    pub signal: Arc<dyn SignalSource>,
    pub event_log: Arc<EventLog>,
    pub poll_interval: Duration,
    pub threshold_dbm: i8,
}

/// Spawn the polling worker thread. Failure to spawn is fatal for startup
/// and reported to the caller.
pub fn spawn(deps: WorkerDeps) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("leash-worker".into())
        .spawn(move || run(deps))
}

fn run(deps: WorkerDeps) {
    log::info!("Worker thread started");

    let mut previous = match deps.state.upgrade() {
        Some(state) => state.snapshot().connection,
        None => return,
    };

    loop {
        // Essential dependencies gone means the controller is past the point
        // where this loop may touch anything. Exit, do not retry.
        let Some(state) = deps.state.upgrade() else {
            log::error!("Shared state released, exiting worker");
            break;
        };
        let Some(sink) = deps.sink.upgrade() else {
            log::error!("Notification sink released, exiting worker");
            break;
        };
        if state.flags().exit_requested() {
            break;
        }

        let snapshot = state.snapshot();
        if snapshot.enabled {
            tick(&deps, &state, sink.as_ref(), &mut previous, snapshot.connection);
        }

        // Short sub-sleeps so a pending exit is observed within ~100 ms.
        let mut remaining = deps.poll_interval;
        while !remaining.is_zero() && !state.flags().exit_requested() {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining -= slice;
        }
    }

    log::info!("Worker thread stopping");
}

/// One monitoring tick: recovery, sampling, alert policy, side effects.
fn tick(
    deps: &WorkerDeps,
    state: &SharedState,
    sink: &dyn NotificationSink,
    previous: &mut ConnectionState,
    observed: ConnectionState,
) {
    let mut current = observed;

    // Recovery is level-triggered: re-attempted on every tick spent in a
    // recoverable state, not just on entry.
    let sample = match current {
        ConnectionState::Off => {
            log::info!("Link is off, attempting to restart advertising");
            if deps.radio.start_advertising() {
                current = ConnectionState::Advertising;
            }
            SignalSample::none()
        }
        ConnectionState::Advertising => {
            if deps.radio.has_bonded_peer() {
                log::debug!("Advertising, waiting for bonded peer to connect");
            } else {
                log::debug!("Advertising, no bonded peer known");
            }
            SignalSample::new(ADVERTISING_RSSI)
        }
        ConnectionState::Connected => {
            let sample = SignalSample::new(deps.signal.rssi());
            log::debug!("Connected, RSSI: {} dBm", sample.rssi);
            if sample.rssi < deps.threshold_dbm {
                log::warn!(
                    "Weak signal: {} dBm (threshold: {})",
                    sample.rssi,
                    deps.threshold_dbm
                );
            }
            sample
        }
        ConnectionState::Unavailable => {
            log::warn!("Radio unavailable, no recovery attempted");
            SignalSample::none()
        }
    };

    let events = evaluate_transition(*previous, current, sample, deps.threshold_dbm);

    state.mutate(|m| {
        m.connection = current;
        m.last_sample = sample;
        m.was_connected = current == ConnectionState::Connected;
    });
    *previous = current;

    deps.event_log.append(current, sample.rssi);

    // Delivery happens outside the critical section and re-checks the exit
    // flag before every stage.
    for event in &events {
        if state.flags().exit_requested() {
            return;
        }
        deliver_sequence(sink, sequence_for(event.kind), state.flags());

        if event.kind == AlertKind::Disconnected {
            log::warn!("Peripheral disconnected");
            if deps.radio.start_advertising() {
                state.mutate(|m| m.connection = ConnectionState::Advertising);
            }
        }
    }
}
