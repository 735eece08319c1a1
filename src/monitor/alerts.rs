//! Alert policy for connection transitions and weak signal.
//!
//! Pure decision logic: a state transition plus the current sample maps to
//! zero or more alert events. Edge alerts (connected / disconnected) fire
//! exactly once per transition; the weak-signal alert is level-triggered and
//! re-fires on every tick the condition holds.

use std::time::Duration;

use super::state::{ConnectionState, SignalSample};
use crate::radio::notify::{LedColor, NotifyStep};

/// Default weak-signal threshold in dBm.
pub const RSSI_THRESHOLD_DBM: i8 = -70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    WeakSignal,
    Disconnected,
    Connected,
}

/// One alert decision. Produced and consumed within a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub sample: SignalSample,
}

/// Weak signal: vibrate, short pause, stop, red blink.
pub const SEQ_WEAK_SIGNAL: &[NotifyStep] = &[
    NotifyStep::VibrateOn,
    NotifyStep::Delay(Duration::from_millis(200)),
    NotifyStep::VibrateOff,
    NotifyStep::Blink(LedColor::Red),
];

/// Disconnect: double vibration, 150 ms on/off twice.
pub const SEQ_DISCONNECTED: &[NotifyStep] = &[
    NotifyStep::VibrateOn,
    NotifyStep::Delay(Duration::from_millis(150)),
    NotifyStep::VibrateOff,
    NotifyStep::Delay(Duration::from_millis(100)),
    NotifyStep::VibrateOn,
    NotifyStep::Delay(Duration::from_millis(150)),
    NotifyStep::VibrateOff,
];

/// Reconnect: brief green blink.
pub const SEQ_CONNECTED: &[NotifyStep] = &[NotifyStep::Blink(LedColor::Green)];

/// Toggle confirmations.
pub const SEQ_MONITOR_ON: &[NotifyStep] = &[NotifyStep::Blink(LedColor::Green)];
pub const SEQ_MONITOR_OFF: &[NotifyStep] = &[NotifyStep::Blink(LedColor::Red)];

/// Evaluate one tick's transition and produce the alerts to deliver, in order.
pub fn evaluate_transition(
    previous: ConnectionState,
    current: ConnectionState,
    sample: SignalSample,
    threshold_dbm: i8,
) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    // Level-triggered: fires on every tick below threshold, not just the
    // crossing edge.
    if current == ConnectionState::Connected && sample.rssi < threshold_dbm {
        events.push(AlertEvent {
            kind: AlertKind::WeakSignal,
            sample,
        });
    }

    let was_connected = previous == ConnectionState::Connected;
    let is_connected = current == ConnectionState::Connected;

    if was_connected && !is_connected {
        events.push(AlertEvent {
            kind: AlertKind::Disconnected,
            sample,
        });
    } else if !was_connected && is_connected {
        events.push(AlertEvent {
            kind: AlertKind::Connected,
            sample,
        });
    }

    events
}

/// The notification sequence for an alert kind.
pub fn sequence_for(kind: AlertKind) -> &'static [NotifyStep] {
    match kind {
        AlertKind::WeakSignal => SEQ_WEAK_SIGNAL,
        AlertKind::Disconnected => SEQ_DISCONNECTED,
        AlertKind::Connected => SEQ_CONNECTED,
    }
}
