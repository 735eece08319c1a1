//! Notification sink and cancellable sequence delivery.
//!
//! A sink accepts individual haptic/visual primitives fire-and-forget.
//! Multi-stage sequences are delivered by [`deliver_sequence`], which
//! re-checks the exit flag before every stage and slices delays, so a
//! pending shutdown cancels a sequence mid-flight within ~250 ms.

use std::time::Duration;

use crate::monitor::state::ShutdownFlags;

const DELAY_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Red,
    Green,
}

/// One haptic/visual primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStep {
    VibrateOn,
    VibrateOff,
    Blink(LedColor),
    Delay(Duration),
}

/// Accepts notification primitives. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, step: NotifyStep);
}

/// Sink that reports primitives through the logger. Stands in for real
/// haptic/LED hardware on a desktop host.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn deliver(&self, step: NotifyStep) {
        match step {
            NotifyStep::VibrateOn => log::info!("notify: vibrate on"),
            NotifyStep::VibrateOff => log::info!("notify: vibrate off"),
            NotifyStep::Blink(LedColor::Red) => log::info!("notify: blink red"),
            NotifyStep::Blink(LedColor::Green) => log::info!("notify: blink green"),
            NotifyStep::Delay(_) => {}
        }
    }
}

/// Deliver an ordered sequence, checking the exit flag before every stage.
///
/// `Delay` stages sleep in slices so cancellation latency stays bounded even
/// in the middle of the longest sequence. Once exit has been requested no
/// further stage runs.
pub fn deliver_sequence(sink: &dyn NotificationSink, steps: &[NotifyStep], flags: &ShutdownFlags) {
    for step in steps {
        if flags.exit_requested() {
            return;
        }
        match step {
            NotifyStep::Delay(total) => {
                let mut remaining = *total;
                while !remaining.is_zero() {
                    if flags.exit_requested() {
                        return;
                    }
                    let slice = remaining.min(DELAY_SLICE);
                    std::thread::sleep(slice);
                    remaining -= slice;
                }
            }
            other => sink.deliver(*other),
        }
    }
}
