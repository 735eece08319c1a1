use ratatui::{prelude::*, widgets::Gauge};

use crate::monitor::{ConnectionState, NO_SIGNAL_RSSI, RSSI_THRESHOLD_DBM};

/// Number of filled bars (0..=5) for a signal-strength meter.
pub fn signal_bars(rssi: i8) -> u8 {
    if rssi <= NO_SIGNAL_RSSI {
        return 0;
    }
    (((rssi as i16 + 130) / 10).clamp(0, 5)) as u8
}

/// Gauge showing relative link quality, colored by strength.
pub fn signal_gauge<'a>(rssi: i8, label: &'a str) -> Gauge<'a> {
    let color = rssi_color(rssi);
    // Map [-127, -30] dBm onto 0..=100%.
    let ratio = ((rssi as f64 + 127.0) / 97.0).clamp(0.0, 1.0);

    Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio)
        .label(label)
}

/// Color for an RSSI value: weak below the alert threshold, strong above -55.
pub fn rssi_color(rssi: i8) -> Color {
    match rssi {
        r if r <= NO_SIGNAL_RSSI => Color::DarkGray,
        r if r < RSSI_THRESHOLD_DBM => Color::Red,
        r if r < -55 => Color::LightYellow,
        _ => Color::Cyan,
    }
}

/// Color for a connection status line.
pub fn status_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => Color::Cyan,
        ConnectionState::Advertising => Color::LightYellow,
        ConnectionState::Off | ConnectionState::Unavailable => Color::Red,
    }
}
