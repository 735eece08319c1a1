use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::monitor::{AppLifecycleState, ConnectionState, StateSnapshot, NO_SIGNAL_RSSI};

use super::widgets::{rssi_color, signal_bars, signal_gauge, status_color};

/// Render one frame from an immutable state snapshot.
pub fn render_ui(frame: &mut Frame, snapshot: &StateSnapshot) {
    let area = frame.area();

    // During teardown the only honest thing to show is that we're leaving.
    if matches!(
        snapshot.lifecycle,
        AppLifecycleState::Exiting | AppLifecycleState::Terminated
    ) {
        let msg = Paragraph::new("Shutting down...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" BLE Leash "));
        frame.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(1), // status
            Constraint::Length(1), // rssi text
            Constraint::Length(1), // rssi gauge
            Constraint::Length(2), // monitoring flag
            Constraint::Min(0),    // spacer
            Constraint::Length(1), // footer
        ])
        .split(area);

    let header = Paragraph::new("BLE Leash")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(format!("Status: {}", snapshot.connection))
        .style(Style::default().fg(status_color(snapshot.connection)));
    frame.render_widget(status, chunks[1]);

    let rssi = snapshot.last_sample.rssi;
    if snapshot.connection == ConnectionState::Connected || rssi > NO_SIGNAL_RSSI {
        let bars = signal_bars(rssi);
        let meter: String = (0..5).map(|i| if i < bars { '▮' } else { '▯' }).collect();
        let signal = Paragraph::new(format!("Signal: {} dBm  {}", rssi, meter))
            .style(Style::default().fg(rssi_color(rssi)));
        frame.render_widget(signal, chunks[2]);
        frame.render_widget(signal_gauge(rssi, ""), chunks[3]);
    } else {
        let signal = Paragraph::new("Signal: --").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(signal, chunks[2]);
    }

    let (label, color) = if snapshot.enabled {
        ("Monitoring ON", Color::Cyan)
    } else {
        ("Monitoring OFF", Color::DarkGray)
    };
    let monitoring = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    frame.render_widget(monitoring, chunks[4]);

    let footer = Paragraph::new("Enter: Toggle | Esc: Hide | Q: Quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[6]);
}
