use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::monitor::MonitorCommand;

/// Map a key press to a monitor command.
///
/// Enter/`o` toggle monitoring, Esc/`b` hide the UI (monitoring continues in
/// the background), `q` or Ctrl-C exits fully.
pub fn map_key(key: KeyEvent) -> Option<MonitorCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(MonitorCommand::ExitRequest);
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char('o') => Some(MonitorCommand::ToggleMonitoring),
        KeyCode::Esc | KeyCode::Char('b') => Some(MonitorCommand::HideRequest),
        KeyCode::Char('q') => Some(MonitorCommand::ExitRequest),
        _ => None,
    }
}
