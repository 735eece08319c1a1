// UI module

pub mod monitor_tui;

pub use monitor_tui::ForegroundUi;
