//! Terminal user interface for the leash monitor.
//!
//! Renders immutable state snapshots with ratatui and feeds key presses into
//! the bounded command queue.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{ForegroundUi, REDRAW_INTERVAL};
pub use event_handler::map_key;
pub use render::render_ui;
