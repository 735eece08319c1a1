//! Foreground TUI surface.
//!
//! Owns the terminal, the bounded command queue and the two producer
//! threads: an input thread mapping key presses to commands and a redraw
//! timer that only enqueues tick tokens. Producers never block on a full
//! queue; overflow drops the command. The lifecycle controller drives the
//! detach/release ordering through the [`UiSurface`] contract.

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::monitor::{
    LifecycleController, LoopOutcome, LoopSignal, MonitorCommand, StateSnapshot, UiSurface,
    COMMAND_QUEUE_CAPACITY,
};

use super::event_handler::map_key;
use super::render::render_ui;

/// Redraw cadence.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(500);

/// Granularity at which producer threads notice a stop request, and at which
/// the consumer loop re-checks the exit flag.
const QUEUE_POLL: Duration = Duration::from_millis(100);

pub struct ForegroundUi {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    rx: Receiver<MonitorCommand>,
    stop_producers: Arc<AtomicBool>,
    input_thread: Option<JoinHandle<()>>,
    timer_thread: Option<JoinHandle<()>>,
}

impl ForegroundUi {
    /// Set up the terminal, the command queue and both producer threads.
    /// Failures here are fatal for startup.
    pub fn init() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        let (tx, rx) = std::sync::mpsc::sync_channel(COMMAND_QUEUE_CAPACITY);
        let stop_producers = Arc::new(AtomicBool::new(false));

        let input_thread = {
            let tx = tx.clone();
            let stop = stop_producers.clone();
            std::thread::Builder::new()
                .name("leash-input".into())
                .spawn(move || input_loop(tx, stop))
                .context("Failed to spawn input thread")?
        };

        let timer_thread = {
            let stop = stop_producers.clone();
            std::thread::Builder::new()
                .name("leash-redraw".into())
                .spawn(move || timer_loop(tx, stop))
                .context("Failed to spawn redraw timer thread")?
        };

        Ok(Self {
            terminal,
            rx,
            stop_producers,
            input_thread: Some(input_thread),
            timer_thread: Some(timer_thread),
        })
    }

    fn draw(&mut self, snapshot: &StateSnapshot) {
        if let Err(e) = self.terminal.draw(|frame| render_ui(frame, snapshot)) {
            log::warn!("Draw failed: {}", e);
        }
    }
}

impl UiSurface for ForegroundUi {
    fn run_loop(&mut self, ctrl: &LifecycleController) -> LoopOutcome {
        let snapshot = ctrl.snapshot();
        self.draw(&snapshot);

        loop {
            // An exit requested elsewhere (Ctrl-C handler, fault) ends the
            // foreground session too.
            if ctrl.state().flags().exit_requested() {
                return LoopOutcome::Exit;
            }

            match self.rx.recv_timeout(QUEUE_POLL) {
                Ok(command) => match ctrl.apply(command) {
                    LoopSignal::Continue => {
                        let snapshot = ctrl.snapshot();
                        self.draw(&snapshot);
                    }
                    LoopSignal::Redraw => {
                        let snapshot = ctrl.snapshot();
                        self.draw(&snapshot);
                    }
                    LoopSignal::Hide => return LoopOutcome::Hide,
                    LoopSignal::Exit => return LoopOutcome::Exit,
                },
                // Timeout is normal, keep looping.
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    ctrl.apply(MonitorCommand::QueueFault);
                    return LoopOutcome::Exit;
                }
            }
        }
    }

    fn detach(&mut self) {
        self.stop_producers.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.timer_thread.take() {
            let _ = handle.join();
        }
    }

    fn show_shutdown(&mut self, snapshot: &StateSnapshot) {
        self.draw(snapshot);
    }

    fn release(mut self: Box<Self>) {
        if let Err(e) = restore_terminal(&mut self.terminal) {
            log::warn!("Failed to restore terminal: {}", e);
        }
        // Receiver drops with self; producers are already stopped.
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Input producer: key presses become commands, best-effort enqueued.
fn input_loop(tx: SyncSender<MonitorCommand>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::SeqCst) {
        match event::poll(QUEUE_POLL) {
            Ok(false) => continue,
            Ok(true) => {
                let Ok(ev) = event::read() else {
                    let _ = tx.try_send(MonitorCommand::QueueFault);
                    return;
                };
                if let Event::Key(key) = ev {
                    if key.kind == KeyEventKind::Press {
                        if let Some(command) = map_key(key) {
                            // Drop on overflow: input is not loss-sensitive.
                            if let Err(TrySendError::Full(_)) = tx.try_send(command) {
                                log::debug!("Command queue full, dropping {:?}", command);
                            }
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("Input poll failed: {}", e);
                let _ = tx.try_send(MonitorCommand::QueueFault);
                return;
            }
        }
    }
}

/// Redraw timer: enqueues a tick token, touches no shared state.
fn timer_loop(tx: SyncSender<MonitorCommand>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::SeqCst) {
        let mut remaining = REDRAW_INTERVAL;
        while !remaining.is_zero() {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let slice = remaining.min(QUEUE_POLL);
            std::thread::sleep(slice);
            remaining -= slice;
        }
        // A dropped tick just means the next one redraws.
        let _ = tx.try_send(MonitorCommand::Tick);
    }
}
