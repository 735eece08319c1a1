//! Lifecycle state machine and teardown sequencing.
//!
//! The controller owns every resource for its whole lifetime: the shared
//! state, the worker, the UI surface and the external service handles. All
//! shutdown paths funnel through one teardown sequence whose ordering is the
//! point — callbacks are detached before flags are set, flags before the
//! worker join, the worker join before any resource is released, and the
//! state lock is released last of all.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::alerts::{SEQ_MONITOR_OFF, SEQ_MONITOR_ON};
use super::state::{AppLifecycleState, SharedState, StateSnapshot};
use super::{status, worker};
use crate::core::config::MonitorConfig;
use crate::core::event_log::EventLog;
use crate::core::instance;
use crate::core::store::FileStore;
use crate::error::Result;
use crate::radio::notify::{deliver_sequence, NotificationSink};
use crate::radio::{ConnectionStatusSource, SignalSource};

/// Bounded command queue capacity; producers drop on overflow.
pub const COMMAND_QUEUE_CAPACITY: usize = 8;

/// Grace period for in-flight callbacks to observe the shutdown flags.
pub const TEARDOWN_GRACE: Duration = Duration::from_millis(150);

const HIDDEN_POLL: Duration = Duration::from_millis(100);

/// Commands consumed by the main event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Flip the persisted monitoring flag.
    ToggleMonitoring,
    /// Dismiss the UI, keep monitoring in the background.
    HideRequest,
    /// Full shutdown.
    ExitRequest,
    /// Redraw token from the periodic timer; touches no shared state.
    Tick,
    /// Unexpected command-queue error; treated identically to ExitRequest.
    QueueFault,
}

/// What the event loop should do after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Redraw,
    Hide,
    Exit,
}

/// How a foreground session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Hide,
    Exit,
}

/// The foreground surface as the controller sees it. Implemented by the TUI;
/// the controller only cares about the detach-before-release contract.
pub trait UiSurface {
    /// Run the event loop until a hide or exit is requested.
    fn run_loop(&mut self, ctrl: &LifecycleController) -> LoopOutcome;
    /// Stop the input and redraw-timer threads. After this returns no UI
    /// callback produces commands anymore.
    fn detach(&mut self);
    /// Best-effort final "shutting down" frame.
    fn show_shutdown(&mut self, snapshot: &StateSnapshot);
    /// Restore the terminal and drop the command queue.
    fn release(self: Box<Self>);
}

/// Runtime settings for a monitoring session.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub poll_interval: Duration,
    pub threshold_dbm: i8,
    pub headless: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            poll_interval: worker::DEFAULT_POLL_INTERVAL,
            threshold_dbm: super::alerts::RSSI_THRESHOLD_DBM,
            headless: false,
        }
    }
}

/// Explicitly owned context, constructed once and passed by reference to
/// every component. No singletons.
///
/// Field order matters: `state` is declared last so the lock inside it is
/// dropped after every service handle.
pub struct MonitorContext {
    pub radio: Arc<dyn ConnectionStatusSource>,
    pub signal: Arc<dyn SignalSource>,
    pub sink: Arc<dyn NotificationSink>,
    pub store: Arc<dyn FileStore>,
    pub event_log: Arc<EventLog>,
    pub config_path: PathBuf,
    pub instance_path: PathBuf,
    pub settings: RunSettings,
    pub state: Arc<SharedState>,
}

pub struct LifecycleController {
    ctx: MonitorContext,
}

impl LifecycleController {
    pub fn new(ctx: MonitorContext) -> Self {
        Self { ctx }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.ctx.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.ctx.state.snapshot()
    }

    /// Apply one command from the queue.
    pub fn apply(&self, command: MonitorCommand) -> LoopSignal {
        match command {
            MonitorCommand::Tick => LoopSignal::Redraw,
            MonitorCommand::HideRequest => LoopSignal::Hide,
            MonitorCommand::ExitRequest => {
                // Flag first: no new alert sequence may begin while the UI
                // threads are still being detached.
                self.ctx.state.flags().request_exit();
                LoopSignal::Exit
            }
            MonitorCommand::QueueFault => {
                log::warn!("Command queue fault, shutting down");
                self.ctx.state.flags().request_exit();
                LoopSignal::Exit
            }
            MonitorCommand::ToggleMonitoring => {
                let enabled = self.ctx.state.mutate(|m| {
                    m.enabled = !m.enabled;
                    m.enabled
                });
                log::info!("Monitoring {}", if enabled { "enabled" } else { "disabled" });

                // Persistence degrades gracefully, never fatal.
                let config = MonitorConfig { enabled };
                if let Err(e) = config.save_to(self.ctx.store.as_ref(), &self.ctx.config_path) {
                    log::warn!("Failed to persist config: {}", e);
                }

                let sequence = if enabled { SEQ_MONITOR_ON } else { SEQ_MONITOR_OFF };
                deliver_sequence(self.ctx.sink.as_ref(), sequence, self.ctx.state.flags());
                LoopSignal::Continue
            }
        }
    }

    /// Run a full monitoring session: startup, the foreground or hidden
    /// phase, and the complete teardown. Consumes the controller; the
    /// context (and with it the state lock) drops on return.
    pub fn run(self, ui: Option<Box<dyn UiSurface>>) -> Result<()> {
        let ctx = &self.ctx;

        instance::check_prior_instance(ctx.store.as_ref(), &ctx.instance_path);
        instance::create_marker(ctx.store.as_ref(), &ctx.instance_path);

        status::install_status_handler(ctx.radio.as_ref(), &ctx.state);

        log::info!("Initializing radio");
        if ctx.radio.start_advertising() {
            ctx.state
                .mutate(|m| m.connection = super::state::ConnectionState::Advertising);
        } else {
            log::warn!("Radio incapable, starting unavailable");
            ctx.state
                .mutate(|m| m.connection = super::state::ConnectionState::Unavailable);
        }

        // Ctrl-C requests a full exit; in the raw-mode foreground the same
        // request arrives as a key event instead. The handler holds only a
        // weak reference so it cannot keep the state alive.
        {
            let weak = Arc::downgrade(&ctx.state);
            if let Err(e) = ctrlc::set_handler(move || {
                if let Some(state) = weak.upgrade() {
                    state.flags().request_exit();
                }
            }) {
                log::debug!("Ctrl-C handler not installed: {}", e);
            }
        }

        let worker_handle = match worker::spawn(worker::WorkerDeps {
            state: Arc::downgrade(&ctx.state),
            sink: Arc::downgrade(&ctx.sink),
            radio: ctx.radio.clone(),
            signal: ctx.signal.clone(),
            event_log: ctx.event_log.clone(),
            poll_interval: ctx.settings.poll_interval,
            threshold_dbm: ctx.settings.threshold_dbm,
        }) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Failed to spawn worker thread: {}", e);
                status::detach_status_handler(ctx.radio.as_ref());
                if let Some(mut surface) = ui {
                    surface.detach();
                    surface.release();
                }
                instance::remove_marker(ctx.store.as_ref(), &ctx.instance_path);
                return Err(e.into());
            }
        };

        let ui_for_teardown = match ui {
            Some(mut surface) => {
                self.ctx
                    .state
                    .mutate(|m| m.lifecycle = AppLifecycleState::Foreground);

                let outcome = surface.run_loop(&self);

                // Teardown steps 1-2 for the UI: no command producer is left
                // running after this point.
                surface.detach();

                match outcome {
                    LoopOutcome::Hide => {
                        // Hide releases only UI resources; worker, services
                        // and the lock all stay live.
                        self.ctx.state.flags().set_processing(true);
                        surface.release();
                        self.ctx.state.flags().set_processing(false);

                        self.ctx
                            .state
                            .mutate(|m| m.lifecycle = AppLifecycleState::Hidden);
                        log::info!("UI hidden, monitoring continues in background");
                        self.run_hidden();
                        None
                    }
                    LoopOutcome::Exit => Some(surface),
                }
            }
            None => {
                self.ctx
                    .state
                    .mutate(|m| m.lifecycle = AppLifecycleState::Hidden);
                log::info!("Running headless (Ctrl-C to exit)");
                self.run_hidden();
                None
            }
        };

        self.teardown(worker_handle, ui_for_teardown);
        Ok(())
    }

    /// Hidden phase: nothing to do but wait for the exit request.
    fn run_hidden(&self) {
        while !self.ctx.state.flags().exit_requested() {
            std::thread::sleep(HIDDEN_POLL);
        }
    }

    /// Full-exit teardown. Ordering is mandatory; a stale callback touching
    /// freed state is the failure mode being prevented.
    fn teardown(&self, worker_handle: JoinHandle<()>, ui: Option<Box<dyn UiSurface>>) {
        let ctx = &self.ctx;
        log::info!("Starting teardown");

        // 1. Detach external callback registrations. Input and redraw-timer
        //    threads were already stopped by the UI detach.
        status::detach_status_handler(ctx.radio.as_ref());

        // 2. (redraw timer stopped with the UI detach)

        // 3. Set the exit and processing flags under the lock.
        let snapshot = ctx.state.mutate(|m| {
            m.lifecycle = AppLifecycleState::Exiting;
            ctx.state.flags().request_exit();
            ctx.state.flags().set_processing(true);
            *m
        });

        let mut ui = ui;
        if let Some(surface) = ui.as_mut() {
            surface.show_shutdown(&snapshot);
        }

        // 4. Bounded grace period for in-flight callbacks.
        std::thread::sleep(TEARDOWN_GRACE);

        // 5. Join the polling worker.
        if worker_handle.join().is_err() {
            log::error!("Worker thread panicked during shutdown");
        }

        // 6. Release UI-facing resources.
        if let Some(surface) = ui {
            surface.release();
        }

        // 7. Release remaining services.
        instance::remove_marker(ctx.store.as_ref(), &ctx.instance_path);

        // 8. The lock drops last, with the context itself.
        ctx.state
            .mutate(|m| m.lifecycle = AppLifecycleState::Terminated);
        log::info!("Teardown complete");
    }
}
