//! Monitor core: shared state, alert policy, polling worker and lifecycle.
//!
//! This is the concurrent heart of the application. One lock guards all
//! mutable state; the worker, the asynchronous status push and the UI
//! command handler coordinate through it, and the lifecycle controller
//! sequences startup and teardown.

pub mod alerts;
pub mod lifecycle;
pub mod state;
pub mod status;
pub mod worker;

pub use alerts::{evaluate_transition, sequence_for, AlertEvent, AlertKind, RSSI_THRESHOLD_DBM};
pub use lifecycle::{
    LifecycleController, LoopOutcome, LoopSignal, MonitorCommand, MonitorContext, RunSettings,
    UiSurface, COMMAND_QUEUE_CAPACITY,
};
pub use state::{
    AppLifecycleState, ConnectionState, MonitorState, SharedState, SignalSample, StateSnapshot,
    ADVERTISING_RSSI, NO_SIGNAL_RSSI,
};
pub use status::{detach_status_handler, install_status_handler, PUSH_LOCK_TIMEOUT};
pub use worker::{WorkerDeps, DEFAULT_POLL_INTERVAL};
