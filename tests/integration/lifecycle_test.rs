use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use btleash::core::store::FileStore;
use btleash::core::{EventLog, MemStore};
use btleash::monitor::{
    worker, AppLifecycleState, ConnectionState, LifecycleController, LoopSignal, MonitorCommand,
    MonitorContext, RunSettings, SharedState, RSSI_THRESHOLD_DBM,
};
use btleash::radio::NotificationSink;

use super::support::{wait_for, FakeRadio, RecordingSink, ScriptedSignal};

/// A full headless session: startup, background monitoring, exit on the
/// cancellation signal, complete teardown.
#[test]
fn headless_session_runs_and_tears_down() {
    let store = Arc::new(MemStore::new());
    let radio = Arc::new(FakeRadio::new());
    let sink = Arc::new(RecordingSink::new());
    let state = Arc::new(SharedState::new(true, AppLifecycleState::Hidden));
    let event_log = Arc::new(EventLog::new(
        store.clone(),
        PathBuf::from("/data/leash.log"),
    ));

    let ctx = MonitorContext {
        radio: radio.clone(),
        signal: Arc::new(ScriptedSignal::new([-50])),
        sink: sink.clone(),
        store: store.clone(),
        event_log,
        config_path: PathBuf::from("/cfg/config.json"),
        instance_path: PathBuf::from("/data/leash.instance"),
        settings: RunSettings {
            poll_interval: Duration::from_millis(50),
            threshold_dbm: RSSI_THRESHOLD_DBM,
            headless: true,
        },
        state: state.clone(),
    };

    // Stand-in for Ctrl-C: request exit once the worker demonstrably ran
    // at least one poll (the log file exists after the first tick).
    let exit_trigger = {
        let state = state.clone();
        let store = store.clone();
        std::thread::spawn(move || {
            assert!(wait_for(Duration::from_secs(2), || {
                store.exists(Path::new("/data/leash.log"))
            }));
            state.flags().request_exit();
        })
    };

    LifecycleController::new(ctx).run(None).unwrap();
    exit_trigger.join().unwrap();

    // Teardown completed: terminal lifecycle state, callbacks detached,
    // instance marker removed.
    assert_eq!(state.snapshot().lifecycle, AppLifecycleState::Terminated);
    assert!(!radio.handler_installed());
    assert!(!store.exists(Path::new("/data/leash.instance")));

    // The worker monitored while the session was alive.
    let log = EventLog::new(store.clone(), PathBuf::from("/data/leash.log"));
    assert!(!log.read_all().unwrap().is_empty());
}

/// Accepting an exit command stops alert delivery at once, before the UI
/// producer threads are detached: the worker may not start a new sequence in
/// that window.
#[test]
fn exit_request_halts_alert_delivery_immediately() {
    let store = Arc::new(MemStore::new());
    let radio = Arc::new(FakeRadio::new());
    let sink = Arc::new(RecordingSink::new());
    let state = Arc::new(SharedState::new(true, AppLifecycleState::Foreground));
    state.mutate(|m| m.connection = ConnectionState::Connected);

    let ctx = MonitorContext {
        radio: radio.clone(),
        signal: Arc::new(ScriptedSignal::new([-80])),
        sink: sink.clone(),
        store: store.clone(),
        event_log: Arc::new(EventLog::new(
            store.clone(),
            PathBuf::from("/data/leash.log"),
        )),
        config_path: PathBuf::from("/cfg/config.json"),
        instance_path: PathBuf::from("/data/leash.instance"),
        settings: RunSettings {
            poll_interval: Duration::from_millis(50),
            threshold_dbm: RSSI_THRESHOLD_DBM,
            headless: false,
        },
        state: state.clone(),
    };
    let ctrl = LifecycleController::new(ctx);

    // The worker keeps re-firing the weak-signal alert every poll while the
    // link stays Connected at -80 dBm.
    let sink_dyn: Arc<dyn NotificationSink> = sink.clone();
    let handle = worker::spawn(worker::WorkerDeps {
        state: Arc::downgrade(&state),
        sink: Arc::downgrade(&sink_dyn),
        radio: radio.clone(),
        signal: Arc::new(ScriptedSignal::new([-80])),
        event_log: Arc::new(EventLog::new(
            store.clone(),
            PathBuf::from("/data/leash.log"),
        )),
        poll_interval: Duration::from_millis(50),
        threshold_dbm: RSSI_THRESHOLD_DBM,
    })
    .unwrap();

    assert!(wait_for(Duration::from_secs(2), || sink.count() > 0));

    // Accepting the exit command flags the shutdown at once.
    assert_eq!(ctrl.apply(MonitorCommand::ExitRequest), LoopSignal::Exit);
    assert!(state.flags().exit_requested());

    // The worker stops and the in-flight sequence is cancelled; nothing more
    // reaches the sink during a detach-sized window.
    handle.join().unwrap();
    let delivered = sink.count();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(sink.count(), delivered);
}

/// The instance marker is written at startup and is advisory only: a marker
/// left behind by a previous run never blocks a new session.
#[test]
fn stale_instance_marker_does_not_block_startup() {
    let store = Arc::new(MemStore::new());
    let marker = Path::new("/data/leash.instance");
    store.write(marker, b"12345").unwrap();

    let radio = Arc::new(FakeRadio::new());
    let state = Arc::new(SharedState::new(false, AppLifecycleState::Hidden));
    let ctx = MonitorContext {
        radio: radio.clone(),
        signal: Arc::new(ScriptedSignal::new([-50])),
        sink: Arc::new(RecordingSink::new()),
        store: store.clone(),
        event_log: Arc::new(EventLog::new(
            store.clone(),
            PathBuf::from("/data/leash.log"),
        )),
        config_path: PathBuf::from("/cfg/config.json"),
        instance_path: marker.to_path_buf(),
        settings: RunSettings {
            poll_interval: Duration::from_millis(50),
            threshold_dbm: RSSI_THRESHOLD_DBM,
            headless: true,
        },
        state: state.clone(),
    };

    let exit_trigger = {
        let state = state.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            state.flags().request_exit();
        })
    };

    // Startup succeeds despite the marker.
    LifecycleController::new(ctx).run(None).unwrap();
    exit_trigger.join().unwrap();

    assert_eq!(state.snapshot().lifecycle, AppLifecycleState::Terminated);
    assert!(!store.exists(marker));
}
