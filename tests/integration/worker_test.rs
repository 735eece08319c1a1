use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use btleash::core::{EventLog, MemStore};
use btleash::monitor::{
    install_status_handler, worker, AppLifecycleState, ConnectionState, SharedState,
    RSSI_THRESHOLD_DBM,
};
use btleash::radio::LedColor;

use super::support::{wait_for, FakeRadio, RecordingSink, ScriptedSignal};

struct Harness {
    state: Arc<SharedState>,
    radio: Arc<FakeRadio>,
    signal: Arc<ScriptedSignal>,
    sink: Arc<RecordingSink>,
    store: Arc<MemStore>,
}

fn harness(enabled: bool, script: Vec<i8>) -> Harness {
    Harness {
        state: Arc::new(SharedState::new(enabled, AppLifecycleState::Hidden)),
        radio: Arc::new(FakeRadio::new()),
        signal: Arc::new(ScriptedSignal::new(script)),
        sink: Arc::new(RecordingSink::new()),
        store: Arc::new(MemStore::new()),
    }
}

fn spawn_worker(h: &Harness, poll: Duration) -> std::thread::JoinHandle<()> {
    let event_log = Arc::new(EventLog::new(
        h.store.clone(),
        PathBuf::from("/data/leash.log"),
    ));
    let sink: Arc<dyn btleash::radio::NotificationSink> = h.sink.clone();
    worker::spawn(worker::WorkerDeps {
        state: Arc::downgrade(&h.state),
        sink: Arc::downgrade(&sink),
        radio: h.radio.clone(),
        signal: h.signal.clone(),
        event_log,
        poll_interval: poll,
        threshold_dbm: RSSI_THRESHOLD_DBM,
    })
    .expect("spawn worker")
}

/// Reference scenario end to end: Off -> Advertising -> Connected(-50) ->
/// Connected(-80) -> Connected(-50) -> Off, driven through a live worker
/// with pushes arriving like radio-stack callbacks.
#[test]
fn scenario_drives_alerts_and_recovery() {
    let h = harness(true, vec![-50, -80, -50]);
    install_status_handler(h.radio.as_ref(), &h.state);
    let handle = spawn_worker(&h, Duration::from_millis(50));

    // First tick observes Off and restarts advertising.
    assert!(wait_for(Duration::from_secs(2), || h.radio.adv_attempts() >= 1));
    assert!(wait_for(Duration::from_secs(2), || {
        h.state.snapshot().connection == ConnectionState::Advertising
    }));

    // The bonded peer connects; three scripted RSSI readings follow.
    h.radio.push(ConnectionState::Connected);
    assert!(wait_for(Duration::from_secs(5), || h.signal.remaining() == 0));
    assert!(wait_for(Duration::from_secs(2), || {
        h.sink.blinks(LedColor::Red) >= 1
    }));

    // The peer walks away.
    h.radio.push(ConnectionState::Off);
    assert!(wait_for(Duration::from_secs(5), || {
        h.sink.vibrate_on_count() >= 3
    }));

    h.state.flags().request_exit();
    handle.join().unwrap();

    // One connected alert, one weak-signal alert, one disconnect alert
    // (the disconnect sequence vibrates twice, the weak sequence once).
    assert_eq!(h.sink.blinks(LedColor::Green), 1);
    assert_eq!(h.sink.blinks(LedColor::Red), 1);
    assert_eq!(h.sink.vibrate_on_count(), 3);

    // Off recovery at startup plus the restart after the disconnect.
    assert!(h.radio.adv_attempts() >= 2);

    // Every enabled tick appended a log line.
    let log = EventLog::new(h.store.clone(), PathBuf::from("/data/leash.log"));
    let text = log.read_all().unwrap();
    assert!(text.lines().count() >= 5);
    assert!(text.contains("BT=Connected RSSI=-80"));
}

/// After an exit request the worker terminates within one poll granularity,
/// even mid-sleep of a long poll interval.
#[test]
fn exit_is_observed_within_poll_granularity() {
    let h = harness(true, vec![-50]);
    let handle = spawn_worker(&h, Duration::from_millis(1000));

    // Let the worker get into its sleep.
    std::thread::sleep(Duration::from_millis(150));

    let started = Instant::now();
    h.state.flags().request_exit();
    handle.join().unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "worker took {:?} to observe exit",
        started.elapsed()
    );
}

/// Once teardown has begun no notification is delivered and no push is
/// applied anymore.
#[test]
fn nothing_fires_after_teardown_begins() {
    let h = harness(true, vec![-50]);
    install_status_handler(h.radio.as_ref(), &h.state);
    let handle = spawn_worker(&h, Duration::from_millis(50));

    assert!(wait_for(Duration::from_secs(2), || h.radio.adv_attempts() >= 1));

    h.state.flags().request_exit();
    h.state.flags().set_processing(true);
    handle.join().unwrap();
    btleash::monitor::detach_status_handler(h.radio.as_ref());
    assert!(!h.radio.handler_installed());

    let connection = h.state.snapshot().connection;
    let delivered = h.sink.count();

    // Pushes after detach are no-ops; the sink stays quiet.
    h.radio.push(ConnectionState::Connected);
    std::thread::sleep(Duration::from_millis(300));

    assert_eq!(h.state.snapshot().connection, connection);
    assert_eq!(h.sink.count(), delivered);
}

/// A disabled monitor ticks without sampling, alerting or logging.
#[test]
fn disabled_monitoring_skips_ticks() {
    let h = harness(false, vec![-50]);
    let handle = spawn_worker(&h, Duration::from_millis(50));

    std::thread::sleep(Duration::from_millis(300));
    h.state.flags().request_exit();
    handle.join().unwrap();

    assert_eq!(h.sink.count(), 0);
    assert_eq!(h.radio.adv_attempts(), 0);
    assert_eq!(h.signal.remaining(), 1);
}
