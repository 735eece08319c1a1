use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use btleash::monitor::{
    detach_status_handler, install_status_handler, AppLifecycleState, ConnectionState, SharedState,
};

use super::support::FakeRadio;

/// Pushes arrive from many radio-stack threads while another thread hogs the
/// state lock. Every push must return within its bounded lock wait; a
/// dropped update is acceptable, a stuck radio thread is not.
#[test]
fn contended_pushes_never_block_indefinitely() {
    let radio = Arc::new(FakeRadio::new());
    let state = Arc::new(SharedState::new(true, AppLifecycleState::Hidden));
    install_status_handler(radio.as_ref(), &state);

    let hog_done = Arc::new(AtomicBool::new(false));
    let hog = {
        let state = state.clone();
        let hog_done = hog_done.clone();
        thread::spawn(move || {
            for _ in 0..8 {
                state.mutate(|_| thread::sleep(Duration::from_millis(30)));
                thread::sleep(Duration::from_millis(5));
            }
            hog_done.store(true, Ordering::SeqCst);
        })
    };

    let started = Instant::now();
    let pushers: Vec<_> = (0..8)
        .map(|i| {
            let radio = radio.clone();
            thread::spawn(move || {
                for n in 0..30 {
                    let status = if (i + n) % 2 == 0 {
                        ConnectionState::Connected
                    } else {
                        ConnectionState::Advertising
                    };
                    radio.push(status);
                }
            })
        })
        .collect();

    for pusher in pushers {
        pusher.join().unwrap();
    }
    hog.join().unwrap();

    // Worst case every push waits out its full lock timeout; anything beyond
    // that bound means a push blocked on the lock without a timeout.
    assert!(started.elapsed() < Duration::from_secs(20));
    assert!(hog_done.load(Ordering::SeqCst));

    // The state holds whichever push landed last, never a torn value.
    let snapshot = state.snapshot();
    assert!(matches!(
        snapshot.connection,
        ConnectionState::Connected | ConnectionState::Advertising
    ));
    assert_eq!(
        snapshot.was_connected,
        snapshot.connection == ConnectionState::Connected
    );

    detach_status_handler(radio.as_ref());
}

/// Once exit is requested, pushes are rejected before touching the lock.
#[test]
fn pushes_are_rejected_during_shutdown() {
    let radio = Arc::new(FakeRadio::new());
    let state = Arc::new(SharedState::new(true, AppLifecycleState::Hidden));
    install_status_handler(radio.as_ref(), &state);

    radio.push(ConnectionState::Connected);
    assert_eq!(state.snapshot().connection, ConnectionState::Connected);

    state.flags().request_exit();
    radio.push(ConnectionState::Off);
    assert_eq!(state.snapshot().connection, ConnectionState::Connected);
}

/// A detached handler stops mutating state even if the radio keeps pushing.
#[test]
fn detached_handler_ignores_pushes() {
    let radio = Arc::new(FakeRadio::new());
    let state = Arc::new(SharedState::new(true, AppLifecycleState::Hidden));
    install_status_handler(radio.as_ref(), &state);
    assert!(radio.handler_installed());

    detach_status_handler(radio.as_ref());
    assert!(!radio.handler_installed());

    radio.push(ConnectionState::Connected);
    assert_eq!(state.snapshot().connection, ConnectionState::Off);
}

/// The handler holds only a weak reference to the shared state, so pushes
/// after the state is gone are inert rather than undefined.
#[test]
fn push_after_state_drop_is_inert() {
    let radio = Arc::new(FakeRadio::new());
    let state = Arc::new(SharedState::new(true, AppLifecycleState::Hidden));
    install_status_handler(radio.as_ref(), &state);

    drop(state);
    radio.push(ConnectionState::Connected);
}
