use btleash::monitor::{
    evaluate_transition, AlertKind, ConnectionState, SignalSample, RSSI_THRESHOLD_DBM,
};

/// Walk the reference status sequence through the policy and count alerts:
/// [Off, Advertising, Connected(-50), Connected(-80), Connected(-50), Off]
/// must yield one connected alert, one weak-signal alert (at -80 only) and
/// one disconnect alert at the final Off.
#[test]
fn reference_scenario_produces_expected_alerts() {
    let script: [(ConnectionState, i8); 6] = [
        (ConnectionState::Off, -127),
        (ConnectionState::Advertising, -85),
        (ConnectionState::Connected, -50),
        (ConnectionState::Connected, -80),
        (ConnectionState::Connected, -50),
        (ConnectionState::Off, -127),
    ];

    let mut previous = ConnectionState::Off;
    let mut connected = 0;
    let mut disconnected = 0;
    let mut weak = 0;

    for (current, rssi) in script {
        let events = evaluate_transition(
            previous,
            current,
            SignalSample::new(rssi),
            RSSI_THRESHOLD_DBM,
        );
        for event in events {
            match event.kind {
                AlertKind::Connected => connected += 1,
                AlertKind::Disconnected => disconnected += 1,
                AlertKind::WeakSignal => weak += 1,
            }
        }
        previous = current;
    }

    assert_eq!(connected, 1);
    assert_eq!(weak, 1);
    assert_eq!(disconnected, 1);
}

/// Identical repeated states never fire edge alerts, however long the run.
#[test]
fn long_stable_connection_fires_no_edges() {
    let mut previous = ConnectionState::Connected;
    for _ in 0..50 {
        let events = evaluate_transition(
            previous,
            ConnectionState::Connected,
            SignalSample::new(-50),
            RSSI_THRESHOLD_DBM,
        );
        assert!(events.is_empty());
        previous = ConnectionState::Connected;
    }
}
