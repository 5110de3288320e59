// Assertions over recorded connections

use crate::mock::{ConnectionEvent, RecordingConnectionManager};
use std::collections::HashMap;

/// Assert that every opened connection was closed.
pub fn assert_no_leaked_connections(manager: &RecordingConnectionManager) {
    let live = manager.open_connections();
    assert!(live.is_empty(), "Connections left open: {:?}", live);
}

/// Assert that each opened connection was closed exactly once.
pub fn assert_closed_exactly_once(manager: &RecordingConnectionManager) {
    let mut closes: HashMap<u64, usize> = HashMap::new();
    let mut opened = Vec::new();

    for event in manager.events() {
        match event {
            ConnectionEvent::Opened { id, .. } => opened.push(id),
            ConnectionEvent::Closed { id, .. } => *closes.entry(id).or_default() += 1,
            ConnectionEvent::OpenFailed { .. } => {}
        }
    }

    for id in opened {
        let count = closes.get(&id).copied().unwrap_or(0);
        assert_eq!(count, 1, "Connection {} closed {} times", id, count);
    }
}

/// Assert the exact sequence of databases opened.
pub fn assert_opened(manager: &RecordingConnectionManager, expected: &[&str]) {
    let actual = manager.opened_databases();
    assert_eq!(
        actual, expected,
        "Expected databases {:?} to be opened, got {:?}",
        expected, actual
    );
}
