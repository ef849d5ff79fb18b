use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{LazyLock, Mutex, PoisonError},
};

///
/// EventState
/// Process-wide, in-memory counters for engine operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Entry points
    pub load_calls: u64,
    pub count_calls: u64,
    pub aggregate_calls: u64,
    pub insert_calls: u64,
    pub update_calls: u64,
    pub put_calls: u64,
    pub delete_calls: u64,

    // Rows
    pub rows_loaded: u64,
    pub rows_written: u64,

    // Statements
    pub read_statements: u64,
    pub write_statements: u64,
    pub commits: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeCounters {
    pub calls: u64,
    pub rows_loaded: u64,
    pub rows_written: u64,
    pub statements: u64,
    pub commits: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

pub type EventReport = EventState;

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    let state = EVENT_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    f(&state)
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    let mut state = EVENT_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut state)
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

#[must_use]
pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}
