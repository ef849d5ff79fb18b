use crate::db::{
    driver::{Driver, DriverError, Transaction, TransactionMode},
    response::RawRow,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

///
/// MockState
///
/// Everything the mock driver observed, plus its scripted responses.
/// Responses are matched by substring: one-shot responses first (FIFO),
/// then persistent ones in registration order.
///

#[derive(Debug, Default)]
pub struct MockState {
    pub queries: Vec<String>,
    pub opened: Vec<TransactionMode>,
    pub commits: usize,
    pub rollbacks: usize,
    pub closes: usize,
    once: VecDeque<(String, Vec<RawRow>)>,
    persistent: Vec<(String, Vec<RawRow>)>,
    fail_on: Vec<String>,
}

///
/// MockDriver
///

#[derive(Clone, Debug, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Answer every query containing `needle` with `rows`.
    pub fn respond(&self, needle: &str, rows: Vec<RawRow>) {
        self.state().persistent.push((needle.to_string(), rows));
    }

    /// Answer the next query containing `needle` with `rows`.
    pub fn respond_once(&self, needle: &str, rows: Vec<RawRow>) {
        self.state().once.push_back((needle.to_string(), rows));
    }

    /// Fail every query containing `needle` with a syntax error.
    pub fn fail_on(&self, needle: &str) {
        self.state().fail_on.push(needle.to_string());
    }

    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.state().queries.clone()
    }

    #[must_use]
    pub fn opened(&self) -> Vec<TransactionMode> {
        self.state().opened.clone()
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.state().commits
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }

    #[must_use]
    pub fn closes(&self) -> usize {
        self.state().closes
    }
}

impl Driver for MockDriver {
    fn open(&self, mode: TransactionMode) -> Result<Box<dyn Transaction>, DriverError> {
        self.state().opened.push(mode);

        Ok(Box::new(MockTransaction {
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

///
/// MockTransaction
///

struct MockTransaction {
    state: Arc<Mutex<MockState>>,
    closed: bool,
}

impl Transaction for MockTransaction {
    fn query(&mut self, query: &str) -> Result<Vec<RawRow>, DriverError> {
        if self.closed {
            return Err(DriverError::Closed);
        }

        let mut state = self.state.lock().expect("mock state poisoned");
        state.queries.push(query.to_string());

        if state.fail_on.iter().any(|needle| query.contains(needle.as_str())) {
            return Err(DriverError::Syntax(format!("rejected: {query}")));
        }

        if let Some(pos) = state.once.iter().position(|(needle, _)| query.contains(needle.as_str())) {
            let (_, rows) = state.once.remove(pos).expect("position is in range");
            return Ok(rows);
        }

        Ok(state
            .persistent
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        self.state.lock().expect("mock state poisoned").commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.state.lock().expect("mock state poisoned").rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.state.lock().expect("mock state poisoned").closes += 1;
        }
    }
}
