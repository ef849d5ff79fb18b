pub mod driver;
pub mod fixtures;

use crate::db::{DbSession, response::RawRow};

pub use driver::MockDriver;

/// Build a raw row from a JSON object literal.
#[must_use]
pub fn raw_row(value: serde_json::Value) -> RawRow {
    serde_json::from_value(value).expect("raw row must be a JSON object")
}

/// Session over `driver` with every fixture type registered.
#[must_use]
pub fn session(driver: &MockDriver) -> DbSession {
    DbSession::new(driver.clone(), fixtures::registry())
}
