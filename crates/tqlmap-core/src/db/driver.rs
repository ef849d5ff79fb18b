//! Transaction executor seam.
//!
//! The engine never talks to the network. It compiles query text and hands it
//! to a `Transaction` opened by a `Driver`; retry, pooling, and isolation are
//! the driver's business.

use crate::db::response::RawRow;
use thiserror::Error as ThisError;

///
/// TransactionMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionMode {
    Read,
    Write,
}

impl TransactionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

///
/// DriverError
///

#[derive(Debug, ThisError)]
pub enum DriverError {
    #[error("query syntax error: {0}")]
    Syntax(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("transaction already closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

///
/// Transaction
///
/// One open database transaction. `query` returns raw rows exactly as the
/// server produced them; normalization happens in `db::response`.
///

pub trait Transaction {
    fn query(&mut self, query: &str) -> Result<Vec<RawRow>, DriverError>;

    fn commit(&mut self) -> Result<(), DriverError>;

    fn rollback(&mut self) -> Result<(), DriverError>;

    fn close(&mut self);
}

///
/// Driver
///

pub trait Driver: Send + Sync {
    fn open(&self, mode: TransactionMode) -> Result<Box<dyn Transaction>, DriverError>;
}
