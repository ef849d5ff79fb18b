//! Transaction lifecycle.
//!
//! Operations either open their own transaction (owned: committed once at
//! the end of a write, always closed on drop) or run inside a caller-owned
//! `TxContext`, in which case they never commit or close.

use crate::db::{
    driver::{Driver, DriverError, Transaction, TransactionMode},
    response::RawRow,
};
use std::cell::{Cell, RefCell};

///
/// TxContext
///
/// Caller-owned transaction shared by managers of several types for
/// cross-type atomic workflows. Closing is the caller's job; dropping an
/// unclosed context closes it and logs a warning.
///

pub struct TxContext {
    tx: RefCell<Box<dyn Transaction>>,
    mode: TransactionMode,
    closed: Cell<bool>,
}

impl TxContext {
    pub(crate) fn new(tx: Box<dyn Transaction>, mode: TransactionMode) -> Self {
        Self {
            tx: RefCell::new(tx),
            mode,
            closed: Cell::new(false),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> TransactionMode {
        self.mode
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Run one query inside the bound transaction.
    pub fn query(&self, query: &str) -> Result<Vec<RawRow>, DriverError> {
        if self.closed.get() {
            return Err(DriverError::Closed);
        }
        self.tx.borrow_mut().query(query)
    }

    pub fn commit(&self) -> Result<(), DriverError> {
        if self.closed.get() {
            return Err(DriverError::Closed);
        }
        self.tx.borrow_mut().commit()
    }

    pub fn rollback(&self) -> Result<(), DriverError> {
        if self.closed.get() {
            return Err(DriverError::Closed);
        }
        self.tx.borrow_mut().rollback()
    }

    pub fn close(&self) {
        if !self.closed.replace(true) {
            self.tx.borrow_mut().close();
        }
    }
}

impl Drop for TxContext {
    fn drop(&mut self) {
        if !self.closed.get() {
            tracing::warn!(
                mode = self.mode.as_str(),
                "transaction context dropped without close; closing it"
            );
            self.close();
        }
    }
}

///
/// OwnedTx
///
/// Transaction opened by one operation. Closed on drop whether or not it
/// was committed, so an error path never leaks it.
///

pub(crate) struct OwnedTx {
    tx: Box<dyn Transaction>,
    mode: TransactionMode,
}

impl OwnedTx {
    pub(crate) fn open(driver: &dyn Driver, mode: TransactionMode) -> Result<Self, DriverError> {
        Ok(Self {
            tx: driver.open(mode)?,
            mode,
        })
    }

    pub(crate) fn query(&mut self, query: &str) -> Result<Vec<RawRow>, DriverError> {
        self.tx.query(query)
    }
}

impl Drop for OwnedTx {
    fn drop(&mut self) {
        self.tx.close();
    }
}

///
/// TxHandle
///
/// The transaction one operation runs in.
///

pub(crate) enum TxHandle<'a> {
    Owned(OwnedTx),
    Bound(&'a TxContext),
}

impl TxHandle<'_> {
    pub(crate) fn query(&mut self, query: &str) -> Result<Vec<RawRow>, DriverError> {
        match self {
            Self::Owned(owned) => owned.query(query),
            Self::Bound(ctx) => ctx.query(query),
        }
    }

    pub(crate) const fn mode(&self) -> TransactionMode {
        match self {
            Self::Owned(owned) => owned.mode,
            Self::Bound(ctx) => ctx.mode,
        }
    }

    /// Commit an owned write transaction; a bound one is left to its owner.
    pub(crate) fn finish(self) -> Result<bool, DriverError> {
        match self {
            Self::Owned(mut owned) => {
                owned.tx.commit()?;
                Ok(true)
            }
            Self::Bound(_) => Ok(false),
        }
    }

    #[must_use]
    pub(crate) const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}
