//! Query compilation, mutation batching, and execution against a driver.

pub mod cancel;
pub mod driver;
pub mod filter;
pub mod manager;
pub mod mutation;
pub mod query;
pub mod response;
pub mod session;
pub mod strategy;
pub mod tx;

// re-exports
pub use cancel::CancelToken;
pub use driver::{Driver, DriverError, Transaction, TransactionMode};
pub use filter::{Filter, attr};
pub use manager::Manager;
pub use mutation::{BatchItem, DeleteOptions, UpdateScript, UpdateSet};
pub use query::{
    AggregateFn, AggregateSpec, FunctionQuery, GroupByQuery, OrderDirection, Query, QuerySpec,
    RowCount,
};
pub use response::{Cell, RawRow, Row};
pub use session::DbSession;
pub use strategy::ModelStrategy;
pub use tx::TxContext;
