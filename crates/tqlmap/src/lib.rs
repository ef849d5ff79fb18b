//! ## Crate layout
//! - `core`: model descriptors, filter compiler, entity/relation strategies,
//!   query builder, mutation batcher, result normalization, and metrics.
//!
//! Applications implement `Model` for their types, register the descriptors
//! in a `ModelRegistry`, and drive everything through a `DbSession` built
//! over their own `Driver`. The `prelude` module carries that surface.

pub use tqlmap_core as core;

/// re-exports
///
/// hand-written `Model` impls need these, stops the user having to list
/// them in their own Cargo.toml
pub mod __reexports {
    pub use chrono;
    pub use serde;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::error::InternalError as Error;

///
/// Prelude
/// everything an application needs to describe, register, and query models
///

pub mod prelude {
    pub use crate::core::{
        config::SessionConfig,
        db::{
            AggregateFn, AggregateSpec, CancelToken, DbSession, DeleteOptions, Driver,
            DriverError, Filter, Manager, RawRow, Row, RowCount, Transaction, TransactionMode,
            TxContext, UpdateSet, attr,
        },
        error::{ErrorClass, InternalError},
        model::{AttributeModel, ModelRegistry, RoleModel, TypeModel, ValueKind},
        traits::{Model, ModelValue},
        value::Value,
    };
    pub use serde::{Deserialize, Serialize};
}
