//! Core of tqlmap: model descriptors, the filter compiler, entity/relation
//! query strategies, the query builder, the mutation batcher, and result
//! normalization for TypeDB-backed models.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary for application code: descriptors, traits, filters,
/// and the session entry points.
///

pub mod prelude {
    pub use crate::{
        db::{
            AggregateSpec, CancelToken, DbSession, DeleteOptions, Filter, Row, RowCount,
            TransactionMode, UpdateSet, attr,
        },
        model::{AttributeModel, ModelRegistry, RoleModel, TypeModel, ValueKind},
        traits::{Model, ModelValue},
        value::Value,
    };
}
