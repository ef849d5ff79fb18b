//! Read, count, delete, aggregate, and group-by queries.
//!
//! `QuerySpec` is the pure intent (filters, sort keys, pagination) and owns
//! every text compiler; `Query` binds an intent to a `Manager` and runs it.

mod aggregate;
mod fluent;
mod function;
mod intent;


// re-exports
pub use aggregate::{AggregateFn, AggregateSpec, GroupByQuery};
pub use fluent::Query;
pub use function::FunctionQuery;
pub use intent::QuerySpec;

///
/// RowCount
///
/// Rows affected by a statement. Match-delete and bulk update statements do
/// not report a count, so they return `Unknown` rather than a made-up number.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowCount {
    Known(u64),
    Unknown,
}

impl RowCount {
    #[must_use]
    pub const fn known(self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

///
/// OrderSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderSpec {
    pub attr: String,
    pub direction: OrderDirection,
}
