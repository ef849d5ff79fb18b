//! Result normalization.
//!
//! Raw rows arrive from the driver with values either bare or wrapped in
//! metadata cells. This module unwraps them into flat `Row`s for the
//! hydrator and extracts instance ids.

mod cell;
mod row;


use std::collections::BTreeMap;

// re-exports
pub use cell::Cell;
pub use row::Row;

/// A result row exactly as the driver produced it.
pub type RawRow = BTreeMap<String, Cell>;

/// Projection key carrying the instance id.
pub const ID_KEY: &str = "_iid";

/// Projection key carrying the concrete type label in polymorphic reads.
pub const TYPE_KEY: &str = "_type";

/// Recursively unwrap every value cell of a raw row.
#[must_use]
pub fn normalize_row(raw: RawRow) -> Row {
    Row::from(
        raw.into_iter()
            .map(|(k, v)| (k, unwrap_cell(v)))
            .collect::<BTreeMap<_, _>>(),
    )
}

/// Unwrap one cell: `{"value": X, ..}` becomes `X` (recursively), lists and
/// nested rows are unwrapped element-wise, scalars pass through.
#[must_use]
pub fn unwrap_cell(cell: Cell) -> Cell {
    match cell {
        Cell::Row(mut map) => match map.remove("value") {
            Some(inner) => unwrap_cell(inner),
            None => Cell::Row(map.into_iter().map(|(k, v)| (k, unwrap_cell(v))).collect()),
        },
        Cell::List(items) => Cell::List(items.into_iter().map(unwrap_cell).collect()),
        other => other,
    }
}

/// Extract the instance id from a bare-string or wrapped-cell `_iid` entry.
/// Absent, null, or empty ids yield `None`.
#[must_use]
pub fn extract_id(row: &RawRow) -> Option<String> {
    id_of_cell(row.get(ID_KEY)?)
}

pub(crate) fn id_of_cell(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) if !s.is_empty() => Some(s.clone()),
        Cell::Row(map) => map.get("value").and_then(id_of_cell),
        _ => None,
    }
}
