use crate::{
    db::response::{Cell, ID_KEY, TYPE_KEY, id_of_cell},
    error::InternalError,
};
use chrono::{NaiveDate, NaiveDateTime};
use derive_more::{Deref, DerefMut, IntoIterator};
use std::collections::BTreeMap;

///
/// Row
///
/// Flattened, unwrapped result row handed to `Model::hydrate`.
/// Typed getters return `None` for absent keys and mismatched shapes.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, IntoIterator, PartialEq)]
pub struct Row(BTreeMap<String, Cell>);

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.0.insert(key.into(), cell.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.0.get(ID_KEY).and_then(id_of_cell)
    }

    /// Concrete type label captured by polymorphic reads.
    #[must_use]
    pub fn type_label(&self) -> Option<&str> {
        self.text(TYPE_KEY)
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Cell::as_text)
    }

    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Cell::as_i64)
    }

    #[must_use]
    pub fn float(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Cell::as_f64)
    }

    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Cell::as_bool)
    }

    #[must_use]
    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        let text = self.text(key)?;
        NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
    }

    #[must_use]
    pub fn datetime(&self, key: &str) -> Option<NaiveDateTime> {
        let text = self.text(key)?;
        NaiveDateTime::parse_from_str(text.get(..19)?, "%Y-%m-%dT%H:%M:%S").ok()
    }

    /// Text values of a multi-valued attribute. A single bare value is
    /// treated as a one-element list.
    #[must_use]
    pub fn texts(&self, key: &str) -> Vec<&str> {
        match self.0.get(key) {
            Some(Cell::List(items)) => items.iter().filter_map(Cell::as_text).collect(),
            Some(Cell::Text(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    /// Nested projection (role players in relation reads).
    #[must_use]
    pub fn nested(&self, key: &str) -> Option<Self> {
        match self.0.get(key) {
            Some(Cell::Row(map)) => Some(Self(map.clone())),
            _ => None,
        }
    }

    /// Required text attribute, for hydrators.
    pub fn require_text(&self, key: &str) -> Result<&str, InternalError> {
        self.text(key)
            .ok_or_else(|| InternalError::hydrate(format!("row has no text value for '{key}'")))
    }
}

impl From<BTreeMap<String, Cell>> for Row {
    fn from(map: BTreeMap<String, Cell>) -> Self {
        Self(map)
    }
}
