use crate::{
    traits::ModelValue,
    value::{Value, format},
};

///
/// UpdateSet
///
/// Ordered attribute writes for a bulk update. `set` replaces every current
/// value of an attribute; `clear` removes them. A later entry for the same
/// attribute replaces the earlier one.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateSet {
    entries: Vec<(String, Option<Value>)>,
}

impl UpdateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_entry(attr.into(), Some(value.into()))
    }

    #[must_use]
    pub fn clear(self, attr: impl Into<String>) -> Self {
        self.with_entry(attr.into(), None)
    }

    fn with_entry(mut self, attr: String, value: Option<Value>) -> Self {
        match self.entries.iter_mut().find(|(a, _)| *a == attr) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((attr, value)),
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(a, v)| (a.as_str(), v.as_ref()))
    }
}

///
/// UpdateScript
///
/// One match-delete-insert statement. Every replaced attribute gets a
/// conditional binding `try { $e has attr $oldN; };` and a conditional delete
/// `try { $oldN of $e; };`, so a currently absent value is not an error.
/// Only present new values reach the insert section.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateScript {
    var: String,
    replaced: Vec<String>,
    inserts: Vec<String>,
}

impl UpdateScript {
    /// Replace every non-key attribute of `instance` with its current values.
    /// Key attributes identify the instance and are never rewritten.
    #[must_use]
    pub fn for_instance(instance: &dyn ModelValue, var: &str) -> Self {
        let mut script = Self::empty(var);

        for attribute in instance.model().attributes.iter().filter(|a| !a.key) {
            script.replaced.push(attribute.name.to_string());
            for value in instance.values(attribute.name) {
                script.push_insert(attribute.name, &value);
            }
        }

        script
    }

    #[must_use]
    pub fn for_set(set: &UpdateSet, var: &str) -> Self {
        let mut script = Self::empty(var);

        for (attr, value) in set.iter() {
            script.replaced.push(attr.to_string());
            if let Some(value) = value {
                script.push_insert(attr, value);
            }
        }

        script
    }

    fn empty(var: &str) -> Self {
        Self {
            var: var.to_string(),
            ..Self::default()
        }
    }

    fn push_insert(&mut self, attr: &str, value: &Value) {
        self.inserts.push(format!("has {attr} {}", format(value)));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty() && self.inserts.is_empty()
    }

    /// Full statement under `match_clause` (which must bind `$var`), or
    /// `None` when there is nothing to write.
    #[must_use]
    pub fn render(&self, match_clause: &str) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let var = &self.var;
        let mut lines = vec![match_clause.to_string()];
        lines.extend(
            self.replaced
                .iter()
                .enumerate()
                .map(|(i, attr)| format!("try {{ ${var} has {attr} $old{i}; }};")),
        );

        if !self.replaced.is_empty() {
            lines.push("delete".to_string());
            lines.extend(
                (0..self.replaced.len()).map(|i| format!("try {{ $old{i} of ${var}; }};")),
            );
        }

        if !self.inserts.is_empty() {
            lines.push("insert".to_string());
            lines.push(format!("${var} {};", self.inserts.join(", ")));
        }

        Some(lines.join("\n"))
    }
}
