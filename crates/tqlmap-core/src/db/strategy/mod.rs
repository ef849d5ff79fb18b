//! Entity/relation query shapes.
//!
//! Plain entities and relations with role links need differently shaped
//! match, insert, and fetch text. `ModelStrategy` is chosen once per model
//! kind and dispatches to the matching builder module.

mod entity;
mod relation;

#[cfg(test)]
mod tests;

use crate::{
    db::response::{ID_KEY, TYPE_KEY},
    model::{AttributeModel, ModelKind, ModelRegistry, TypeModel},
    traits::ModelValue,
    value::format,
};

///
/// ModelStrategy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModelStrategy {
    Entity,
    Relation,
}

impl ModelStrategy {
    #[must_use]
    pub const fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Entity => Self::Entity,
            ModelKind::Relation => Self::Relation,
        }
    }

    #[must_use]
    pub const fn for_model(model: &TypeModel) -> Self {
        Self::for_kind(model.kind)
    }

    /// Full insert query (without the id projection).
    #[must_use]
    pub fn build_insert(self, instance: &dyn ModelValue, var: &str) -> String {
        match self {
            Self::Entity => entity::write(instance, var, "insert"),
            Self::Relation => relation::write(instance, var, "insert"),
        }
    }

    /// Full upsert query: inserts when no instance with identical data exists.
    #[must_use]
    pub fn build_put(self, instance: &dyn ModelValue, var: &str) -> String {
        match self {
            Self::Entity => entity::write(instance, var, "put"),
            Self::Relation => relation::write(instance, var, "put"),
        }
    }

    /// Match clause locating `instance` by its natural key.
    #[must_use]
    pub fn build_match_by_key(self, instance: &dyn ModelValue, var: &str) -> String {
        match self {
            Self::Entity => entity::match_by_key(instance, var),
            Self::Relation => relation::match_by_key(instance, var),
        }
    }

    #[must_use]
    pub fn build_match_all(self, model: &TypeModel, var: &str) -> String {
        format!("match\n${var} isa {};", model.name)
    }

    #[must_use]
    pub fn build_match_by_id(self, model: &TypeModel, id: &str, var: &str) -> String {
        format!("match\n${var} isa {}, iid {id};", model.name)
    }

    #[must_use]
    pub fn build_fetch_all(self, model: &TypeModel, var: &str) -> String {
        fetch_clause(&fetch_items(model.attributes.iter(), var))
    }

    /// Extra match fragments plus the fetch clause projecting role players.
    /// Entities have no roles and get the plain fetch.
    #[must_use]
    pub fn build_fetch_with_roles(
        self,
        model: &TypeModel,
        registry: &ModelRegistry,
        var: &str,
    ) -> (Vec<String>, String) {
        match self {
            Self::Entity => (Vec::new(), self.build_fetch_all(model, var)),
            Self::Relation => relation::fetch_with_roles(model, registry, var),
        }
    }

    /// Strict-subtype match capturing the concrete type label in `$type_var`.
    #[must_use]
    pub fn build_match_all_polymorphic(
        self,
        model: &TypeModel,
        var: &str,
        type_var: &str,
    ) -> String {
        format!("match\n${var} isa! ${type_var};\n${type_var} sub {};", model.name)
    }

    /// Fetch over the union of attributes of `model` and its registered
    /// subtypes, plus the concrete type label.
    #[must_use]
    pub fn build_fetch_all_with_type(
        self,
        model: &TypeModel,
        registry: &ModelRegistry,
        var: &str,
        type_var: &str,
    ) -> String {
        let mut attributes: Vec<&AttributeModel> = model.attributes.iter().collect();
        for sub in registry.subtypes_of(model.name) {
            for attribute in sub.attributes {
                if !attributes.iter().any(|a| a.name == attribute.name) {
                    attributes.push(attribute);
                }
            }
        }

        let mut items = fetch_items(attributes.into_iter(), var);
        items.insert(1, format!("\"{TYPE_KEY}\": label(${type_var})"));

        fetch_clause(&items)
    }
}

// ---------------------------------------------------------------------
// Shared builders
// ---------------------------------------------------------------------

/// Fetch clause with one item per line.
pub(crate) fn fetch_clause(items: &[String]) -> String {
    format!("fetch {{\n  {}\n}};", items.join(",\n  "))
}

/// Id projection followed by one projection per attribute.
pub(crate) fn fetch_items<'a>(
    attributes: impl Iterator<Item = &'a AttributeModel>,
    var: &str,
) -> Vec<String> {
    let mut items = vec![id_item(var)];
    items.extend(attributes.map(|a| {
        if a.multi {
            format!("\"{0}\": [${var}.{0}]", a.name)
        } else {
            format!("\"{0}\": ${var}.{0}", a.name)
        }
    }));

    items
}

pub(crate) fn id_item(var: &str) -> String {
    format!("\"{ID_KEY}\": iid(${var})")
}

/// Fetch clause projecting only the id of `$var`.
#[must_use]
pub fn fetch_id_only(var: &str) -> String {
    fetch_clause(&[id_item(var)])
}

/// `has attr literal` constraints for every present value of the selected
/// attributes, in descriptor order. Absent values are omitted.
pub(crate) fn has_constraints(
    instance: &dyn ModelValue,
    select: impl Fn(&AttributeModel) -> bool,
) -> Vec<String> {
    instance
        .model()
        .attributes
        .iter()
        .filter(|a| select(a))
        .flat_map(|a| {
            instance
                .values(a.name)
                .into_iter()
                .map(move |v| format!("has {} {}", a.name, format(&v)))
        })
        .collect()
}
