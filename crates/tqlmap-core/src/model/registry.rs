use crate::model::TypeModel;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("type '{0}' is already registered with a different descriptor")]
    Conflict(&'static str),
}

///
/// ModelRegistry
///
/// Name-indexed set of type descriptors known to a session.
/// Registration happens once at startup; lookups never mutate.
///

#[derive(Debug, Default)]
pub struct ModelRegistry {
    types: BTreeMap<&'static str, &'static TypeModel>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Re-registering the same descriptor is a no-op.
    pub fn register(&mut self, model: &'static TypeModel) -> Result<(), RegistryError> {
        match self.types.get(model.name) {
            Some(existing) if std::ptr::eq(*existing, model) || **existing == *model => Ok(()),
            Some(_) => Err(RegistryError::Conflict(model.name)),
            None => {
                self.types.insert(model.name, model);
                Ok(())
            }
        }
    }

    /// Builder-style registration for startup code.
    pub fn with(mut self, model: &'static TypeModel) -> Result<Self, RegistryError> {
        self.register(model)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static TypeModel> {
        self.types.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every registered type whose supertype chain reaches `name`,
    /// excluding `name` itself. Ordered by type name.
    #[must_use]
    pub fn subtypes_of(&self, name: &str) -> Vec<&'static TypeModel> {
        self.types
            .values()
            .copied()
            .filter(|model| model.name != name && self.descends_from(model, name))
            .collect()
    }

    fn descends_from(&self, model: &TypeModel, ancestor: &str) -> bool {
        let mut current = model.supertype;
        let mut hops = 0;

        // supertype cycles are a schema fault; stop after visiting every type once
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.types.len() {
                return false;
            }
            current = self.get(parent).and_then(|m| m.supertype);
        }

        false
    }
}
