use crate::model::{AttributeModel, RoleModel};

///
/// ModelKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModelKind {
    Entity,
    Relation,
}

///
/// TypeModel
/// Immutable descriptor for one registered entity or relation type.
///

#[derive(Debug, Eq, PartialEq)]
pub struct TypeModel {
    /// Type label used in `isa` constraints.
    pub name: &'static str,
    pub kind: ModelKind,
    /// Direct supertype label, if the type specializes another registered type.
    pub supertype: Option<&'static str>,
    /// Ordered attribute list (authoritative for insert and fetch order).
    pub attributes: &'static [AttributeModel],
    /// Ordered role list; empty for entities.
    pub roles: &'static [RoleModel],
}

impl TypeModel {
    #[must_use]
    pub const fn entity(name: &'static str, attributes: &'static [AttributeModel]) -> Self {
        Self {
            name,
            kind: ModelKind::Entity,
            supertype: None,
            attributes,
            roles: &[],
        }
    }

    #[must_use]
    pub const fn relation(
        name: &'static str,
        roles: &'static [RoleModel],
        attributes: &'static [AttributeModel],
    ) -> Self {
        Self {
            name,
            kind: ModelKind::Relation,
            supertype: None,
            attributes,
            roles,
        }
    }

    #[must_use]
    pub const fn sub(mut self, supertype: &'static str) -> Self {
        self.supertype = Some(supertype);
        self
    }

    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.kind, ModelKind::Relation)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeModel> {
        self.attributes.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn role(&self, name: &str) -> Option<&'static RoleModel> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn key_attributes(&self) -> impl Iterator<Item = &'static AttributeModel> {
        self.attributes.iter().filter(|a| a.key)
    }

    #[must_use]
    pub fn has_keys(&self) -> bool {
        self.attributes.iter().any(|a| a.key)
    }
}
