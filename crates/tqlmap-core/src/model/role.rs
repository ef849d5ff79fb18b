///
/// RoleModel
/// One role slot of a relation and the type expected to play it.
///

#[derive(Debug, Eq, PartialEq)]
pub struct RoleModel {
    pub name: &'static str,
    pub player: &'static str,
}

impl RoleModel {
    #[must_use]
    pub const fn new(name: &'static str, player: &'static str) -> Self {
        Self { name, player }
    }
}
