use crate::{db::response::Row, error::InternalError, model::TypeModel, value::Value};

///
/// ModelValue
///
/// Object-safe view of one instance: its descriptor, its id, and its current
/// attribute values. Role players of a relation are exposed through the same
/// trait so the compilers can walk them without knowing their concrete type.
///

pub trait ModelValue {
    fn model(&self) -> &'static TypeModel;

    /// Database-assigned id, once known.
    fn id(&self) -> Option<&str>;

    /// Current values of `attr`. An empty list means the attribute is absent;
    /// multi-valued attributes return one entry per value.
    fn values(&self, attr: &str) -> Vec<Value>;

    /// Player filling `role`, for relations.
    fn role_player(&self, _role: &str) -> Option<&dyn ModelValue> {
        None
    }
}

///
/// Model
///
/// A registered user type. `hydrate` populates an instance from a normalized
/// result row; `set_id` records the id assigned by the database.
///

pub trait Model: ModelValue + Sized {
    const MODEL: &'static TypeModel;

    fn set_id(&mut self, id: String);

    fn hydrate(row: &Row) -> Result<Self, InternalError>;
}
