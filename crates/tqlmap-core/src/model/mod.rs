//! Static type descriptors.
//!
//! Descriptors are built once (usually as `static` items next to the user's
//! model type) and passed by reference into every compiler and builder call.

pub mod attribute;
pub mod registry;
pub mod role;
pub mod type_model;


// re-exports
pub use attribute::{AttributeModel, ValueKind};
pub use registry::{ModelRegistry, RegistryError};
pub use role::RoleModel;
pub use type_model::{ModelKind, TypeModel};
