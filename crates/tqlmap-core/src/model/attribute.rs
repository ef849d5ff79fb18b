///
/// AttributeModel
/// Runtime attribute metadata used by the compilers.
///

#[derive(Debug, Eq, PartialEq)]
pub struct AttributeModel {
    /// Attribute type label as declared in the schema.
    pub name: &'static str,
    /// Identifies instances before an id is known.
    pub key: bool,
    pub unique: bool,
    pub kind: ValueKind,
    /// Absent values are omitted, never written as null.
    pub optional: bool,
    /// Projected as a list in fetch clauses.
    pub multi: bool,
}

impl AttributeModel {
    /// A required, single-valued, non-key attribute.
    #[must_use]
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            key: false,
            unique: false,
            kind,
            optional: false,
            multi: false,
        }
    }

    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub const fn multi(mut self) -> Self {
        self.multi = true;
        self
    }
}

///
/// ValueKind
///
/// Value type of an attribute, aligned with `Value` variants.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    DateTime,
    DateTimeTz,
}

impl ValueKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Double)
    }
}
