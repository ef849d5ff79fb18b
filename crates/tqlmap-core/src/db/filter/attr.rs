use crate::{db::filter::Filter, value::Value};

///
/// AttrRef
///
/// Attribute-centric filter builder: `attr("age").gte(18)`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttrRef(&'static str);

/// Start a filter on attribute `name`.
#[must_use]
pub const fn attr(name: &'static str) -> AttrRef {
    AttrRef(name)
}

impl AttrRef {
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }

    pub fn eq(self, value: impl Into<Value>) -> Filter {
        Filter::eq(self.0, value)
    }

    pub fn neq(self, value: impl Into<Value>) -> Filter {
        Filter::neq(self.0, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Filter {
        Filter::gt(self.0, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Filter {
        Filter::gte(self.0, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Filter {
        Filter::lt(self.0, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Filter {
        Filter::lte(self.0, value)
    }

    pub fn contains(self, substring: impl Into<String>) -> Filter {
        Filter::contains(self.0, substring)
    }

    pub fn like(self, pattern: impl Into<String>) -> Filter {
        Filter::like(self.0, pattern)
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Filter {
        Filter::starts_with(self.0, prefix)
    }

    pub fn between(self, min: impl Into<Value>, max: impl Into<Value>) -> Filter {
        Filter::range(self.0, min, max)
    }

    pub fn in_list<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Filter {
        Filter::in_list(self.0, values)
    }

    pub fn not_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Filter {
        Filter::not_in(self.0, values)
    }

    #[must_use]
    pub fn exists(self) -> Filter {
        Filter::has_attr(self.0)
    }

    #[must_use]
    pub fn missing(self) -> Filter {
        Filter::not_has_attr(self.0)
    }
}
