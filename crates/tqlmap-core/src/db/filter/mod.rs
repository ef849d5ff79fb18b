//! Filter trees and their compilation into TypeQL pattern fragments.
//!
//! Filters are immutable values. `compile` walks a tree and emits ordered
//! fragments; OR alternatives and NOT blocks rename their attribute
//! variables with a process-wide scope counter so sibling branches never
//! bind the same local variable.

mod attr;
mod compile;

#[cfg(test)]
mod tests;

use crate::value::Value;
use std::ops::{BitAnd, BitOr, Not};

// re-exports
pub use attr::{AttrRef, attr};
pub use compile::{CONTRADICTION_IID, attr_var, sanitize_var};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextOp {
    Contains,
    Like,
}

impl TextOp {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Like => "like",
        }
    }
}

///
/// Filter
///
/// Leaf variants name exactly one attribute; combinators carry none.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Compare {
        attr: String,
        op: CompareOp,
        value: Value,
        negated: bool,
    },
    Text {
        attr: String,
        op: TextOp,
        pattern: String,
        negated: bool,
    },
    /// Inclusive on both ends.
    Range {
        attr: String,
        min: Value,
        max: Value,
        negated: bool,
    },
    In {
        attr: String,
        values: Vec<Value>,
        negated: bool,
    },
    Exists {
        attr: String,
        negated: bool,
    },
    Id(String),
    And(Conjunction),
    Or(Vec<Self>),
    Not(Box<Self>),
    /// Relation-only: constrain the player of `role` with `inner`.
    RolePlayer {
        role: String,
        inner: Box<Self>,
    },
}

///
/// Conjunction
///
/// Children of an AND. Only constructible through `Filter::and`, which
/// flattens nested conjunctions, so an AND never directly contains an AND.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Conjunction(Vec<Filter>);

impl Conjunction {
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.0
    }
}

impl Filter {
    // ---------------------------------------------------------------------
    // Comparisons
    // ---------------------------------------------------------------------

    pub fn compare(attr: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            attr: attr.into(),
            op,
            value: value.into(),
            negated: false,
        }
    }

    pub fn eq(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(attr, CompareOp::Eq, value)
    }

    pub fn neq(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(attr, CompareOp::Ne, value)
    }

    pub fn gt(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(attr, CompareOp::Gt, value)
    }

    pub fn gte(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(attr, CompareOp::Gte, value)
    }

    pub fn lt(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(attr, CompareOp::Lt, value)
    }

    pub fn lte(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(attr, CompareOp::Lte, value)
    }

    // ---------------------------------------------------------------------
    // String matching
    // ---------------------------------------------------------------------

    pub fn contains(attr: impl Into<String>, substring: impl Into<String>) -> Self {
        Self::Text {
            attr: attr.into(),
            op: TextOp::Contains,
            pattern: substring.into(),
            negated: false,
        }
    }

    pub fn like(attr: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Text {
            attr: attr.into(),
            op: TextOp::Like,
            pattern: pattern.into(),
            negated: false,
        }
    }

    /// Sugar over `like` with a trailing wildcard.
    pub fn starts_with(attr: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::like(attr, format!("{}.*", prefix.into()))
    }

    /// Regular-expression match; `like` takes a regex in TypeQL.
    pub fn regex(attr: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::like(attr, pattern)
    }

    // ---------------------------------------------------------------------
    // Ranges, membership, existence
    // ---------------------------------------------------------------------

    pub fn range(attr: impl Into<String>, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self::Range {
            attr: attr.into(),
            min: min.into(),
            max: max.into(),
            negated: false,
        }
    }

    pub fn in_list<V: Into<Value>>(
        attr: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            attr: attr.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<V: Into<Value>>(
        attr: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::in_list(attr, values).negate()
    }

    pub fn has_attr(attr: impl Into<String>) -> Self {
        Self::Exists {
            attr: attr.into(),
            negated: false,
        }
    }

    pub fn not_has_attr(attr: impl Into<String>) -> Self {
        Self::has_attr(attr).negate()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    // ---------------------------------------------------------------------
    // Combinators
    // ---------------------------------------------------------------------

    /// Conjunction of `filters`; nested conjunctions are flattened in order.
    pub fn and(filters: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for filter in filters {
            match filter {
                Self::And(Conjunction(children)) => flat.extend(children),
                other => flat.push(other),
            }
        }

        Self::And(Conjunction(flat))
    }

    pub fn or(alternatives: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(alternatives.into_iter().collect())
    }

    pub fn not(filter: Self) -> Self {
        Self::Not(Box::new(filter))
    }

    pub fn role_player(role: impl Into<String>, inner: Self) -> Self {
        Self::RolePlayer {
            role: role.into(),
            inner: Box::new(inner),
        }
    }

    /// Flip the negation flag of a leaf. Combinators are wrapped in `Not`.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Compare {
                attr,
                op,
                value,
                negated,
            } => Self::Compare {
                attr,
                op,
                value,
                negated: !negated,
            },
            Self::Text {
                attr,
                op,
                pattern,
                negated,
            } => Self::Text {
                attr,
                op,
                pattern,
                negated: !negated,
            },
            Self::Range {
                attr,
                min,
                max,
                negated,
            } => Self::Range {
                attr,
                min,
                max,
                negated: !negated,
            },
            Self::In {
                attr,
                values,
                negated,
            } => Self::In {
                attr,
                values,
                negated: !negated,
            },
            Self::Exists { attr, negated } => Self::Exists {
                attr,
                negated: !negated,
            },
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Attribute named by a leaf filter.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Compare { attr, .. }
            | Self::Text { attr, .. }
            | Self::Range { attr, .. }
            | Self::In { attr, .. }
            | Self::Exists { attr, .. } => Some(attr),
            Self::Id(_) | Self::And(_) | Self::Or(_) | Self::Not(_) | Self::RolePlayer { .. } => {
                None
            }
        }
    }
}

// ---------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and([self, rhs])
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut alternatives = match self {
            Self::Or(children) => children,
            other => vec![other],
        };
        alternatives.push(rhs);

        Self::Or(alternatives)
    }
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::not(self)
    }
}
