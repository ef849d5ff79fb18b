use crate::db::driver::DriverError;
use std::{borrow::Cow, fmt};
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every error raised by an operation carries an `ErrorContext` naming the
/// operation, the model type, and (for batches) the failing element.
///

#[derive(Debug, ThisError)]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
    pub context: Option<ErrorContext>,

    /// Executor fault this error wraps, if any.
    #[source]
    pub source: Option<DriverError>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            context: None,
            source: None,
        }
    }

    /// Construct a validation fault (absent instance, missing id, bad input).
    pub fn validation(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, origin, message)
    }

    /// Construct a not-found fault raised by strict deletes.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Mutation, message)
    }

    /// Construct the fault returned when the pre-flight cancellation check trips.
    pub(crate) fn cancelled() -> Self {
        Self::new(
            ErrorClass::Cancelled,
            ErrorOrigin::Executor,
            "operation cancelled before the first statement",
        )
    }

    /// Construct a hydration fault. Hydrators return this for rows they cannot map.
    pub fn hydrate(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Hydrate, ErrorOrigin::Response, message)
    }

    /// Construct a response-origin invariant violation.
    pub(crate) fn response_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Response,
            message,
        )
    }

    /// Construct a query-origin unsupported error (e.g. `sum` over text).
    pub(crate) fn query_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Query, message)
    }

    /// Attach operation and type context. Existing context is kept, so the
    /// innermost annotation wins; an index-only context is completed.
    #[must_use]
    pub fn with_op(mut self, op: &'static str, type_name: impl Into<Cow<'static, str>>) -> Self {
        match self.context.as_mut() {
            None => {
                self.context = Some(ErrorContext {
                    op,
                    type_name: type_name.into(),
                    index: None,
                });
            }
            Some(ctx) if ctx.op.is_empty() => {
                ctx.op = op;
                ctx.type_name = type_name.into();
            }
            Some(_) => {}
        }
        self
    }

    /// Attach the index of the failing batch element.
    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        match self.context.as_mut() {
            Some(ctx) => {
                ctx.index.get_or_insert(index);
            }
            None => {
                self.context = Some(ErrorContext {
                    op: "",
                    type_name: Cow::Borrowed(""),
                    index: Some(index),
                });
            }
        }
        self
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.class, ErrorClass::Cancelled)
    }

    /// Failing batch element, when the error came from a batch operation.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.context.as_ref().and_then(|ctx| ctx.index)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin, self.class)
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{ctx}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<DriverError> for InternalError {
    fn from(err: DriverError) -> Self {
        Self {
            class: ErrorClass::Executor,
            origin: ErrorOrigin::Executor,
            message: err.to_string(),
            context: None,
            source: Some(err),
        }
    }
}

///
/// ErrorContext
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorContext {
    pub op: &'static str,
    /// Model type name, or the function name for schema function calls.
    pub type_name: Cow<'static, str>,
    pub index: Option<usize>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if !self.op.is_empty() {
            parts.push(self.op.to_string());
        }
        if !self.type_name.is_empty() {
            parts.push(self.type_name.to_string());
        }
        if let Some(index) = self.index {
            parts.push(format!("[index {index}]"));
        }

        write!(f, "{}", parts.join(" "))
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    Cancelled,
    Executor,
    Hydrate,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Cancelled => "cancelled",
            Self::Executor => "executor",
            Self::Hydrate => "hydrate",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Query,
    Mutation,
    Executor,
    Response,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Executor => "executor",
            Self::Response => "response",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
