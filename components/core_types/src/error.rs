//! JavaScript error types and error handling.
//!
//! This module provides the error objects that the runtime produces on its
//! own behalf (argument errors, chaining cycles, aggregate rejections) and the
//! [`JsResult`] alias used everywhere user code can throw.

use crate::Value;
use thiserror::Error;

/// Result of running user code.
///
/// The error side is the thrown value itself. Any [`Value`] can be thrown,
/// and engine errors convert into `Value::Error` through `?`.
pub type JsResult<T = Value> = Result<T, Value>;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors, plus the
/// distinct tag used for self-resolution cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Plain `Error`
    Error,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// A future was resolved with itself
    ChainingCycle,
    /// Every input of an `any` combinator rejected
    AggregateError,
}

impl ErrorKind {
    /// Returns the constructor name reported for this kind.
    ///
    /// A chaining cycle surfaces as a `TypeError`, as Promises/A+ requires;
    /// the separate variant only exists so callers can tell it apart.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError | ErrorKind::ChainingCycle => "TypeError",
            ErrorKind::AggregateError => "AggregateError",
        }
    }
}

/// A JavaScript error with a message.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::type_error("undefined is not a function");
/// assert_eq!(error.kind, ErrorKind::TypeError);
/// assert_eq!(error.to_string(), "TypeError: undefined is not a function");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}: {}", .kind.name(), .message)]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Collected reasons, only populated for [`ErrorKind::AggregateError`]
    pub errors: Vec<Value>,
}

impl JsError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Creates the error used when a future is resolved with itself.
    pub fn chaining_cycle() -> Self {
        Self::new(
            ErrorKind::ChainingCycle,
            "Chaining cycle detected for promise",
        )
    }

    /// Creates an `AggregateError` carrying `errors` in order.
    pub fn aggregate(errors: Vec<Value>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::AggregateError,
            message: message.into(),
            errors,
        }
    }

    /// Returns true if this is a chaining cycle error.
    pub fn is_chaining_cycle(&self) -> bool {
        self.kind == ErrorKind::ChainingCycle
    }
}

impl From<JsError> for Value {
    fn from(error: JsError) -> Self {
        Value::Error(error)
    }
}
