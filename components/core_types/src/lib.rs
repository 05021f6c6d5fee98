//! Core JavaScript value types and error handling.
//!
//! This crate provides the foundational types shared by the future runtime:
//! the opaque payload a future settles with, the errors the runtime raises on
//! its own behalf, and the minimal object protocol used to recognize
//! thenables.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`JsError`] - JavaScript errors raised by the runtime
//! - [`ErrorKind`] - Types of JavaScript errors
//! - [`JsObject`] - Member access and calls on heap objects
//! - [`Function`] - Native callable objects
//! - [`PlainObject`] - Ordinary property bags
//!
//! # Examples
//!
//! ```
//! use core_types::{JsObject, PlainObject, Function, Value};
//!
//! // Create JavaScript values
//! let num = Value::Smi(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//!
//! // A thenable is any object with a callable `then` member
//! let thenable = PlainObject::new().with("then", Function::new(|_| Ok(Value::Undefined)));
//! assert!(thenable.get("then").unwrap().is_callable());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod function;
mod object;
mod value;

pub use error::{ErrorKind, JsError, JsResult};
pub use function::{arg, Function};
pub use object::{JsObject, PlainObject, Property};
pub use value::Value;
