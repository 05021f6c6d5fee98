//! Object protocol.
//!
//! The runtime needs exactly two things from an object: reading a member that
//! may fail (a throwing getter), and calling it. [`JsObject`] captures those
//! and nothing else, so foreign thenables can be any Rust type.

use crate::{Function, JsResult, JsError, Value};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A heap object reachable from a [`Value`].
pub trait JsObject: Any {
    /// Reads the member `key`. Missing members read as `Undefined`.
    fn get(&self, key: &str) -> JsResult<Value>;

    /// Returns true if `key` names an own member, without running getters.
    fn has(&self, _key: &str) -> bool {
        false
    }

    /// Returns true if this object can be called.
    fn is_callable(&self) -> bool {
        false
    }

    /// Calls this object with `this` as receiver.
    fn call(&self, _this: &Value, _args: &[Value]) -> JsResult<Value> {
        Err(JsError::type_error(format!("{} is not a function", self.class_name())).into())
    }

    /// Name used by `Display` and `Debug`.
    fn class_name(&self) -> &'static str {
        "Object"
    }

    /// Converts the shared object back into `Rc<dyn Any>` for downcasting.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// A single property slot.
#[derive(Clone)]
pub enum Property {
    /// Plain stored value
    Data(Value),
    /// Getter run on every read; an `Err` from it is a failed read
    Accessor(Function),
}

/// An ordinary object: an insertion-ordered bag of properties.
///
/// # Examples
///
/// ```
/// use core_types::{JsObject, PlainObject, Value};
///
/// let record = PlainObject::new()
///     .with("status", "fulfilled")
///     .with("value", 1);
/// assert_eq!(record.get("status").unwrap(), Value::from("fulfilled"));
/// assert_eq!(record.get("missing").unwrap(), Value::Undefined);
/// ```
#[derive(Default)]
pub struct PlainObject {
    properties: RefCell<Vec<(String, Property)>>,
}

impl PlainObject {
    /// Creates an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a data property and returns the object.
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.define(key, Property::Data(value.into()));
        self
    }

    /// Adds a getter property and returns the object.
    pub fn with_getter(self, key: &str, getter: Function) -> Self {
        self.define(key, Property::Accessor(getter));
        self
    }

    /// Sets a data property, replacing any existing slot with the same key.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.define(key, Property::Data(value.into()));
    }

    /// Returns the property keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.properties
            .borrow()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Wraps the object into a shared [`Value`].
    pub fn into_value(self) -> Value {
        Value::Object(Rc::new(self))
    }

    fn define(&self, key: &str, property: Property) {
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = property,
            None => properties.push((key.to_string(), property)),
        }
    }
}

impl JsObject for PlainObject {
    fn get(&self, key: &str) -> JsResult<Value> {
        let property = self
            .properties
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.clone());
        // The borrow is released before a getter runs; getters may touch this object.
        match property {
            None => Ok(Value::Undefined),
            Some(Property::Data(value)) => Ok(value),
            Some(Property::Accessor(getter)) => getter.call(&Value::Undefined, &[]),
        }
    }

    fn has(&self, key: &str) -> bool {
        self.properties.borrow().iter().any(|(k, _)| k == key)
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
