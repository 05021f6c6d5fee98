//! Native callable objects.

use crate::{JsObject, JsResult, Value};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

type Callback = dyn Fn(&Value, &[Value]) -> JsResult<Value>;

/// A function that can be called with arguments and returns a [`JsResult`].
///
/// `Function` is a cheap handle; clones call the same closure. Returning
/// `Err` is how a function throws.
///
/// # Examples
///
/// ```
/// use core_types::{arg, Function, Value};
///
/// let double = Function::new(|args| match arg(args, 0) {
///     Value::Smi(n) => Ok(Value::Smi(n * 2)),
///     other => Err(other),
/// });
/// assert_eq!(double.call1(Value::Smi(21)).unwrap(), Value::Smi(42));
/// ```
#[derive(Clone)]
pub struct Function {
    inner: Rc<NativeFunction>,
}

struct NativeFunction {
    callback: Box<Callback>,
}

impl Function {
    /// Creates a new Function from a closure over its arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> JsResult<Value> + 'static,
    {
        Self::with_receiver(move |_this, args| f(args))
    }

    /// Creates a new Function whose closure also sees the `this` receiver.
    pub fn with_receiver<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> JsResult<Value> + 'static,
    {
        Self {
            inner: Rc::new(NativeFunction {
                callback: Box::new(f),
            }),
        }
    }

    /// Views a callable value as a `Function`.
    ///
    /// Native functions are returned as-is; any other callable object is
    /// wrapped so that calls are forwarded to it. Non-callable values yield
    /// `None`.
    pub fn from_value(value: &Value) -> Option<Function> {
        let obj = match value {
            Value::Object(obj) if obj.is_callable() => Rc::clone(obj),
            _ => return None,
        };
        match Rc::clone(&obj).into_any().downcast::<NativeFunction>() {
            Ok(inner) => Some(Function { inner }),
            Err(_) => Some(Function::with_receiver(move |this, args| obj.call(this, args))),
        }
    }

    /// Calls the function with the given receiver and arguments.
    pub fn call(&self, this: &Value, args: &[Value]) -> JsResult<Value> {
        (self.inner.callback)(this, args)
    }

    /// Calls the function with a single argument and no receiver.
    pub fn call1(&self, argument: Value) -> JsResult<Value> {
        self.call(&Value::Undefined, &[argument])
    }

    /// Wraps the function into a shared [`Value`].
    pub fn to_value(&self) -> Value {
        Value::Object(self.inner.clone())
    }

    /// Returns true if both handles call the same closure.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function {{ ... }}")
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        f.to_value()
    }
}

impl JsObject for NativeFunction {
    fn get(&self, _key: &str) -> JsResult<Value> {
        Ok(Value::Undefined)
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, this: &Value, args: &[Value]) -> JsResult<Value> {
        (self.callback)(this, args)
    }

    fn class_name(&self) -> &'static str {
        "Function"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Returns argument `index`, or `Undefined` when it was not passed.
pub fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}
