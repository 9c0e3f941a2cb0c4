//! Proxy handles for interpreter-side values
//!
//! ## Ownership
//!
//! A [`PyProxy`] owns exactly one strong reference to its object. Creating a
//! proxy takes over the reference returned by the interpreter call that
//! produced it; [`Clone`] acquires a new one; dropping releases it. The release
//! happens immediately when the interpreter lock is held, otherwise at the next
//! lock acquisition by any thread.
//!
//! ## Equality
//!
//! `PartialEq` is true when both proxies wrap the same interpreter object, or
//! when the interpreter's `==` says so. A failing `__eq__` compares unequal;
//! use [`PyProxy::py_eq`] to see the error.

use crate::errors::{BridgeError, Translate};
use pyo3::prelude::*;
use pyo3::types::PyTuple;
use std::fmt;

pub struct PyProxy {
    inner: Py<PyAny>,
}

impl PyProxy {
    pub(crate) fn from_bound(obj: Bound<'_, PyAny>) -> Self {
        Self { inner: obj.unbind() }
    }

    fn with<T>(
        &self,
        f: impl for<'py> FnOnce(Python<'py>, &Bound<'py, PyAny>) -> Result<T, BridgeError>,
    ) -> Result<T, BridgeError> {
        Python::attach(|py| f(py, self.inner.bind(py)))
    }

    /// Resolve `name` on this object (`getattr(obj, name)`).
    pub fn get_attr(&self, name: &str) -> Result<PyProxy, BridgeError> {
        self.with(|py, obj| {
            obj.getattr(name)
                .map(PyProxy::from_bound)
                .or_translate(py, &format!("getattr '{}'", name))
        })
    }

    /// Resolve a dotted attribute chain, e.g. `path.join`.
    pub fn get_attr_path(&self, dotted: &str) -> Result<PyProxy, BridgeError> {
        self.with(|py, obj| {
            let mut current = obj.clone();
            for part in dotted.split('.') {
                current = current
                    .getattr(part)
                    .or_translate(py, &format!("getattr '{}'", dotted))?;
            }
            Ok(PyProxy::from_bound(current))
        })
    }

    pub fn has_attr(&self, name: &str) -> Result<bool, BridgeError> {
        self.with(|py, obj| {
            obj.hasattr(name)
                .or_translate(py, &format!("hasattr '{}'", name))
        })
    }

    pub fn set_attr(&self, name: &str, value: &PyProxy) -> Result<(), BridgeError> {
        self.with(|py, obj| {
            obj.setattr(name, value.inner.bind(py))
                .or_translate(py, &format!("setattr '{}'", name))
        })
    }

    /// Call this object with positional arguments.
    pub fn call(&self, args: &[&PyProxy]) -> Result<PyProxy, BridgeError> {
        self.with(|py, obj| {
            let args = Self::tuple(py, args)?;
            obj.call1(args)
                .map(PyProxy::from_bound)
                .or_translate(py, "call")
        })
    }

    /// Call method `name` with positional arguments.
    pub fn call_method(&self, name: &str, args: &[&PyProxy]) -> Result<PyProxy, BridgeError> {
        self.with(|py, obj| {
            let args = Self::tuple(py, args)?;
            obj.call_method1(name, args)
                .map(PyProxy::from_bound)
                .or_translate(py, &format!("call '{}'", name))
        })
    }

    fn tuple<'py>(py: Python<'py>, args: &[&PyProxy]) -> Result<Bound<'py, PyTuple>, BridgeError> {
        PyTuple::new(py, args.iter().map(|arg| arg.inner.bind(py)))
            .or_translate(py, "build argument tuple")
    }

    pub fn repr(&self) -> Result<String, BridgeError> {
        self.with(|py, obj| {
            obj.repr()
                .and_then(|s| s.extract::<String>())
                .or_translate(py, "repr")
        })
    }

    pub fn str(&self) -> Result<String, BridgeError> {
        self.with(|py, obj| {
            obj.str()
                .and_then(|s| s.extract::<String>())
                .or_translate(py, "str")
        })
    }

    /// Name of the object's type, e.g. `module` or `int`.
    pub fn type_name(&self) -> Result<String, BridgeError> {
        self.with(|py, obj| {
            obj.get_type()
                .name()
                .and_then(|s| s.extract::<String>())
                .or_translate(py, "type name")
        })
    }

    pub fn is_none(&self) -> bool {
        Python::attach(|py| self.inner.bind(py).is_none())
    }

    pub fn extract_string(&self) -> Result<String, BridgeError> {
        self.with(|py, obj| obj.extract::<String>().or_translate(py, "extract str"))
    }

    pub fn extract_i64(&self) -> Result<i64, BridgeError> {
        self.with(|py, obj| obj.extract::<i64>().or_translate(py, "extract int"))
    }

    pub fn extract_f64(&self) -> Result<f64, BridgeError> {
        self.with(|py, obj| obj.extract::<f64>().or_translate(py, "extract float"))
    }

    pub fn extract_bool(&self) -> Result<bool, BridgeError> {
        self.with(|py, obj| obj.extract::<bool>().or_translate(py, "extract bool"))
    }

    /// Interpreter identity (`a is b`).
    pub fn is(&self, other: &PyProxy) -> bool {
        self.inner.as_ptr() == other.inner.as_ptr()
    }

    /// Interpreter equality (`a == b`).
    pub fn py_eq(&self, other: &PyProxy) -> Result<bool, BridgeError> {
        self.with(|py, obj| obj.eq(other.inner.bind(py)).or_translate(py, "=="))
    }

    /// Current interpreter reference count of the wrapped object.
    pub fn ref_count(&self) -> isize {
        Python::attach(|py| self.inner.bind(py).get_refcnt())
    }
}

impl Clone for PyProxy {
    fn clone(&self) -> Self {
        Python::attach(|py| Self {
            inner: self.inner.clone_ref(py),
        })
    }
}

impl PartialEq for PyProxy {
    fn eq(&self, other: &Self) -> bool {
        self.is(other) || self.py_eq(other).unwrap_or(false)
    }
}

impl fmt::Debug for PyProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            Ok(repr) => write!(f, "PyProxy({})", repr),
            Err(_) => write!(f, "PyProxy(<unrepresentable>)"),
        }
    }
}
