//! The singleton interface to the running interpreter

use crate::errors::{BridgeError, InterpreterError, Translate};
use crate::object::PyProxy;
use pyo3::prelude::*;
use pyo3::types::PyModule;
use std::ffi::CString;

/// Name of the module holding built-in functions, types, constants and
/// exceptions. Python 2 called it `__builtin__`; only Python 3 is supported.
pub const BUILTINS_MODULE: &str = "builtins";

/// Interface to the started interpreter
///
/// Obtained from [`crate::instance`] (or [`crate::Lifecycle::instance`]) and
/// only ever after startup succeeded. There is one per lifecycle and it lives
/// for the rest of the process: the interpreter is never finalized, because
/// finalization does not release its resources reliably and it cannot be
/// safely re-initialized afterwards.
#[derive(Debug)]
pub struct Interpreter {
    _marker: (),
}

impl Interpreter {
    pub(crate) fn new() -> Self {
        Self { _marker: () }
    }

    /// Return the module with the given absolute name, importing it if needed.
    ///
    /// The name is passed to the interpreter unchanged.
    pub fn get_module(&self, name: &str) -> Result<PyProxy, BridgeError> {
        Python::attach(|py| import(py, name).map(|m| PyProxy::from_bound(m.into_any())))
    }

    /// Return the builtins namespace ([`BUILTINS_MODULE`]).
    pub fn get_builtins(&self) -> Result<PyProxy, BridgeError> {
        self.get_module(BUILTINS_MODULE)
    }

    /// Evaluate a single expression in the `__main__` namespace.
    pub fn eval(&self, expr: &str) -> Result<PyProxy, BridgeError> {
        let code = source_cstring("eval", expr)?;
        Python::attach(|py| {
            py.eval(code.as_c_str(), None, None)
                .map(PyProxy::from_bound)
                .or_translate(py, "eval")
        })
    }

    /// Execute statements in the `__main__` namespace.
    pub fn run(&self, code: &str) -> Result<(), BridgeError> {
        let code = source_cstring("run", code)?;
        Python::attach(|py| py.run(code.as_c_str(), None, None).or_translate(py, "run"))
    }

    /// `sys.version`
    pub fn version(&self) -> Result<String, BridgeError> {
        Python::attach(|py| {
            import(py, "sys")?
                .getattr("version")
                .and_then(|v| v.extract::<String>())
                .or_translate(py, "sys.version")
        })
    }

    /// Current `sys.path` entries.
    pub fn sys_path(&self) -> Result<Vec<String>, BridgeError> {
        Python::attach(|py| {
            import(py, "sys")?
                .getattr("path")
                .and_then(|p| p.extract::<Vec<String>>())
                .or_translate(py, "sys.path")
        })
    }
}

pub(crate) fn import<'py>(py: Python<'py>, name: &str) -> Result<Bound<'py, PyModule>, BridgeError> {
    PyModule::import(py, name).or_translate(py, &format!("import '{}'", name))
}

fn source_cstring(context: &str, source: &str) -> Result<CString, BridgeError> {
    CString::new(source).map_err(|e| {
        BridgeError::Interpreter(InterpreterError::host(
            context,
            "ValueError",
            format!("source code contains a null byte at offset {}", e.nul_position()),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_nul_in_source_is_rejected_before_the_interpreter() {
        let err = source_cstring("eval", "1\0 + 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Interpreter);
        let detail = err.interpreter_error().unwrap();
        assert_eq!(detail.type_name(), Some("ValueError"));
        assert!(detail.message().contains("offset 1"));
    }
}
