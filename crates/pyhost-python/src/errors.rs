//! Error translation across the interpreter boundary
//!
//! Every failure surfaced by this crate is a [`BridgeError`]. Lifecycle misuse
//! is reported with its own variants and never mixed up with failures raised
//! inside the interpreter, which always arrive as [`InterpreterError`].
//! [`translate`] is the only place a `PyErr` is converted.

use pyhost_config::ConfigError;
use pyo3::prelude::*;
use pyo3::types::PyTracebackMethods;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Python already started")]
    AlreadyStarted,

    #[error("Python startup previously failed, and cannot be retried")]
    StartupPreviouslyFailed,

    #[error("{0}")]
    Interpreter(#[from] InterpreterError),

    #[error("Failed to resolve startup configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of a [`BridgeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyStarted,
    StartupPreviouslyFailed,
    Interpreter,
    Configuration,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::AlreadyStarted => ErrorKind::AlreadyStarted,
            BridgeError::StartupPreviouslyFailed => ErrorKind::StartupPreviouslyFailed,
            BridgeError::Interpreter(_) => ErrorKind::Interpreter,
            BridgeError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// True for errors caused by calling the lifecycle API out of order.
    pub fn is_lifecycle_misuse(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AlreadyStarted | ErrorKind::StartupPreviouslyFailed
        )
    }

    /// The interpreter's diagnostic payload, if this error came from it.
    pub fn interpreter_error(&self) -> Option<&InterpreterError> {
        match self {
            BridgeError::Interpreter(err) => Some(err),
            _ => None,
        }
    }
}

/// A failure raised inside the embedded interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterError {
    context: Option<String>,
    type_name: Option<String>,
    message: String,
    traceback: Option<String>,
}

impl InterpreterError {
    /// An error detected on the host side before the interpreter could be
    /// asked, reported with the exception type the interpreter would use.
    pub(crate) fn host(context: &str, type_name: &str, message: impl Into<String>) -> Self {
        Self {
            context: Some(context.to_string()),
            type_name: Some(type_name.to_string()),
            message: message.into(),
            traceback: None,
        }
    }

    /// The boundary operation that failed, e.g. `import 'json'`.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// The exception's class name, e.g. `ModuleNotFoundError`.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Formatted traceback, when the exception carried one.
    pub fn traceback(&self) -> Option<&str> {
        self.traceback.as_deref()
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref context) = self.context {
            write!(f, "{}: ", context)?;
        }
        match self.type_name {
            Some(ref type_name) => write!(f, "{}: {}", type_name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for InterpreterError {}

/// Convert an interpreter exception into a [`BridgeError`].
///
/// Must be called with the interpreter lock held; the exception's type name,
/// message and traceback are captured eagerly so the result no longer
/// references interpreter objects.
pub(crate) fn translate(py: Python<'_>, err: PyErr, context: &str) -> BridgeError {
    let type_name = err
        .get_type(py)
        .name()
        .and_then(|name| name.extract::<String>())
        .ok();
    let message = err
        .value(py)
        .str()
        .and_then(|s| s.extract::<String>())
        .unwrap_or_else(|_| "<exception str() failed>".to_string());
    let traceback = err.traceback(py).and_then(|tb| tb.format().ok());

    BridgeError::Interpreter(InterpreterError {
        context: Some(context.to_string()),
        type_name,
        message,
        traceback,
    })
}

/// Attach the single translation point to `PyResult`.
pub(crate) trait Translate<T> {
    fn or_translate(self, py: Python<'_>, context: &str) -> Result<T, BridgeError>;
}

impl<T> Translate<T> for PyResult<T> {
    fn or_translate(self, py: Python<'_>, context: &str) -> Result<T, BridgeError> {
        self.map_err(|err| translate(py, err, context))
    }
}
