//! Boundary layer between the host process and an embedded Python interpreter
//!
//! This crate provides:
//! 1. A lifecycle manager that starts the interpreter at most once per process
//! 2. [`PyProxy`], an opaque handle to a value living inside the interpreter
//! 3. Module resolution through the [`Interpreter`] singleton
//! 4. A single error type, [`BridgeError`], for everything crossing the boundary
//!
//! ```no_run
//! use pyhost_config::StaticProvider;
//!
//! pyhost_python::start(&StaticProvider::new("/opt/app/python"))?;
//! let python = pyhost_python::instance()?;
//! let json = python.get_module("json")?;
//! let dumped = json.call_method("dumps", &[&python.eval("[1, 2]")?])?;
//! assert_eq!(dumped.extract_string()?, "[1, 2]");
//! # Ok::<(), pyhost_python::BridgeError>(())
//! ```

pub mod errors;
mod interpreter;
mod lifecycle;
mod object;
mod startup;
mod stream;

pub use errors::{BridgeError, ErrorKind, InterpreterError};
pub use interpreter::{Interpreter, BUILTINS_MODULE};
pub use lifecycle::{global, instance, is_started, start, state, Lifecycle, Startup, StartupState};
pub use object::PyProxy;
pub use startup::EmbeddedStartup;
pub use stream::MAX_LINE_LEN;
