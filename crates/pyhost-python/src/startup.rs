//! Native interpreter startup

use crate::errors::{BridgeError, Translate};
use crate::interpreter::{import, BUILTINS_MODULE};
use crate::lifecycle::{Startup, StartupState};
use crate::stream;
use pyhost_config::{Configuration, PYTHONPATH_VAR};
use pyhost_logger as logger;
use pyo3::prelude::*;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Outcome of the one native startup this process may perform.
static NATIVE_STATE: Mutex<StartupState> = Mutex::new(StartupState::NotStarted);

/// Starts the CPython interpreter linked into this process.
///
/// The native routine runs at most once per process, however many
/// `EmbeddedStartup` values or [`crate::Lifecycle`]s call it. Later calls
/// return [`BridgeError::AlreadyStarted`] or
/// [`BridgeError::StartupPreviouslyFailed`] without touching the interpreter.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedStartup;

impl Startup for EmbeddedStartup {
    fn start(&self, config: &Configuration) -> Result<(), BridgeError> {
        run_once(&NATIVE_STATE, || start_native(config))
    }
}

/// Run `native` only if `guard` has never run one before.
///
/// The guard is marked `Failed` before the call and `Started` only once it
/// returns `Ok`, so an error or a panic leaves it permanently failed.
fn run_once<F>(guard: &Mutex<StartupState>, native: F) -> Result<(), BridgeError>
where
    F: FnOnce() -> Result<(), BridgeError>,
{
    let mut state = guard.lock().unwrap_or_else(PoisonError::into_inner);
    match *state {
        StartupState::Started => return Err(BridgeError::AlreadyStarted),
        StartupState::Failed => return Err(BridgeError::StartupPreviouslyFailed),
        StartupState::NotStarted => {}
    }

    *state = StartupState::Failed;
    let outcome = panic::catch_unwind(AssertUnwindSafe(native));
    match outcome {
        Ok(Ok(())) => {
            *state = StartupState::Started;
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(payload) => {
            drop(state);
            panic::resume_unwind(payload)
        }
    }
}

fn start_native(config: &Configuration) -> Result<(), BridgeError> {
    let start_time = Instant::now();

    env::set_var(PYTHONPATH_VAR, config.search_path());
    logger::debug(&format!("Set {}={}", PYTHONPATH_VAR, config.search_path()));

    let init_start = Instant::now();
    Python::initialize();
    logger::debug(&format!(
        "Python::initialize took: {:?}",
        init_start.elapsed()
    ));

    Python::attach(|py| {
        prepend_search_path(py, config)?;
        import(py, BUILTINS_MODULE)?;
        if config.redirect_output() {
            stream::install(py).or_translate(py, "redirect output")?;
        }
        Ok::<(), BridgeError>(())
    })?;

    logger::debug(&format!(
        "Total interpreter startup took: {:?}",
        start_time.elapsed()
    ));
    Ok(())
}

/// Put search entries at the front of `sys.path`, in order.
///
/// `PYTHONPATH` already covers a fresh interpreter; this also covers one that
/// was initialized before the environment variable was set.
fn prepend_search_path(py: Python<'_>, config: &Configuration) -> Result<(), BridgeError> {
    let sys_path = import(py, "sys")?
        .getattr("path")
        .or_translate(py, "sys.path")?;

    let mut index = 0usize;
    for entry in config.entries() {
        let entry = entry.to_string_lossy().into_owned();
        let present = sys_path
            .contains(entry.as_str())
            .or_translate(py, "sys.path")?;
        if !present {
            sys_path
                .call_method1("insert", (index, entry.as_str()))
                .or_translate(py, "sys.path.insert")?;
            logger::debug(&format!("Added {} to sys.path", entry));
            index += 1;
        }
    }
    Ok(())
}
