//! Interpreter startup state machine
//!
//! ```text
//! NotStarted --start ok-----> Started   (terminal)
//! NotStarted --start error--> Failed    (terminal)
//! ```
//!
//! The native startup routine is unsafe to call twice in one process, even
//! after it failed, so neither terminal state can be left. There is no stop
//! operation: the interpreter lives until the process exits.
//!
//! All transitions and singleton creation happen under one mutex, separate
//! from the interpreter's own lock.

use crate::errors::BridgeError;
use crate::interpreter::Interpreter;
use crate::startup::EmbeddedStartup;
use once_cell::sync::{Lazy, OnceCell};
use pyhost_config::{ConfigProvider, Configuration, EnvProvider};
use pyhost_logger as logger;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    NotStarted,
    Started,
    Failed,
}

/// The native startup entry point.
///
/// Called at most once per [`Lifecycle`], with the configuration resolved from
/// the caller's provider.
pub trait Startup: Send + Sync {
    fn start(&self, config: &Configuration) -> Result<(), BridgeError>;
}

/// Startup state plus the lazily created [`Interpreter`] singleton
pub struct Lifecycle<S = EmbeddedStartup> {
    startup: S,
    state: Mutex<StartupState>,
    instance: OnceCell<Interpreter>,
}

static GLOBAL: Lazy<Lifecycle> = Lazy::new(|| Lifecycle::new(EmbeddedStartup));

/// The process-wide lifecycle for the embedded interpreter.
pub fn global() -> &'static Lifecycle {
    &GLOBAL
}

/// Start the interpreter with `provider`. See [`Lifecycle::start`].
pub fn start(provider: &dyn ConfigProvider) -> Result<(), BridgeError> {
    global().start(provider)
}

pub fn is_started() -> bool {
    global().is_started()
}

pub fn state() -> StartupState {
    global().state()
}

/// Get the interpreter, starting it with [`EnvProvider`] if needed.
/// See [`Lifecycle::instance`].
pub fn instance() -> Result<&'static Interpreter, BridgeError> {
    global().instance()
}

impl<S: Startup> Lifecycle<S> {
    pub fn new(startup: S) -> Self {
        Self {
            startup,
            state: Mutex::new(StartupState::NotStarted),
            instance: OnceCell::new(),
        }
    }

    /// Start the interpreter
    ///
    /// May succeed at most once. Fails with [`BridgeError::AlreadyStarted`]
    /// after a successful start, and with
    /// [`BridgeError::StartupPreviouslyFailed`] after a failed one; in both
    /// cases the native routine is not called again.
    ///
    /// The provider is evaluated exactly once. An error from the provider or
    /// the native routine moves the state to `Failed` and is returned as is; a
    /// panic moves it to `Failed` and is resumed.
    pub fn start(&self, provider: &dyn ConfigProvider) -> Result<(), BridgeError> {
        let mut state = self.lock_state();
        self.start_locked(&mut state, provider)
    }

    fn start_locked(
        &self,
        state: &mut StartupState,
        provider: &dyn ConfigProvider,
    ) -> Result<(), BridgeError> {
        match *state {
            StartupState::Started => return Err(BridgeError::AlreadyStarted),
            StartupState::Failed => return Err(BridgeError::StartupPreviouslyFailed),
            StartupState::NotStarted => {}
        }

        logger::debug(&format!(
            "Starting Python with the {} configuration provider",
            provider.name()
        ));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let config = Configuration::from_provider(provider)?;
            self.startup.start(&config)
        }));

        match outcome {
            Ok(Ok(())) => {
                *state = StartupState::Started;
                logger::info("Python started");
                Ok(())
            }
            Ok(Err(e)) => {
                *state = StartupState::Failed;
                logger::debug(&format!("Python startup failed: {}", e));
                Err(e)
            }
            Err(payload) => {
                *state = StartupState::Failed;
                logger::debug("Python startup panicked");
                panic::resume_unwind(payload)
            }
        }
    }

    /// Whether startup has succeeded. Never starts anything.
    pub fn is_started(&self) -> bool {
        self.state() == StartupState::Started
    }

    pub fn state(&self) -> StartupState {
        *self.lock_state()
    }

    /// Get the interpreter singleton
    ///
    /// When not yet started, starts with the default [`EnvProvider`] first.
    /// Concurrent callers block until the first one finishes, then all observe
    /// the same instance. After a failed startup this returns
    /// [`BridgeError::StartupPreviouslyFailed`].
    pub fn instance(&self) -> Result<&Interpreter, BridgeError> {
        if let Some(instance) = self.instance.get() {
            return Ok(instance);
        }

        let mut state = self.lock_state();
        if let Some(instance) = self.instance.get() {
            return Ok(instance);
        }
        if *state != StartupState::Started {
            self.start_locked(&mut state, &EnvProvider)?;
        }
        Ok(self.instance.get_or_init(Interpreter::new))
    }

    /// The state value is written only after the native call returns or
    /// unwinds, so a poisoned lock still holds a consistent state.
    fn lock_state(&self) -> MutexGuard<'_, StartupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
