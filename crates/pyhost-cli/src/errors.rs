use pyhost_config::ConfigError;
use pyhost_python::BridgeError;
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Interpreter traceback attached to the error, if any.
    pub fn traceback(&self) -> Option<&str> {
        match self {
            CliError::Bridge(err) => err.interpreter_error().and_then(|e| e.traceback()),
            _ => None,
        }
    }
}
