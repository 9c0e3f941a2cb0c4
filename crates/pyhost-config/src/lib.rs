//! Startup configuration for the embedded interpreter
//!
//! A [`ConfigProvider`] supplies the module search path (and a few other
//! startup switches) exactly once, when the interpreter is started. The
//! persisted [`Config`] file backs [`FileProvider`] and the CLI's `config`
//! command.

mod config;
pub mod errors;
mod provider;
pub mod venv_paths;

pub use config::{Config, CONFIG_ENV_VAR, CONFIG_KEYS};
pub use errors::ConfigError;
pub use provider::{
    ConfigProvider, Configuration, EnvProvider, FileProvider, StaticProvider, PYTHONPATH_VAR,
};
