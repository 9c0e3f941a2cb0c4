//! pyhost command-line library - exposed for testing

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
pub use pyhost_logger as logger;
