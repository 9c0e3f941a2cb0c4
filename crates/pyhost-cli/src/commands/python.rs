//! Commands that talk to the embedded interpreter

use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use pyhost_python::{Interpreter, PyProxy};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct StatusReport {
    pub state: String,
    pub provider: String,
    pub version: String,
    pub sys_path: Vec<String>,
    pub log_file: Option<String>,
}

/// Start the interpreter with the provider selected by `opts`.
///
/// Returns the interpreter and the name of the provider that configured it.
pub fn start_python(opts: &GlobalOpts) -> Result<(&'static Interpreter, String), CliError> {
    let provider = opts.provider()?;
    logger::spinner_start("Starting Python...");
    match pyhost_python::start(provider.as_ref()) {
        Ok(()) => logger::spinner_success("Python started"),
        Err(e) => {
            logger::spinner_error("Python failed to start");
            return Err(e.into());
        }
    }
    Ok((pyhost_python::instance()?, provider.name().to_string()))
}

pub fn handle_status(json: bool, opts: &GlobalOpts) -> Result<(), CliError> {
    let (python, provider) = start_python(opts)?;
    let report = StatusReport {
        state: format!("{:?}", pyhost_python::state()),
        provider,
        version: python.version()?,
        sys_path: python.sys_path()?,
        log_file: logger::get_log_path().map(|p| p.to_string_lossy().into_owned()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("state: {}", report.state);
    println!("provider: {}", report.provider);
    println!("version: {}", report.version.lines().next().unwrap_or_default());
    println!("sys.path:");
    for entry in &report.sys_path {
        println!("  {}", entry);
    }
    if let Some(ref log_file) = report.log_file {
        println!("log: {}", log_file);
    }
    Ok(())
}

pub fn handle_import(module: &str, attr: Option<&str>, opts: &GlobalOpts) -> Result<(), CliError> {
    let (python, _) = start_python(opts)?;
    logger::debug(&format!("Resolving module {}", module));
    let resolved = python.get_module(module)?;
    print_proxy(&resolved, attr)
}

pub fn handle_builtins(name: Option<&str>, opts: &GlobalOpts) -> Result<(), CliError> {
    let (python, _) = start_python(opts)?;
    print_proxy(&python.get_builtins()?, name)
}

pub fn handle_eval(expr: &str, opts: &GlobalOpts) -> Result<(), CliError> {
    let (python, _) = start_python(opts)?;
    let value = python.eval(expr)?;
    println!("{}", value.repr()?);
    Ok(())
}

fn print_proxy(base: &PyProxy, attr: Option<&str>) -> Result<(), CliError> {
    let target = match attr {
        Some(path) => base.get_attr_path(path)?,
        None => base.clone(),
    };
    println!("{}", target.repr()?);
    Ok(())
}
