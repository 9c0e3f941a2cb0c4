use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use pyhost_config::{Config, ConfigError, CONFIG_KEYS};
use std::fs;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the stored configuration
    Show,
    /// Set a configuration value (search-path takes a comma-separated list)
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, later runs read the config from that file.
    /// If omitted, print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(opts),
        ConfigAction::Set { key, value } => set(&key, &value),
        ConfigAction::Path { new_path } => path(new_path),
    }
}

fn show(opts: &GlobalOpts) -> Result<(), CliError> {
    let config = Config::load()?;
    println!("{}", "Configuration:".bold().green());
    if config.is_empty() {
        if opts.verbosity_level() > 0 {
            println!("  {}", "(empty)".yellow());
        }
    } else {
        for (key, value) in config.values_iter() {
            println!("  {}: {}", key.cyan(), value);
        }
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<(), CliError> {
    let mut config = Config::load()?;
    if let Err(e) = config.set(key, value) {
        if matches!(e, ConfigError::UnknownKey(_)) {
            logger::warn(&format!("Supported keys: {}", CONFIG_KEYS.join(", ")));
        }
        return Err(e.into());
    }
    config.save()?;
    logger::success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn path(new_path: Option<String>) -> Result<(), CliError> {
    let config_path = Config::path()?;
    logger::debug(&format!("Reading config from: {}", config_path.display()));

    let Some(pointer_path) = Config::pointer_path()? else {
        println!("{}", config_path.display());
        return Ok(());
    };

    match new_path {
        Some(p) => {
            if let Some(parent) = pointer_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&pointer_path, p.as_bytes())?;
            logger::success(&format!("Config path set to {}", p));
        }
        None => {
            println!("{}", config_path.display());
            if let Ok(contents) = fs::read_to_string(&pointer_path) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    println!("{} {}", "overridden-by".cyan(), trimmed);
                }
            }
        }
    }
    Ok(())
}
