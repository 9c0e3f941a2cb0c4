use clap::Args;
use pyhost_config::{
    Config, ConfigError, ConfigProvider, EnvProvider, FileProvider, StaticProvider,
};

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Module search path to start Python with (overrides PYTHONPATH and the config file)"
    )]
    pub search_path: Option<String>,

    #[arg(
        long,
        global = true,
        conflicts_with = "search_path",
        help = "Start Python with the search path from the config file"
    )]
    pub use_config: bool,

    #[arg(
        long,
        global = true,
        help = "Route Python stdout/stderr into the log"
    )]
    pub redirect_output: bool,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Pick the configuration provider these options ask for.
    pub fn provider(&self) -> Result<Box<dyn ConfigProvider>, ConfigError> {
        if let Some(ref path) = self.search_path {
            return Ok(Box::new(
                StaticProvider::new(path.clone()).with_redirect_output(self.redirect_output),
            ));
        }
        if self.use_config {
            return Ok(Box::new(self.file_provider(Config::load()?)));
        }
        if self.redirect_output {
            return Ok(Box::new(
                StaticProvider::new(EnvProvider.search_path()?).with_redirect_output(true),
            ));
        }
        Ok(Box::new(EnvProvider))
    }

    /// `--redirect-output` turns redirection on even when the file leaves it off.
    fn file_provider(&self, mut config: Config) -> FileProvider {
        if self.redirect_output {
            config.redirect_output = Some(true);
        }
        FileProvider::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
            ..GlobalOpts::default()
        };
        assert_eq!(opts.verbosity_level(), 0);
    }

    #[test]
    fn test_explicit_search_path_wins() {
        let opts = GlobalOpts {
            search_path: Some("/srv/py".to_string()),
            redirect_output: true,
            ..GlobalOpts::default()
        };
        let provider = opts.provider().unwrap();
        assert_eq!(provider.name(), "static");
        assert_eq!(provider.search_path().unwrap(), "/srv/py");
        assert!(provider.redirect_output());
    }

    #[test]
    fn test_redirect_flag_applies_to_config_file() {
        let opts = GlobalOpts {
            use_config: true,
            redirect_output: true,
            ..GlobalOpts::default()
        };
        let config = Config {
            redirect_output: Some(false),
            ..Config::default()
        };
        let provider = opts.file_provider(config);
        assert_eq!(provider.name(), "file");
        assert!(provider.redirect_output());

        let from_file = Config {
            redirect_output: Some(true),
            ..Config::default()
        };
        assert!(GlobalOpts::default()
            .file_provider(from_file)
            .redirect_output());
    }

    #[test]
    fn test_default_is_env_provider() {
        let provider = GlobalOpts::default().provider().unwrap();
        assert_eq!(provider.name(), "env");
        assert!(!provider.redirect_output());
    }
}
