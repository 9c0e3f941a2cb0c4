//! Configuration providers
//!
//! A provider is consulted once, at interpreter start. Its output is frozen into
//! a [`Configuration`] that is handed to the native startup routine and then
//! dropped.

use crate::config::Config;
use crate::errors::ConfigError;
use crate::venv_paths::resolve_site_packages;
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable read by [`EnvProvider`].
pub const PYTHONPATH_VAR: &str = "PYTHONPATH";

/// Supplies the parameters needed to start the embedded interpreter.
pub trait ConfigProvider: Send + Sync {
    /// The module search path, as a platform path list (`:` or `;` separated).
    fn search_path(&self) -> Result<String, ConfigError>;

    /// Whether interpreter `stdout`/`stderr` should be routed to the host log.
    fn redirect_output(&self) -> bool {
        false
    }

    /// Short name used in log messages.
    fn name(&self) -> &str;
}

/// Immutable startup parameters resolved from a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    search_path: String,
    redirect_output: bool,
}

impl Configuration {
    /// Evaluate `provider` exactly once and freeze the result.
    pub fn from_provider(provider: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let search_path = provider.search_path()?;
        info!(
            "Resolved search path from {} provider: {:?}",
            provider.name(),
            search_path
        );
        Ok(Self {
            search_path,
            redirect_output: provider.redirect_output(),
        })
    }

    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    /// The search path split into its entries, skipping empty segments.
    pub fn entries(&self) -> Vec<PathBuf> {
        env::split_paths(&self.search_path)
            .filter(|p| !p.as_os_str().is_empty())
            .collect()
    }

    pub fn redirect_output(&self) -> bool {
        self.redirect_output
    }
}

/// Default provider: the search path is the process's `PYTHONPATH`, or empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProvider;

impl ConfigProvider for EnvProvider {
    fn search_path(&self) -> Result<String, ConfigError> {
        match env::var_os(PYTHONPATH_VAR) {
            Some(value) => value.into_string().map_err(|_| {
                ConfigError::Provider(format!("{} is not valid Unicode", PYTHONPATH_VAR))
            }),
            None => Ok(String::new()),
        }
    }

    fn name(&self) -> &str {
        "env"
    }
}

/// Provider with a fixed search path
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    search_path: String,
    redirect_output: bool,
}

impl StaticProvider {
    pub fn new(search_path: impl Into<String>) -> Self {
        Self {
            search_path: search_path.into(),
            redirect_output: false,
        }
    }

    /// Build the search path by joining `entries` with the platform separator.
    pub fn from_entries<I, P>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Ok(Self::new(join_entries(entries.into_iter().map(Into::into))?))
    }

    pub fn with_redirect_output(mut self, redirect_output: bool) -> Self {
        self.redirect_output = redirect_output;
        self
    }
}

impl ConfigProvider for StaticProvider {
    fn search_path(&self) -> Result<String, ConfigError> {
        Ok(self.search_path.clone())
    }

    fn redirect_output(&self) -> bool {
        self.redirect_output
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Provider backed by the persisted [`Config`] file
///
/// The search path is the configured `search-path` entries followed by the
/// `site-packages` directory of `venv-path`, when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    config: Config,
}

impl FileProvider {
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::from_config(Config::load()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ConfigProvider for FileProvider {
    fn search_path(&self) -> Result<String, ConfigError> {
        let mut entries: Vec<PathBuf> = self
            .config
            .search_path
            .iter()
            .flatten()
            .map(PathBuf::from)
            .collect();

        if let Some(ref venv) = self.config.venv_path {
            let site_packages = resolve_site_packages(&PathBuf::from(venv))?;
            debug!("Adding venv site-packages {}", site_packages.display());
            entries.push(site_packages);
        }

        join_entries(entries)
    }

    fn redirect_output(&self) -> bool {
        self.config.redirect_output.unwrap_or(false)
    }

    fn name(&self) -> &str {
        "file"
    }
}

fn join_entries<I: IntoIterator<Item = PathBuf>>(entries: I) -> Result<String, ConfigError> {
    let joined = env::join_paths(entries)
        .map_err(|e| ConfigError::PathResolution(format!("Invalid search path entry: {}", e)))?;
    joined
        .into_string()
        .map_err(|_| ConfigError::PathResolution("Search path is not valid Unicode".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl ConfigProvider for CountingProvider {
        fn search_path(&self) -> Result<String, ConfigError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("/srv/app".to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_configuration_evaluates_provider_once() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let config = Configuration::from_provider(&provider).unwrap();
        assert_eq!(config.search_path(), "/srv/app");
        assert_eq!(config.search_path(), "/srv/app");
        assert!(!config.redirect_output());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_entries_skip_empty_segments() {
        let joined = env::join_paths(["/a", "", "/b"]).unwrap();
        let provider = StaticProvider::new(joined.into_string().unwrap());
        let config = Configuration::from_provider(&provider).unwrap();
        assert_eq!(
            config.entries(),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_empty_search_path_has_no_entries() {
        let config = Configuration::from_provider(&StaticProvider::new("")).unwrap();
        assert!(config.entries().is_empty());
    }

    #[test]
    fn test_static_provider_from_entries() {
        let provider = StaticProvider::from_entries(["/x", "/y"])
            .unwrap()
            .with_redirect_output(true);
        let config = Configuration::from_provider(&provider).unwrap();
        assert_eq!(config.entries().len(), 2);
        assert!(config.redirect_output());
    }

    #[test]
    fn test_env_provider_reads_pythonpath() {
        env::set_var(PYTHONPATH_VAR, "/from/env");
        assert_eq!(EnvProvider.search_path().unwrap(), "/from/env");
        env::remove_var(PYTHONPATH_VAR);
        assert_eq!(EnvProvider.search_path().unwrap(), "");
    }

    #[test]
    #[cfg(not(windows))]
    fn test_file_provider_appends_site_packages() {
        let venv = TempDir::new().unwrap();
        let site = venv.path().join("lib/python3.12/site-packages");
        std::fs::create_dir_all(&site).unwrap();

        let config = Config {
            search_path: Some(vec!["/opt/app".to_string()]),
            venv_path: Some(venv.path().to_string_lossy().into_owned()),
            redirect_output: Some(true),
            log_file: None,
        };
        let provider = FileProvider::from_config(config);
        let resolved = Configuration::from_provider(&provider).unwrap();
        assert_eq!(
            resolved.entries(),
            vec![PathBuf::from("/opt/app"), site]
        );
        assert!(resolved.redirect_output());
    }

    #[test]
    fn test_file_provider_missing_venv_fails() {
        let config = Config {
            venv_path: Some("/tmp/definitely_missing_pyhost_venv".to_string()),
            ..Config::default()
        };
        let err = FileProvider::from_config(config).search_path().unwrap_err();
        assert!(matches!(err, ConfigError::VenvNotFound(_)));
    }
}
