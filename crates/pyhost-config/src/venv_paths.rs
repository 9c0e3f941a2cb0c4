//! Locating `site-packages` inside a Python virtual environment
//!
//! [`crate::FileProvider`] appends the venv's `site-packages` directory to the
//! search path so packages installed there are importable by the embedded
//! interpreter.

use crate::errors::ConfigError;
#[cfg(not(windows))]
use std::fs;
use std::path::{Path, PathBuf};

/// "Lib" on Windows, "lib" on Unix
#[cfg(windows)]
pub const PYTHON_LIB_DIR: &str = "Lib";
#[cfg(not(windows))]
pub const PYTHON_LIB_DIR: &str = "lib";

pub const SITE_PACKAGES: &str = "site-packages";

/// Resolve the site-packages path for a virtual environment
///
/// - **Unix/macOS**: `<venv>/lib/python3.X/site-packages`
/// - **Windows**: `<venv>/Lib/site-packages`
pub fn resolve_site_packages(venv_path: &Path) -> Result<PathBuf, ConfigError> {
    if !venv_path.is_dir() {
        return Err(ConfigError::VenvNotFound(venv_path.to_path_buf()));
    }

    let lib_dir = venv_path.join(PYTHON_LIB_DIR);
    if !lib_dir.is_dir() {
        return Err(ConfigError::PathResolution(format!(
            "lib directory not found: {}",
            lib_dir.display()
        )));
    }

    #[cfg(windows)]
    let site_packages = lib_dir.join(SITE_PACKAGES);

    #[cfg(not(windows))]
    let site_packages = {
        // Several python3.X directories can exist after an upgrade; pick the highest version.
        fs::read_dir(&lib_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let version = python_dir_version(&e.file_name().to_string_lossy())?;
                Some((version, e.path()))
            })
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, path)| path)
            .ok_or_else(|| {
                ConfigError::PathResolution(format!(
                    "No python3.X directory found in {}",
                    lib_dir.display()
                ))
            })?
            .join(SITE_PACKAGES)
    };

    if !site_packages.is_dir() {
        return Err(ConfigError::PathResolution(format!(
            "site-packages not found: {}",
            site_packages.display()
        )));
    }

    Ok(site_packages)
}

/// Parse `python3.12` into `[3, 12]`; `None` for anything else.
#[cfg(not(windows))]
fn python_dir_version(name: &str) -> Option<Vec<u32>> {
    let version = name.strip_prefix("python")?;
    if version.is_empty() {
        return None;
    }
    version
        .split('.')
        .map(|part| part.parse::<u32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(not(windows))]
    fn create_mock_venv(python_dirs: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for dir in python_dirs {
            fs::create_dir_all(temp_dir.path().join("lib").join(dir).join(SITE_PACKAGES)).unwrap();
        }
        temp_dir
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_unix() {
        let venv = create_mock_venv(&["python3.12"]);
        let path = resolve_site_packages(venv.path()).unwrap();
        assert!(path.ends_with("lib/python3.12/site-packages"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_prefers_newest() {
        let venv = create_mock_venv(&["python3.11", "python3.12"]);
        let path = resolve_site_packages(venv.path()).unwrap();
        assert!(path.ends_with("lib/python3.12/site-packages"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_compares_versions_numerically() {
        let venv = create_mock_venv(&["python3.9", "python3.12"]);
        let path = resolve_site_packages(venv.path()).unwrap();
        assert!(path.ends_with("lib/python3.12/site-packages"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_python_dir_version() {
        assert_eq!(python_dir_version("python3.12"), Some(vec![3, 12]));
        assert_eq!(python_dir_version("python3"), Some(vec![3]));
        assert!(python_dir_version("python").is_none());
        assert!(python_dir_version("pythonista").is_none());
    }

    #[test]
    fn test_missing_lib_dir() {
        let venv = TempDir::new().unwrap();
        let result = resolve_site_packages(venv.path());
        assert!(matches!(result, Err(ConfigError::PathResolution(_))));
    }

    #[test]
    fn test_venv_not_found() {
        let non_existent = PathBuf::from("/tmp/non_existent_venv_pyhost_12345");
        let result = resolve_site_packages(&non_existent);
        assert!(matches!(result, Err(ConfigError::VenvNotFound(_))));
    }
}
