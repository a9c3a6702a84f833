use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fxconfig::FxConfig;

use crate::paths::AppPaths;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Loads the configuration. An explicit path must exist; the default file in
/// the config directory is optional and falls back to built-in defaults.
pub fn load(explicit: Option<&Path>, paths: &AppPaths) -> Result<(FxConfig, ConfigSource)> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (paths.config_file(), false),
    };

    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file; using defaults");
        return Ok((FxConfig::default(), ConfigSource::Defaults));
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let config = FxConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to load configuration {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok((config, ConfigSource::File(path)))
}
