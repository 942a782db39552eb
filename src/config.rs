use crate::paths;
use anyhow::{Context, Result};
use reconciler::ReconcilerConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Effective reconciler configuration and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ReconcilerConfig,
    /// File the config was read from; `None` when defaults are in use
    pub source: Option<PathBuf>,
}

/// Load the reconciler config, from `explicit` if given, else the config dir.
///
/// A missing default config file means defaults; a missing explicit file is
/// an error.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            config: load_from(path)?,
            source: Some(path.to_path_buf()),
        });
    }

    let path = paths::config_file()?;
    if !path.exists() {
        log::debug!("No config at {}; using defaults", path.display());
        return Ok(LoadedConfig {
            config: ReconcilerConfig::default(),
            source: None,
        });
    }
    Ok(LoadedConfig {
        config: load_from(&path)?,
        source: Some(path),
    })
}

/// Parse a TOML config file.
pub fn load_from(path: &Path) -> Result<ReconcilerConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Render a config as TOML.
pub fn to_toml(config: &ReconcilerConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Could not serialize config")
}
