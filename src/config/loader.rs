//! Configuration loading from disk.
//!
//! `dispatch.toml` is read first; an optional sibling `dispatch.local.toml`
//! is merged over it table by table, so a local file only needs the keys it
//! overrides.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Value;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, merge and validate configuration rooted at `path`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut merged = read_table(path)?;

    let local = local_path(path);
    if local.exists() {
        let overrides = read_table(&local)?;
        merge(&mut merged, overrides);
        tracing::info!(path = ?local, "Local configuration overrides applied");
    }

    let config: AppConfig = merged.try_into().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse and validate a configuration document held in memory.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    })?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_table(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `config/dispatch.toml` → `config/dispatch.local.toml`.
fn local_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("config");
    path.with_file_name(format!("{stem}.local.toml"))
}

/// Tables merge recursively; any other value in `overrides` replaces the
/// base value, arrays included.
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Table(base), Value::Table(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}
