use crate::config::schema::{ReplayScript, Settings, ValidationError};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "YEAST_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(f, "failed to parse TOML ({}): {}", path.display(), source),
                None => write!(f, "failed to parse TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid configuration ({}): {}", path.display(), source),
                None => write!(f, "invalid configuration: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

fn parse<T: DeserializeOwned>(
    input: &str,
    validate: impl FnOnce(&T) -> Result<(), ValidationError>,
) -> Result<T, ConfigError> {
    let value: T =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { path: None, source })?;
    validate(&value).map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(value)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn settings_from_str(input: &str) -> Result<Settings, ConfigError> {
    parse(input, Settings::validate)
}

pub fn settings_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    settings_from_str(&read(path)?).map_err(|error| error.with_path(path))
}

/// Settings from `explicit`, else from `$YEAST_CONFIG`, else defaults.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return settings_from_path(path);
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => settings_from_path(PathBuf::from(path)),
        _ => Ok(Settings::default()),
    }
}

pub fn script_from_str(input: &str) -> Result<ReplayScript, ConfigError> {
    parse(input, ReplayScript::validate)
}

pub fn script_from_path(path: impl AsRef<Path>) -> Result<ReplayScript, ConfigError> {
    let path = path.as_ref();
    script_from_str(&read(path)?).map_err(|error| error.with_path(path))
}
