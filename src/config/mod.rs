//! TOML settings and edit replay scripts.

pub mod loader;
pub mod schema;

pub use loader::{
    resolve_settings, script_from_path, script_from_str, settings_from_path, settings_from_str,
    ConfigError, CONFIG_ENV,
};
pub use schema::{
    GrammarSettings, LogSettings, ParserSettings, ReplayScript, ScriptEdit, Settings,
    ValidationError, ValidationIssue, MAX_CHUNK_SIZE,
};
