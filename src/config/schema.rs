use crate::buffer::DEFAULT_CHUNK_SIZE;
use crate::grammar;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Upper bound on `parser.chunk_size`.
pub const MAX_CHUNK_SIZE: usize = 1 << 20;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub parser: ParserSettings,
    #[serde(default)]
    pub grammars: GrammarSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.parser.chunk_size == 0 || self.parser.chunk_size > MAX_CHUNK_SIZE {
            issues.push(ValidationIssue::OutOfRange {
                field: "parser.chunk_size",
                message: format!(
                    "{} is not within 1..={MAX_CHUNK_SIZE}",
                    self.parser.chunk_size
                ),
            });
        }

        let registry = grammar::registry();
        for (alias, target) in &self.grammars.aliases {
            if registry.contains(alias) {
                issues.push(ValidationIssue::InvalidAlias {
                    alias: alias.clone(),
                    message: "shadows a built-in grammar".to_string(),
                });
            }
            if !registry.contains(target) {
                issues.push(ValidationIssue::InvalidAlias {
                    alias: alias.clone(),
                    message: format!("targets unknown grammar '{target}'"),
                });
            }
        }

        if self.log.level().is_none() {
            issues.push(ValidationIssue::OutOfRange {
                field: "log.level",
                message: format!("unknown level '{}'", self.log.level),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParserSettings {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GrammarSettings {
    /// Extra names for built-in grammars, e.g. `js = "javascript"`.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LogSettings {
    pub fn level(&self) -> Option<tracing::Level> {
        tracing::Level::from_str(&self.level).ok()
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A starting text and the edits to replay over it, in order.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    pub grammar: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub edits: Vec<ScriptEdit>,
}

/// Replace bytes `start..end` of the current text with `text`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScriptEdit {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub text: String,
}

impl ReplayScript {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.grammar.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                context: None,
                field: "grammar",
            });
        }

        // Each edit is checked against the text produced by the ones before it.
        let mut current = self.text.clone();
        for (index, edit) in self.edits.iter().enumerate() {
            let problem = if edit.start > edit.end {
                Some(format!("start {} is after end {}", edit.start, edit.end))
            } else if edit.end > current.len() {
                Some(format!(
                    "end {} is past the end of the text ({} bytes)",
                    edit.end,
                    current.len()
                ))
            } else if !current.is_char_boundary(edit.start) || !current.is_char_boundary(edit.end) {
                Some("range splits a character".to_string())
            } else {
                None
            };

            match problem {
                Some(message) => {
                    issues.push(ValidationIssue::InvalidEdit { index, message });
                    break;
                }
                None => current.replace_range(edit.start..edit.end, &edit.text),
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField {
        context: Option<String>,
        field: &'static str,
    },
    OutOfRange {
        field: &'static str,
        message: String,
    },
    InvalidAlias {
        alias: String,
        message: String,
    },
    InvalidEdit {
        index: usize,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { context, field } => match context {
                Some(ctx) => write!(f, "{ctx} missing required field '{field}'"),
                None => write!(f, "missing required field '{field}'"),
            },
            ValidationIssue::OutOfRange { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
            ValidationIssue::InvalidAlias { alias, message } => {
                write!(f, "grammar alias '{alias}' {message}")
            }
            ValidationIssue::InvalidEdit { index, message } => {
                write!(f, "edit #{index} is invalid: {message}")
            }
        }
    }
}
