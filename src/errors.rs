use thiserror::Error;

/// Errors signalled to the caller of a single exposed operation.
///
/// None of these leave the ownership graph half-updated: every check runs
/// before the first wrap or retain.
#[derive(Error, Debug)]
pub enum YeastError {
    #[error("unknown grammar `{tag}`{}", suggestion_suffix(.suggestion))]
    UnknownGrammar {
        tag: String,
        suggestion: Option<&'static str>,
    },

    #[error("wrong type argument: expected {expected}, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: String,
    },

    #[error("instance has no tree")]
    NoTree,

    #[error("invalid edit: beg={beg} end={end} len={len}")]
    InvalidEdit { beg: i64, end: i64, len: i64 },

    #[error("handle is stale, foreign or already finalized")]
    InvalidHandle,

    #[error("wrong number of arguments to {name}: {given}")]
    WrongArity { name: &'static str, given: usize },

    #[error("void function: {name}")]
    UnknownFunction { name: String },

    #[error("failed to set language for parser: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl YeastError {
    /// Error symbol the host binding layer signals for this error.
    pub fn symbol(&self) -> &'static str {
        match self {
            YeastError::UnknownGrammar { .. } => "yeast-unknown-language",
            YeastError::WrongType { .. } => "wrong-type-argument",
            YeastError::NoTree => "yeast-no-tree",
            YeastError::InvalidEdit { .. } => "args-out-of-range",
            YeastError::InvalidHandle => "yeast-invalid-handle",
            YeastError::WrongArity { .. } => "wrong-number-of-arguments",
            YeastError::UnknownFunction { .. } => "void-function",
            YeastError::Language(_) => "yeast-language-error",
        }
    }
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(tag) => format!(" (did you mean `{tag}`?)"),
        None => String::new(),
    }
}

pub type Result<T, E = YeastError> = std::result::Result<T, E>;
