//! Compiled-in grammars.
//!
//! We use the grammars bundled with ast-grep-language instead of linking
//! each tree-sitter grammar crate ourselves. The registry is built once by
//! [`init`] and is read-only afterwards.

use crate::errors::{Result, YeastError};
use ast_grep_language::{LanguageExt, SupportLang};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use tree_sitter::Language;

/// Similarity threshold above which an unknown tag gets a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A grammar compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grammar {
    tag: &'static str,
    lang: SupportLang,
    extensions: &'static [&'static str],
}

impl Grammar {
    /// Host-visible tag, e.g. `json`.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// The engine language for this grammar.
    pub fn language(&self) -> Language {
        self.lang.get_ts_language()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag)
    }
}

const GRAMMARS: &[Grammar] = &[
    Grammar { tag: "bash", lang: SupportLang::Bash, extensions: &["sh", "bash"] },
    Grammar { tag: "c", lang: SupportLang::C, extensions: &["c", "h"] },
    Grammar { tag: "cpp", lang: SupportLang::Cpp, extensions: &["cc", "cpp", "cxx", "hh", "hpp"] },
    Grammar { tag: "css", lang: SupportLang::Css, extensions: &["css"] },
    Grammar { tag: "go", lang: SupportLang::Go, extensions: &["go"] },
    Grammar { tag: "html", lang: SupportLang::Html, extensions: &["html", "htm"] },
    Grammar { tag: "javascript", lang: SupportLang::JavaScript, extensions: &["js", "mjs", "cjs", "jsx"] },
    Grammar { tag: "json", lang: SupportLang::Json, extensions: &["json"] },
    Grammar { tag: "php", lang: SupportLang::Php, extensions: &["php"] },
    Grammar { tag: "python", lang: SupportLang::Python, extensions: &["py"] },
    Grammar { tag: "ruby", lang: SupportLang::Ruby, extensions: &["rb"] },
    Grammar { tag: "rust", lang: SupportLang::Rust, extensions: &["rs"] },
    Grammar { tag: "typescript", lang: SupportLang::TypeScript, extensions: &["ts"] },
    Grammar { tag: "tsx", lang: SupportLang::Tsx, extensions: &["tsx"] },
];

/// Process-wide lookup tables over [`GRAMMARS`].
#[derive(Debug)]
pub struct Registry {
    by_tag: HashMap<&'static str, Grammar>,
    by_extension: HashMap<&'static str, Grammar>,
}

impl Registry {
    fn build() -> Self {
        let mut by_tag = HashMap::with_capacity(GRAMMARS.len());
        let mut by_extension = HashMap::new();
        for grammar in GRAMMARS {
            by_tag.insert(grammar.tag, *grammar);
            for ext in grammar.extensions {
                by_extension.insert(*ext, *grammar);
            }
        }
        Self {
            by_tag,
            by_extension,
        }
    }

    /// Look up a grammar by tag.
    pub fn lookup(&self, tag: &str) -> Result<Grammar> {
        self.by_tag
            .get(tag)
            .copied()
            .ok_or_else(|| YeastError::UnknownGrammar {
                tag: tag.to_string(),
                suggestion: self.suggest(tag),
            })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Grammar for a file, chosen by extension.
    pub fn for_path(&self, path: &Path) -> Option<Grammar> {
        let ext = path.extension()?.to_str()?;
        self.by_extension.get(ext).copied()
    }

    /// All grammars in tag order.
    pub fn grammars(&self) -> &'static [Grammar] {
        GRAMMARS
    }

    fn suggest(&self, tag: &str) -> Option<&'static str> {
        GRAMMARS
            .iter()
            .map(|g| (g.tag, strsim::jaro_winkler(tag, g.tag)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(tag, _)| tag)
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Build the registry. Called once at startup; later calls return the same table.
pub fn init() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        tracing::debug!(count = GRAMMARS.len(), "grammar registry initialized");
        Registry::build()
    })
}

/// The registry, building it on first use.
pub fn registry() -> &'static Registry {
    init()
}
