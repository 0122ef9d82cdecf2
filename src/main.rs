use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ropey::Rope;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use yeast::config::{resolve_settings, script_from_path, Settings};
use yeast::{grammar, Module, Value, EXPORTS};

#[derive(Parser)]
#[command(name = "yeast")]
#[command(about = "Incremental tree-sitter parse trees with finalizer-driven lifetimes", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $YEAST_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List compiled-in grammars and configured aliases
    Grammars,

    /// List exported host functions
    Functions,

    /// Parse a file, or every recognised file under a directory
    Parse {
        path: PathBuf,

        /// Grammar tag to use instead of detecting it from the extension
        #[arg(short, long)]
        grammar: Option<String>,

        /// Print trees as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay an edit script through incremental reparsing
    Replay {
        script: PathBuf,

        /// Show each step as a diff against the previous tree
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(cli.config.as_deref())?;
    init_tracing(&settings, cli.verbose)?;
    grammar::init();

    match cli.command {
        Commands::Grammars => cmd_grammars(&settings),
        Commands::Functions => cmd_functions(),
        Commands::Parse {
            path,
            grammar,
            json,
        } => cmd_parse(&settings, &path, grammar.as_deref(), json),
        Commands::Replay { script, diff } => cmd_replay(&settings, &script, diff),
    }
}

fn init_tracing(settings: &Settings, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => settings.log.level().unwrap_or(tracing::Level::INFO),
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cmd_grammars(settings: &Settings) -> Result<()> {
    println!("{}", "Grammars:".bold());
    for grammar in grammar::registry().grammars() {
        println!(
            "  {:<12} {}",
            grammar.tag().green(),
            grammar.extensions().join(", ").dimmed()
        );
    }

    if !settings.grammars.aliases.is_empty() {
        println!("\n{}", "Aliases:".bold());
        for (alias, target) in &settings.grammars.aliases {
            println!("  {:<12} -> {}", alias.cyan(), target);
        }
    }
    Ok(())
}

fn cmd_functions() -> Result<()> {
    for export in EXPORTS {
        println!("{} {}", export.name.green().bold(), export.arglist);
        println!("    {}", export.doc.dimmed());
    }
    Ok(())
}

/// A syntax node as printed by the CLI.
#[derive(Debug, Serialize)]
struct SyntaxNode {
    kind: String,
    start: i64,
    end: i64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    error: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out, 0);
        out
    }

    fn write_sexp(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
        out.push('(');
        out.push_str(&self.kind);
        out.push_str(&format!(" [{}, {}]", self.start, self.end));
        for child in &self.children {
            child.write_sexp(out, depth + 1);
        }
        out.push(')');
    }
}

#[derive(Debug, Serialize)]
struct ParseReport {
    path: PathBuf,
    grammar: String,
    complete: bool,
    tree: SyntaxNode,
}

/// Every handle the CLI received, standing in for the host collector.
struct Session {
    module: Module,
    handles: Vec<Value>,
}

impl Session {
    fn new(settings: &Settings) -> Self {
        Self {
            module: Module::from_settings(settings),
            handles: Vec::new(),
        }
    }

    fn keep(&mut self, value: Value) -> Value {
        if value.as_handle().is_some() {
            self.handles.push(value.clone());
        }
        value
    }

    /// Walk the named structure under `node`.
    fn walk(&mut self, node: &Value) -> Result<SyntaxNode> {
        let kind = match self.module.node_type(node)? {
            Value::Symbol(kind) => kind,
            other => other.to_string(),
        };
        let start = int(&self.module.node_start_byte(node)?, "node-start-byte")?;
        let end = int(&self.module.node_end_byte(node)?, "node-end-byte")?;
        let error = self.module.node_has_error_p(node)?.is_truthy();
        let count = int(&self.module.node_child_count(node, &Value::Nil)?, "node-child-count")?;

        let mut children = Vec::new();
        for index in 0..count {
            let child = self
                .module
                .node_child(node, &Value::Integer(index), &Value::Nil)?;
            let child = self.keep(child);
            if child.is_nil() {
                continue;
            }
            children.push(self.walk(&child)?);
        }

        Ok(SyntaxNode {
            kind,
            start,
            end,
            error,
            children,
        })
    }

    /// Snapshot the instance's current tree and walk it.
    fn snapshot(&mut self, instance: &Value) -> Result<SyntaxNode> {
        let tree = self.module.instance_tree(instance)?;
        let tree = self.keep(tree);
        let root = self.module.tree_root(&tree)?;
        let root = self.keep(root);
        self.walk(&root)
    }

    /// Finalize everything, most recent first, and check nothing leaked.
    fn finish(mut self) -> Result<()> {
        while let Some(value) = self.handles.pop() {
            self.module.finalize(&value)?;
        }
        let stats = self.module.store().stats();
        tracing::debug!(?stats, "session finished");
        if !stats.is_balanced() || !self.module.store().is_empty() {
            anyhow::bail!(
                "engine resources leaked: {} parsers and {} trees still live",
                stats.live_parsers(),
                stats.live_trees()
            );
        }
        Ok(())
    }
}

fn int(value: &Value, what: &str) -> Result<i64> {
    value
        .as_integer()
        .with_context(|| format!("{what} returned {value}, expected an integer"))
}

fn collect_files(path: &Path, tag: Option<&str>, module: &Module) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let wanted = tag.map(|tag| module.resolve_grammar(tag)).transpose()?;
    let registry = grammar::registry();
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        match (registry.for_path(entry.path()), wanted) {
            (Some(found), Some(wanted)) if found == wanted => files.push(entry.into_path()),
            (Some(_), None) => files.push(entry.into_path()),
            _ => {}
        }
    }
    Ok(files)
}

fn cmd_parse(settings: &Settings, path: &Path, tag: Option<&str>, json: bool) -> Result<()> {
    let mut session = Session::new(settings);
    let files = collect_files(path, tag, &session.module)?;
    if files.is_empty() {
        anyhow::bail!("no parsable files under {}", path.display());
    }

    let mut reports = Vec::new();
    for file in files {
        let grammar = match tag {
            Some(tag) => session.module.resolve_grammar(tag)?,
            None => grammar::registry()
                .for_path(&file)
                .with_context(|| format!("cannot detect grammar for {}", file.display()))?,
        };
        let text = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let rope = Rope::from_str(&text);

        let instance = session.module.make_instance(&Value::symbol(grammar.tag()))?;
        let instance = session.keep(instance);
        let complete = session.module.parse(&instance, &rope)?.is_truthy();
        if !complete {
            tracing::warn!(file = %file.display(), "short read while parsing");
        }
        let tree = session.snapshot(&instance)?;

        if json {
            reports.push(ParseReport {
                path: file,
                grammar: grammar.tag().to_string(),
                complete,
                tree,
            });
        } else {
            println!("{} {}", file.display().to_string().bold(), format!("({grammar})").dimmed());
            println!("{}", tree.to_sexp());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    session.finish()
}

fn cmd_replay(settings: &Settings, script_path: &Path, diff: bool) -> Result<()> {
    let script = script_from_path(script_path)?;
    let mut session = Session::new(settings);

    let instance = session.module.make_instance(&Value::symbol(script.grammar.as_str()))?;
    let instance = session.keep(instance);
    let mut rope = Rope::from_str(&script.text);
    session.module.parse(&instance, &rope)?;

    let mut previous = session.snapshot(&instance)?.to_sexp();
    println!("{}", "step 0".bold());
    println!("{previous}");

    for (index, edit) in script.edits.iter().enumerate() {
        let start = rope.byte_to_char(edit.start);
        let end = rope.byte_to_char(edit.end);
        rope.remove(start..end);
        rope.insert(start, &edit.text);

        let new_end = edit.start + edit.text.len();
        let complete = session.module.edit(
            &instance,
            &Value::Integer(edit.start as i64),
            &Value::Integer(new_end as i64),
            &Value::Integer((edit.end - edit.start) as i64),
            &rope,
        )?;
        if !complete.is_truthy() {
            tracing::warn!(step = index + 1, "short read while reparsing");
        }

        let current = session.snapshot(&instance)?.to_sexp();
        println!("\n{}", format!("step {}", index + 1).bold());
        if diff {
            display_diff(&previous, &current);
        } else {
            println!("{current}");
        }
        previous = current;
    }

    session.finish()
}

fn display_diff(before: &str, after: &str) {
    let diff = TextDiff::from_lines(before, after);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", line);
    }
    println!();
}
