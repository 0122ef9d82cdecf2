//! Yeast: incremental syntax trees for a garbage-collected host
//!
//! Exposes tree-sitter parsers, tree snapshots and syntax nodes to a host
//! that only offers "allocate an opaque handle with a finalizer" and runs
//! each finalizer once, at a time of its choosing.
//!
//! # Architecture
//!
//! Every object handed to the host lives in an [`ObjectStore`] slot tagged
//! with its [`Kind`] and a reference count. Ownership only ever points up:
//! a node holds its tree snapshot, a snapshot holds its parser instance.
//! Finalizing a handle drops one reference and cascades up that chain, so
//! engine resources are freed exactly once, after their last owner.
//!
//! Reparsing pulls text from a [`TextBuffer`] in bounded chunks through a
//! [`ChunkReader`]. Edits are reported to the engine as a [`ByteEdit`]
//! before the incremental reparse that follows them.
//!
//! # Example
//!
//! ```no_run
//! use yeast::{Module, Value};
//!
//! let mut module = Module::new();
//! let instance = module.make_instance(&Value::symbol("json"))?;
//! module.parse(&instance, "{}")?;
//!
//! let tree = module.instance_tree(&instance)?;
//! let root = module.tree_root(&tree)?;
//! let object = module.node_child(&root, &Value::Integer(0), &Value::Nil)?;
//! assert_eq!(module.node_type(&object)?, Value::symbol("object"));
//!
//! for value in [object, root, tree, instance] {
//!     module.finalize(&value)?;
//! }
//! assert!(module.store().stats().is_balanced());
//! # Ok::<(), yeast::YeastError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod errors;
pub mod exports;
pub mod grammar;
pub mod lifetime;
pub mod module;
pub mod object;
pub mod reparse;
pub mod traversal;
pub mod value;

pub use buffer::{ChunkReader, TextBuffer, DEFAULT_CHUNK_SIZE};
pub use config::{ConfigError, ReplayScript, Settings};
pub use errors::{Result, YeastError};
pub use exports::{Export, Function, EXPORTS};
pub use grammar::Grammar;
pub use lifetime::ResourceStats;
pub use module::Module;
pub use object::{Header, Kind, ObjectStore};
pub use reparse::ByteEdit;
pub use value::{Handle, Value};
