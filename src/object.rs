//! Tagged, reference-counted wrappers around engine resources.
//!
//! Every object lives in an [`ObjectStore`] slot together with a [`Header`]
//! carrying its [`Kind`] and reference count. Owning back-references
//! (Tree → Instance, Node → Tree) are plain [`Handle`]s whose count was
//! taken when the reference was stored. Only this crate retains; the host
//! can only release, through [`ObjectStore::finalize`].

use crate::errors::{Result, YeastError};
use crate::grammar::Grammar;
use crate::lifetime::ResourceStats;
use crate::value::{Handle, Value};
use slab::Slab;
use std::fmt;
use tree_sitter::{Parser, Tree};

/// The three object kinds this crate hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Instance,
    Tree,
    Node,
}

impl Kind {
    /// Predicate name reported in wrong-type errors.
    pub fn predicate(self) -> &'static str {
        match self {
            Kind::Instance => "yeast-instance-p",
            Kind::Tree => "yeast-tree-p",
            Kind::Node => "yeast-node-p",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Instance => f.write_str("instance"),
            Kind::Tree => f.write_str("tree"),
            Kind::Node => f.write_str("node"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: Kind,
    /// Owners besides the store itself. Nodes always carry 0.
    pub refcount: u32,
}

/// A parser configured for one grammar plus its canonical tree.
pub struct Instance {
    pub(crate) parser: Parser,
    pub(crate) grammar: Grammar,
    /// Raw engine tree owned directly by the instance; not a refcounted entity.
    pub(crate) tree: Option<Tree>,
}

impl Instance {
    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }
}

/// An immutable copy of an instance's canonical tree.
pub struct Snapshot {
    pub(crate) instance: Handle,
    pub(crate) tree: Tree,
}

impl Snapshot {
    /// The instance this snapshot holds a reference to.
    pub fn instance(&self) -> Handle {
        self.instance
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

/// A position inside a snapshot.
///
/// The path lists absolute child indices from the root; it is resolved
/// against the owning snapshot on every access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub(crate) tree: Handle,
    pub(crate) path: Vec<u32>,
}

impl NodeRef {
    pub fn tree(&self) -> Handle {
        self.tree
    }

    pub fn path(&self) -> &[u32] {
        &self.path
    }
}

pub enum Object {
    Instance(Instance),
    Tree(Snapshot),
    Node(NodeRef),
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Object::Instance(_) => Kind::Instance,
            Object::Tree(_) => Kind::Tree,
            Object::Node(_) => Kind::Node,
        }
    }

    /// Count a freshly wrapped object starts with.
    fn initial_refcount(&self) -> u32 {
        match self {
            Object::Node(_) => 0,
            _ => 1,
        }
    }
}

pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) header: Header,
    /// Set once the host has run this handle's finalizer.
    pub(crate) finalized: bool,
    pub(crate) object: Object,
}

/// Arena owning every object minted for the host.
///
/// References are only ever added by the operations that store them, so the
/// host cannot take a count it has no way to give back:
///
/// ```compile_fail
/// use yeast::{Module, Value};
///
/// let mut module = Module::new();
/// let instance = module.make_instance(&Value::symbol("json")).unwrap();
/// module.store_mut().retain(instance.as_handle().unwrap());
/// ```
#[derive(Default)]
pub struct ObjectStore {
    pub(crate) slots: Slab<Slot>,
    next_generation: u32,
    pub(crate) stats: ResourceStats,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot for `object` and return its handle.
    pub(crate) fn wrap(&mut self, object: Object) -> Handle {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        let header = Header {
            kind: object.kind(),
            refcount: object.initial_refcount(),
        };
        let index = self.slots.insert(Slot {
            generation,
            header,
            finalized: false,
            object,
        });
        Handle {
            index,
            generation,
        }
    }

    /// Create a parser for `grammar` and wrap it as a new instance.
    pub fn make_instance(&mut self, grammar: Grammar) -> Result<Handle> {
        let mut parser = Parser::new();
        parser.set_language(&grammar.language())?;
        self.stats.parsers_created += 1;

        let handle = self.wrap(Object::Instance(Instance {
            parser,
            grammar,
            tree: None,
        }));
        tracing::debug!(%handle, %grammar, "instance created");
        Ok(handle)
    }

    /// Kind of the object behind `value`, or `None` for anything not ours.
    pub fn type_of(&self, value: &Value) -> Option<Kind> {
        let handle = value.as_handle()?;
        self.slot(handle).map(|slot| slot.header.kind)
    }

    /// Record an additional owning reference to `handle`.
    ///
    /// Nodes are not counted; retaining one is a no-op.
    pub(crate) fn retain(&mut self, handle: Handle) {
        if let Some(slot) = self.slot_mut(handle) {
            if slot.header.kind != Kind::Node {
                slot.header.refcount += 1;
            }
        }
    }

    pub fn header(&self, handle: Handle) -> Option<Header> {
        self.slot(handle).map(|slot| slot.header)
    }

    pub fn refcount(&self, handle: Handle) -> Option<u32> {
        self.header(handle).map(|h| h.refcount)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.slot(handle).is_some()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    /// Handles whose finalizer has not run yet, in slot order.
    pub fn handles(&self) -> Vec<Handle> {
        self.slots
            .iter()
            .filter(|(_, slot)| !slot.finalized)
            .map(|(index, slot)| Handle {
                index,
                generation: slot.generation,
            })
            .collect()
    }

    /// Downcast `value` to an instance, checking its kind first.
    pub fn instance(&self, value: &Value) -> Result<(Handle, &Instance)> {
        match self.resolve(value) {
            Some((handle, Object::Instance(instance))) => Ok((handle, instance)),
            _ => Err(wrong_type(Kind::Instance, value)),
        }
    }

    pub fn instance_mut(&mut self, value: &Value) -> Result<(Handle, &mut Instance)> {
        match self.resolve_mut(value) {
            Some((handle, Object::Instance(instance))) => Ok((handle, instance)),
            _ => Err(wrong_type(Kind::Instance, value)),
        }
    }

    pub fn snapshot(&self, value: &Value) -> Result<(Handle, &Snapshot)> {
        match self.resolve(value) {
            Some((handle, Object::Tree(snapshot))) => Ok((handle, snapshot)),
            _ => Err(wrong_type(Kind::Tree, value)),
        }
    }

    pub fn node(&self, value: &Value) -> Result<(Handle, &NodeRef)> {
        match self.resolve(value) {
            Some((handle, Object::Node(node))) => Ok((handle, node)),
            _ => Err(wrong_type(Kind::Node, value)),
        }
    }

    fn resolve(&self, value: &Value) -> Option<(Handle, &Object)> {
        let handle = value.as_handle()?;
        self.slot(handle).map(|slot| (handle, &slot.object))
    }

    fn resolve_mut(&mut self, value: &Value) -> Option<(Handle, &mut Object)> {
        let handle = value.as_handle()?;
        self.slot_mut(handle).map(|slot| (handle, &mut slot.object))
    }

    pub(crate) fn slot(&self, handle: Handle) -> Option<&Slot> {
        self.slots
            .get(handle.slot())
            .filter(|slot| slot.generation == handle.generation)
    }

    pub(crate) fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.slot())
            .filter(|slot| slot.generation == handle.generation)
    }
}

fn wrong_type(expected: Kind, value: &Value) -> YeastError {
    YeastError::WrongType {
        expected: expected.predicate(),
        actual: value.to_string(),
    }
}
