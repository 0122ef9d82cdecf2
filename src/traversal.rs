//! Tree snapshots and node navigation.
//!
//! Every node handed out takes one reference on its snapshot. Child and
//! sibling lookups follow one convention: named nodes only, unless
//! `anonymous` is set, in which case anonymous nodes count too.

use crate::errors::{Result, YeastError};
use crate::object::{NodeRef, Object, ObjectStore, Snapshot};
use crate::value::{Handle, Value};
use tree_sitter::{Node, Tree};

/// Resolve a child-index path against `tree`.
pub(crate) fn resolve_path<'t>(tree: &'t Tree, path: &[u32]) -> Option<Node<'t>> {
    path.iter()
        .try_fold(tree.root_node(), |node, &index| node.child(index as usize))
}

/// Absolute index of `child` among the children of `parent`.
fn index_in_parent(parent: Node<'_>, child: Node<'_>) -> Option<u32> {
    let mut cursor = parent.walk();
    let index = parent
        .children(&mut cursor)
        .position(|c| c == child)?;
    Some(index as u32)
}

/// Absolute index of the `n`th child of `parent` under the naming convention.
fn nth_child_index(parent: Node<'_>, n: usize, anonymous: bool) -> Option<u32> {
    let mut cursor = parent.walk();
    let (index, _) = parent
        .children(&mut cursor)
        .enumerate()
        .filter(|(_, c)| anonymous || c.is_named())
        .nth(n)?;
    Some(index as u32)
}

fn extend(path: &[u32], index: u32) -> Vec<u32> {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(index);
    next
}

impl ObjectStore {
    /// Copy the instance's canonical tree into a new snapshot.
    pub fn instance_tree(&mut self, instance: &Value) -> Result<Handle> {
        let (handle, target) = self.instance(instance)?;
        let tree = target.tree.as_ref().ok_or(YeastError::NoTree)?.clone();

        self.retain(handle);
        self.stats.trees_created += 1;
        let snapshot = self.wrap(Object::Tree(Snapshot {
            instance: handle,
            tree,
        }));
        tracing::debug!(instance = %handle, tree = %snapshot, "snapshot taken");
        Ok(snapshot)
    }

    pub fn tree_root(&mut self, tree: &Value) -> Result<Handle> {
        let (handle, _) = self.snapshot(tree)?;
        Ok(self.wrap_node(handle, Vec::new()))
    }

    /// Run `f` on the engine node behind `node`.
    pub fn with_node<R>(&self, node: &Value, f: impl FnOnce(Node<'_>) -> R) -> Result<R> {
        let (_, node_ref) = self.node(node)?;
        let tree = self.snapshot_tree(node_ref.tree)?;
        let resolved = resolve_path(tree, &node_ref.path).ok_or(YeastError::InvalidHandle)?;
        Ok(f(resolved))
    }

    pub fn node_child(&mut self, node: &Value, index: usize, anonymous: bool) -> Result<Option<Handle>> {
        self.derive_node(node, |tree, path| {
            let parent = resolve_path(tree, path)?;
            Some(extend(path, nth_child_index(parent, index, anonymous)?))
        })
    }

    /// First child that extends past `byte`.
    pub fn node_child_for_byte(
        &mut self,
        node: &Value,
        byte: usize,
        anonymous: bool,
    ) -> Result<Option<Handle>> {
        self.derive_node(node, |tree, path| {
            let parent = resolve_path(tree, path)?;
            let child = if anonymous {
                parent.first_child_for_byte(byte)?
            } else {
                parent.first_named_child_for_byte(byte)?
            };
            Some(extend(path, index_in_parent(parent, child)?))
        })
    }

    pub fn node_parent(&mut self, node: &Value) -> Result<Option<Handle>> {
        self.derive_node(node, |_, path| {
            let (_, parent) = path.split_last()?;
            Some(parent.to_vec())
        })
    }

    pub fn node_next_sibling(&mut self, node: &Value, anonymous: bool) -> Result<Option<Handle>> {
        self.derive_node(node, |tree, path| {
            let (&last, parent_path) = path.split_last()?;
            let parent = resolve_path(tree, parent_path)?;
            let mut cursor = parent.walk();
            let (index, _) = parent
                .children(&mut cursor)
                .enumerate()
                .skip(last as usize + 1)
                .find(|(_, c)| anonymous || c.is_named())?;
            Some(extend(parent_path, index as u32))
        })
    }

    pub fn node_prev_sibling(&mut self, node: &Value, anonymous: bool) -> Result<Option<Handle>> {
        self.derive_node(node, |tree, path| {
            let (&last, parent_path) = path.split_last()?;
            let parent = resolve_path(tree, parent_path)?;
            let mut cursor = parent.walk();
            let (index, _) = parent
                .children(&mut cursor)
                .enumerate()
                .take(last as usize)
                .filter(|(_, c)| anonymous || c.is_named())
                .last()?;
            Some(extend(parent_path, index as u32))
        })
    }

    /// Two nodes are equal when they sit at the same place in the same snapshot.
    pub fn node_eq(&self, a: &Value, b: &Value) -> Result<bool> {
        Ok(match (self.node_or_nil(a)?, self.node_or_nil(b)?) {
            (Some(x), Some(y)) => x == y,
            (None, None) => true,
            _ => false,
        })
    }

    fn node_or_nil(&self, value: &Value) -> Result<Option<&NodeRef>> {
        match value {
            Value::Nil => Ok(None),
            other => self.node(other).map(|(_, node)| Some(node)),
        }
    }

    fn derive_node<F>(&mut self, node: &Value, step: F) -> Result<Option<Handle>>
    where
        F: FnOnce(&Tree, &[u32]) -> Option<Vec<u32>>,
    {
        let (_, node_ref) = self.node(node)?;
        let tree_handle = node_ref.tree;
        let tree = self.snapshot_tree(tree_handle)?;
        let Some(path) = step(tree, &node_ref.path) else {
            return Ok(None);
        };
        Ok(Some(self.wrap_node(tree_handle, path)))
    }

    fn wrap_node(&mut self, tree: Handle, path: Vec<u32>) -> Handle {
        self.retain(tree);
        self.wrap(Object::Node(NodeRef { tree, path }))
    }

    fn snapshot_tree(&self, tree: Handle) -> Result<&Tree> {
        match self.slot(tree).map(|slot| &slot.object) {
            Some(Object::Tree(snapshot)) => Ok(&snapshot.tree),
            _ => Err(YeastError::InvalidHandle),
        }
    }
}
