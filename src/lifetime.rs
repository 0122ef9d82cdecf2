//! Finalize-and-cascade.
//!
//! The host runs a handle's finalizer exactly once, at some point after the
//! handle became unreachable, in no particular order relative to other
//! handles. Each release step therefore only touches the count of the object
//! it was given and then hands its own owner back for the next step:
//!
//! - Instance: drop one reference; at zero free the canonical tree and the parser.
//! - Tree: drop one reference; at zero free the engine tree, then release the instance.
//! - Node: always release the tree.

use crate::errors::{Result, YeastError};
use crate::object::{Object, ObjectStore};
use crate::value::Handle;

/// Engine resources allocated and freed over the lifetime of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub parsers_created: usize,
    pub parsers_freed: usize,
    pub trees_created: usize,
    pub trees_freed: usize,
}

impl ResourceStats {
    pub fn live_parsers(&self) -> usize {
        self.parsers_created - self.parsers_freed
    }

    pub fn live_trees(&self) -> usize {
        self.trees_created - self.trees_freed
    }

    /// Every engine resource that was created has been freed.
    pub fn is_balanced(&self) -> bool {
        self.live_parsers() == 0 && self.live_trees() == 0
    }
}

impl ObjectStore {
    /// Host finalizer entry point for `handle`.
    ///
    /// Rejects handles that are stale, unknown, or whose finalizer already
    /// ran, without touching any count.
    pub fn finalize(&mut self, handle: Handle) -> Result<()> {
        let Some(slot) = self.slot_mut(handle) else {
            tracing::warn!(%handle, "finalize on unknown handle");
            return Err(YeastError::InvalidHandle);
        };
        if slot.finalized {
            tracing::warn!(%handle, "handle finalized twice");
            return Err(YeastError::InvalidHandle);
        }
        slot.finalized = true;

        let mut next = Some(handle);
        while let Some(current) = next {
            next = self.release(current);
        }
        Ok(())
    }

    /// Drop one reference to `handle` and return the owner to release next.
    fn release(&mut self, handle: Handle) -> Option<Handle> {
        let slot = self.slot_mut(handle)?;
        if !matches!(slot.object, Object::Node(_)) {
            slot.header.refcount = slot.header.refcount.saturating_sub(1);
            tracing::trace!(%handle, kind = %slot.header.kind, refcount = slot.header.refcount, "release");
            if slot.header.refcount > 0 {
                return None;
            }
        }

        let slot = self.slots.remove(handle.slot());
        tracing::trace!(%handle, kind = %slot.header.kind, "destroy");
        match slot.object {
            Object::Instance(instance) => {
                if let Some(tree) = instance.tree {
                    drop(tree);
                    self.stats.trees_freed += 1;
                }
                drop(instance.parser);
                self.stats.parsers_freed += 1;
                None
            }
            Object::Tree(snapshot) => {
                drop(snapshot.tree);
                self.stats.trees_freed += 1;
                Some(snapshot.instance)
            }
            Object::Node(node) => Some(node.tree),
        }
    }
}
