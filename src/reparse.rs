//! Full and incremental reparse of an instance's canonical tree.
//!
//! This is the only code that replaces an instance's canonical tree. Trees
//! already snapshotted from the instance are separate copies and stay valid.

use crate::buffer::{ChunkReader, TextBuffer};
use crate::errors::{Result, YeastError};
use crate::object::{Object, ObjectStore};
use crate::value::Value;
use tree_sitter::{InputEdit, Point};

/// A single contiguous change, in bytes.
///
/// `start..old_end` of the previous text became `start..new_end` of the
/// current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteEdit {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl ByteEdit {
    /// Build an edit from host change notification arguments: `beg` and `end`
    /// bound the new text, `len` is the length of the text it replaced.
    pub fn from_change(beg: i64, end: i64, len: i64) -> Result<Self> {
        let invalid = || YeastError::InvalidEdit { beg, end, len };
        if beg < 0 || len < 0 || end < beg {
            return Err(invalid());
        }
        let start = usize::try_from(beg).map_err(|_| invalid())?;
        let new_end = usize::try_from(end).map_err(|_| invalid())?;
        let old_end = start
            .checked_add(usize::try_from(len).map_err(|_| invalid())?)
            .ok_or_else(invalid)?;
        Ok(Self {
            start,
            old_end,
            new_end,
        })
    }

    /// Engine edit with zeroed positions; byte offsets are authoritative.
    pub fn to_input_edit(self) -> InputEdit {
        let origin = Point { row: 0, column: 0 };
        InputEdit {
            start_byte: self.start,
            old_end_byte: self.old_end,
            new_end_byte: self.new_end,
            start_position: origin,
            old_end_position: origin,
            new_end_position: origin,
        }
    }
}

impl ObjectStore {
    /// Parse `buffer` into `instance`, reusing its current tree if it has one.
    ///
    /// Returns false if the buffer produced a short read. The canonical tree
    /// is replaced either way, since the engine does not roll back. Only when
    /// the engine produces no tree at all is the previous one kept.
    pub fn reparse<B>(&mut self, instance: &Value, buffer: &B, chunk_size: usize) -> Result<bool>
    where
        B: TextBuffer + ?Sized,
    {
        let (handle, _) = self.instance(instance)?;
        let Some(Object::Instance(instance)) =
            self.slots.get_mut(handle.slot()).map(|slot| &mut slot.object)
        else {
            return Err(YeastError::InvalidHandle);
        };

        let reader = ChunkReader::new(buffer, chunk_size);
        let mut input = |offset: usize, _: Point| reader.read(offset);
        let parsed = instance
            .parser
            .parse_with_options(&mut input, instance.tree.as_ref(), None);

        let Some(new_tree) = parsed else {
            tracing::warn!(%handle, "engine returned no tree, keeping previous tree");
            return Ok(false);
        };
        self.stats.trees_created += 1;
        if instance.tree.replace(new_tree).is_some() {
            self.stats.trees_freed += 1;
        }

        let success = reader.success();
        tracing::debug!(
            %handle,
            grammar = %instance.grammar,
            bytes = reader.size(),
            reads = reader.reads(),
            success,
            "reparse finished"
        );
        Ok(success)
    }

    /// Tell the engine about `edit`, then reparse.
    ///
    /// Must be called once per edit, in the order the edits happened. An
    /// instance that has never parsed has nothing to edit and just parses.
    pub fn edit_and_reparse<B>(
        &mut self,
        instance: &Value,
        edit: ByteEdit,
        buffer: &B,
        chunk_size: usize,
    ) -> Result<bool>
    where
        B: TextBuffer + ?Sized,
    {
        let (handle, target) = self.instance_mut(instance)?;
        match target.tree.as_mut() {
            Some(tree) => {
                tracing::debug!(%handle, ?edit, "applying edit");
                tree.edit(&edit.to_input_edit());
            }
            None => tracing::debug!(%handle, "no tree yet, edit becomes a full parse"),
        }
        self.reparse(instance, buffer, chunk_size)
    }
}
