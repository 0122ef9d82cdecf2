//! Operations exposed to the host binding layer.
//!
//! Every function takes host [`Value`]s, checks their types before touching
//! anything, and answers with a [`Value`]. "Empty" results are [`Value::Nil`].

use crate::buffer::{TextBuffer, DEFAULT_CHUNK_SIZE};
use crate::config::Settings;
use crate::errors::{Result, YeastError};
use crate::grammar::{self, Grammar};
use crate::object::{Kind, ObjectStore};
use crate::reparse::ByteEdit;
use crate::value::Value;
use std::collections::BTreeMap;

pub struct Module {
    store: ObjectStore,
    chunk_size: usize,
    aliases: BTreeMap<String, String>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        grammar::init();
        Self {
            store: ObjectStore::new(),
            chunk_size,
            aliases: BTreeMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut module = Self::with_chunk_size(settings.parser.chunk_size);
        module.aliases = settings.grammars.aliases.clone();
        module
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Resolve a grammar tag, following configured aliases.
    pub fn resolve_grammar(&self, tag: &str) -> Result<Grammar> {
        let target = self.aliases.get(tag).map_or(tag, String::as_str);
        grammar::registry().lookup(target).map_err(|err| match err {
            YeastError::UnknownGrammar { suggestion, .. } => YeastError::UnknownGrammar {
                tag: tag.to_string(),
                suggestion,
            },
            other => other,
        })
    }

    /// Run the host finalizer for `value`.
    pub fn finalize(&mut self, value: &Value) -> Result<()> {
        let handle = value.as_handle().ok_or(YeastError::InvalidHandle)?;
        self.store.finalize(handle)
    }

    pub fn make_instance(&mut self, language: &Value) -> Result<Value> {
        let tag = expect_symbol(language)?;
        let grammar = self.resolve_grammar(tag)?;
        self.store.make_instance(grammar).map(Value::User)
    }

    pub fn instance_p(&self, value: &Value) -> Value {
        Value::from_bool(self.store.type_of(value) == Some(Kind::Instance))
    }

    pub fn tree_p(&self, value: &Value) -> Value {
        Value::from_bool(self.store.type_of(value) == Some(Kind::Tree))
    }

    pub fn node_p(&self, value: &Value) -> Value {
        Value::from_bool(self.store.type_of(value) == Some(Kind::Node))
    }

    pub fn instance_grammar(&self, instance: &Value) -> Result<Value> {
        let (_, instance) = self.store.instance(instance)?;
        Ok(Value::symbol(instance.grammar().tag()))
    }

    /// Parse `buffer`, replacing the instance's tree. `t` on success.
    pub fn parse<B>(&mut self, instance: &Value, buffer: &B) -> Result<Value>
    where
        B: TextBuffer + ?Sized,
    {
        let ok = self.store.reparse(instance, buffer, self.chunk_size)?;
        Ok(Value::from_bool(ok))
    }

    /// Record the change `beg..end` (replacing `len` bytes) and reparse.
    pub fn edit<B>(
        &mut self,
        instance: &Value,
        beg: &Value,
        end: &Value,
        len: &Value,
        buffer: &B,
    ) -> Result<Value>
    where
        B: TextBuffer + ?Sized,
    {
        self.store.instance(instance)?;
        let edit = ByteEdit::from_change(
            expect_integer(beg)?,
            expect_integer(end)?,
            expect_integer(len)?,
        )?;
        let ok = self
            .store
            .edit_and_reparse(instance, edit, buffer, self.chunk_size)?;
        Ok(Value::from_bool(ok))
    }

    pub fn instance_tree(&mut self, instance: &Value) -> Result<Value> {
        self.store.instance_tree(instance).map(Value::User)
    }

    pub fn tree_root(&mut self, tree: &Value) -> Result<Value> {
        self.store.tree_root(tree).map(Value::User)
    }

    pub fn node_type(&self, node: &Value) -> Result<Value> {
        self.store.with_node(node, |n| Value::symbol(n.kind()))
    }

    pub fn node_named_p(&self, node: &Value) -> Result<Value> {
        self.store.with_node(node, |n| Value::from_bool(n.is_named()))
    }

    pub fn node_has_error_p(&self, node: &Value) -> Result<Value> {
        self.store.with_node(node, |n| Value::from_bool(n.has_error()))
    }

    pub fn node_child_count(&self, node: &Value, anonymous: &Value) -> Result<Value> {
        let anonymous = anonymous.is_truthy();
        self.store.with_node(node, |n| {
            let count = if anonymous {
                n.child_count()
            } else {
                n.named_child_count()
            };
            Value::from(count)
        })
    }

    pub fn node_child(&mut self, node: &Value, index: &Value, anonymous: &Value) -> Result<Value> {
        self.store.node(node)?;
        let Ok(index) = usize::try_from(expect_integer(index)?) else {
            return Ok(Value::Nil);
        };
        let child = self.store.node_child(node, index, anonymous.is_truthy())?;
        Ok(Value::from(child))
    }

    pub fn node_start_byte(&self, node: &Value) -> Result<Value> {
        self.store.with_node(node, |n| Value::from(n.start_byte()))
    }

    pub fn node_end_byte(&self, node: &Value) -> Result<Value> {
        self.store.with_node(node, |n| Value::from(n.end_byte()))
    }

    /// `(start . end)` of the node.
    pub fn node_byte_range(&self, node: &Value) -> Result<Value> {
        self.store.with_node(node, |n| {
            Value::cons(Value::from(n.start_byte()), Value::from(n.end_byte()))
        })
    }

    pub fn node_child_for_byte(
        &mut self,
        node: &Value,
        byte: &Value,
        anonymous: &Value,
    ) -> Result<Value> {
        self.store.node(node)?;
        let Ok(byte) = usize::try_from(expect_integer(byte)?) else {
            return Ok(Value::Nil);
        };
        let child = self
            .store
            .node_child_for_byte(node, byte, anonymous.is_truthy())?;
        Ok(Value::from(child))
    }

    pub fn node_parent(&mut self, node: &Value) -> Result<Value> {
        self.store.node_parent(node).map(Value::from)
    }

    pub fn node_next_sibling(&mut self, node: &Value, anonymous: &Value) -> Result<Value> {
        self.store
            .node_next_sibling(node, anonymous.is_truthy())
            .map(Value::from)
    }

    pub fn node_prev_sibling(&mut self, node: &Value, anonymous: &Value) -> Result<Value> {
        self.store
            .node_prev_sibling(node, anonymous.is_truthy())
            .map(Value::from)
    }

    pub fn node_eq(&self, a: &Value, b: &Value) -> Result<Value> {
        self.store.node_eq(a, b).map(Value::from_bool)
    }
}

fn expect_symbol(value: &Value) -> Result<&str> {
    value.as_symbol().ok_or_else(|| YeastError::WrongType {
        expected: "symbolp",
        actual: value.to_string(),
    })
}

fn expect_integer(value: &Value) -> Result<i64> {
    value.as_integer().ok_or_else(|| YeastError::WrongType {
        expected: "integerp",
        actual: value.to_string(),
    })
}
