//! Host-visible function table.
//!
//! The binding layer registers one host function per [`Export`] and routes
//! every call through [`Module::funcall`].

use crate::buffer::TextBuffer;
use crate::errors::{Result, YeastError};
use crate::module::Module;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    MakeInstance,
    InstanceP,
    TreeP,
    NodeP,
    InstanceGrammar,
    Parse,
    Edit,
    InstanceTree,
    TreeRoot,
    NodeType,
    NodeNamedP,
    NodeHasErrorP,
    NodeChildCount,
    NodeChild,
    NodeStartByte,
    NodeEndByte,
    NodeByteRange,
    NodeChildForByte,
    NodeParent,
    NodeNextSibling,
    NodePrevSibling,
    NodeEq,
}

#[derive(Debug, Clone, Copy)]
pub struct Export {
    pub name: &'static str,
    pub function: Function,
    pub arglist: &'static str,
    pub doc: &'static str,
    pub min_args: usize,
    pub max_args: usize,
}

const fn export(
    name: &'static str,
    function: Function,
    arglist: &'static str,
    min_args: usize,
    max_args: usize,
    doc: &'static str,
) -> Export {
    Export {
        name,
        function,
        arglist,
        doc,
        min_args,
        max_args,
    }
}

pub const EXPORTS: &[Export] = &[
    export("yeast-make-instance", Function::MakeInstance, "(LANGUAGE)", 1, 1,
        "Create a parser instance for LANGUAGE, a grammar tag symbol."),
    export("yeast-instance-p", Function::InstanceP, "(OBJECT)", 1, 1,
        "Return t if OBJECT is a parser instance."),
    export("yeast-tree-p", Function::TreeP, "(OBJECT)", 1, 1,
        "Return t if OBJECT is a tree snapshot."),
    export("yeast-node-p", Function::NodeP, "(OBJECT)", 1, 1,
        "Return t if OBJECT is a syntax node."),
    export("yeast-instance-grammar", Function::InstanceGrammar, "(INSTANCE)", 1, 1,
        "Return the grammar tag INSTANCE was created for."),
    export("yeast-parse", Function::Parse, "(INSTANCE)", 1, 1,
        "Parse the current buffer with INSTANCE. Return t on success."),
    export("yeast-edit", Function::Edit, "(INSTANCE BEG END LENGTH)", 4, 4,
        "Record that BEG..END replaced LENGTH bytes, then reparse. Return t on success."),
    export("yeast-instance-tree", Function::InstanceTree, "(INSTANCE)", 1, 1,
        "Return a snapshot of INSTANCE's current tree."),
    export("yeast-tree-root", Function::TreeRoot, "(TREE)", 1, 1,
        "Return the root node of TREE."),
    export("yeast-node-type", Function::NodeType, "(NODE)", 1, 1,
        "Return the grammar type of NODE as a symbol."),
    export("yeast-node-named-p", Function::NodeNamedP, "(NODE)", 1, 1,
        "Return t if NODE is a named node."),
    export("yeast-node-has-error-p", Function::NodeHasErrorP, "(NODE)", 1, 1,
        "Return t if NODE or any of its descendants is a syntax error."),
    export("yeast-node-child-count", Function::NodeChildCount, "(NODE &optional ANONYMOUS)", 1, 2,
        "Return the number of named children of NODE, or all children if ANONYMOUS."),
    export("yeast-node-child", Function::NodeChild, "(NODE N &optional ANONYMOUS)", 2, 3,
        "Return the Nth named child of NODE, counting anonymous children if ANONYMOUS."),
    export("yeast-node-start-byte", Function::NodeStartByte, "(NODE)", 1, 1,
        "Return the byte offset where NODE starts."),
    export("yeast-node-end-byte", Function::NodeEndByte, "(NODE)", 1, 1,
        "Return the byte offset where NODE ends."),
    export("yeast-node-byte-range", Function::NodeByteRange, "(NODE)", 1, 1,
        "Return (START . END) for NODE."),
    export("yeast-node-child-for-byte", Function::NodeChildForByte, "(NODE BYTE &optional ANONYMOUS)", 2, 3,
        "Return the first child of NODE that extends beyond BYTE."),
    export("yeast-node-parent", Function::NodeParent, "(NODE)", 1, 1,
        "Return the parent of NODE, or nil at the root."),
    export("yeast-node-next-sibling", Function::NodeNextSibling, "(NODE &optional ANONYMOUS)", 1, 2,
        "Return the next named sibling of NODE, or the next sibling if ANONYMOUS."),
    export("yeast-node-prev-sibling", Function::NodePrevSibling, "(NODE &optional ANONYMOUS)", 1, 2,
        "Return the previous named sibling of NODE, or the previous sibling if ANONYMOUS."),
    export("yeast-node-eq", Function::NodeEq, "(A B)", 2, 2,
        "Return t if A and B are the same node. Either may be nil."),
];

pub fn find(name: &str) -> Option<&'static Export> {
    EXPORTS.iter().find(|e| e.name == name)
}

impl Module {
    /// Call the exported function `name` with host arguments.
    ///
    /// `buffer` is the current buffer for the functions that read one.
    pub fn funcall<B>(&mut self, name: &str, args: &[Value], buffer: &B) -> Result<Value>
    where
        B: TextBuffer + ?Sized,
    {
        let export = find(name).ok_or_else(|| YeastError::UnknownFunction {
            name: name.to_string(),
        })?;
        if args.len() < export.min_args || args.len() > export.max_args {
            return Err(YeastError::WrongArity {
                name: export.name,
                given: args.len(),
            });
        }
        tracing::trace!(function = export.name, argc = args.len(), "funcall");

        let nil = Value::Nil;
        let arg = |i: usize| args.get(i).unwrap_or(&nil);

        match export.function {
            Function::MakeInstance => self.make_instance(arg(0)),
            Function::InstanceP => Ok(self.instance_p(arg(0))),
            Function::TreeP => Ok(self.tree_p(arg(0))),
            Function::NodeP => Ok(self.node_p(arg(0))),
            Function::InstanceGrammar => self.instance_grammar(arg(0)),
            Function::Parse => self.parse(arg(0), buffer),
            Function::Edit => self.edit(arg(0), arg(1), arg(2), arg(3), buffer),
            Function::InstanceTree => self.instance_tree(arg(0)),
            Function::TreeRoot => self.tree_root(arg(0)),
            Function::NodeType => self.node_type(arg(0)),
            Function::NodeNamedP => self.node_named_p(arg(0)),
            Function::NodeHasErrorP => self.node_has_error_p(arg(0)),
            Function::NodeChildCount => self.node_child_count(arg(0), arg(1)),
            Function::NodeChild => self.node_child(arg(0), arg(1), arg(2)),
            Function::NodeStartByte => self.node_start_byte(arg(0)),
            Function::NodeEndByte => self.node_end_byte(arg(0)),
            Function::NodeByteRange => self.node_byte_range(arg(0)),
            Function::NodeChildForByte => self.node_child_for_byte(arg(0), arg(1), arg(2)),
            Function::NodeParent => self.node_parent(arg(0)),
            Function::NodeNextSibling => self.node_next_sibling(arg(0), arg(1)),
            Function::NodePrevSibling => self.node_prev_sibling(arg(0), arg(1)),
            Function::NodeEq => self.node_eq(arg(0), arg(1)),
        }
    }
}
