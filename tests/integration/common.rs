use yeast::{Module, Value};

/// A module with one json instance that has parsed `source`.
pub fn parsed_json(source: &str) -> (Module, Value) {
    let mut module = Module::new();
    let instance = module.make_instance(&Value::symbol("json")).unwrap();
    assert_eq!(module.parse(&instance, source).unwrap(), Value::T);
    (module, instance)
}

/// Snapshot `instance` and return the tree with its root node.
pub fn snapshot(module: &mut Module, instance: &Value) -> (Value, Value) {
    let tree = module.instance_tree(instance).unwrap();
    let root = module.tree_root(&tree).unwrap();
    (tree, root)
}

pub fn child(module: &mut Module, node: &Value, index: i64) -> Value {
    module
        .node_child(node, &Value::Integer(index), &Value::Nil)
        .unwrap()
}

pub fn int(value: Value) -> i64 {
    value.as_integer().expect("integer result")
}

/// S-expression of `instance`'s canonical tree.
pub fn sexp(module: &Module, instance: &Value) -> String {
    let (_, instance) = module.store().instance(instance).unwrap();
    instance.tree().unwrap().root_node().to_sexp()
}

/// Finalize every value in order and check nothing is left behind.
pub fn finalize_all(module: &mut Module, values: &[Value]) {
    for value in values {
        module.finalize(value).unwrap();
    }
    assert!(module.store().is_empty(), "objects left: {}", module.store().len());
    assert!(module.store().stats().is_balanced());
}
