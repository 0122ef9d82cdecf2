use crate::common::{child, finalize_all, int, parsed_json, snapshot};
use yeast::{Module, Value, YeastError};

#[test]
fn empty_object_has_no_named_children() {
    let (mut module, instance) = parsed_json("{}");
    let (tree, root) = snapshot(&mut module, &instance);

    assert_eq!(module.node_type(&root).unwrap(), Value::symbol("document"));
    let object = child(&mut module, &root, 0);
    assert_eq!(module.node_type(&object).unwrap(), Value::symbol("object"));
    assert_eq!(int(module.node_child_count(&object, &Value::Nil).unwrap()), 0);
    // The braces are still there as anonymous children.
    assert_eq!(int(module.node_child_count(&object, &Value::T).unwrap()), 2);

    finalize_all(&mut module, &[instance, tree, root, object]);
}

#[test]
fn snapshot_before_first_parse_is_no_tree() {
    let mut module = Module::new();
    let instance = module.make_instance(&Value::symbol("json")).unwrap();

    let err = module.instance_tree(&instance).unwrap_err();
    assert!(matches!(err, YeastError::NoTree));
    assert_eq!(err.symbol(), "yeast-no-tree");
    assert_eq!(module.store().len(), 1);
    assert_eq!(module.store().stats().trees_created, 0);

    finalize_all(&mut module, &[instance]);
}

#[test]
fn edit_grows_the_root_to_the_new_length() {
    let (mut module, instance) = parsed_json("{\"a\":1}");
    let after = "{\"a\":12}";

    // `1` at 5..6 became `12` at 5..7.
    let ok = module
        .edit(
            &instance,
            &Value::Integer(5),
            &Value::Integer(7),
            &Value::Integer(1),
            after,
        )
        .unwrap();
    assert_eq!(ok, Value::T);

    let (tree, root) = snapshot(&mut module, &instance);
    assert_eq!(int(module.node_end_byte(&root).unwrap()), after.len() as i64);

    let object = child(&mut module, &root, 0);
    let pair = child(&mut module, &object, 0);
    let value = module
        .node_child_for_byte(&pair, &Value::Integer(5), &Value::Nil)
        .unwrap();
    assert_eq!(module.node_type(&value).unwrap(), Value::symbol("number"));
    assert_eq!(
        module.node_byte_range(&value).unwrap(),
        Value::cons(Value::Integer(5), Value::Integer(7))
    );

    finalize_all(&mut module, &[value, pair, object, root, tree, instance]);
}

#[test]
fn unsupported_grammar_leaks_no_parser() {
    let mut module = Module::new();
    let err = module.make_instance(&Value::symbol("cobol")).unwrap_err();

    match &err {
        YeastError::UnknownGrammar { tag, .. } => assert_eq!(tag, "cobol"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("cobol"));
    assert!(module.store().is_empty());
    assert_eq!(module.store().stats().parsers_created, 0);
}

#[test]
fn foreign_values_are_wrong_type() {
    let (mut module, instance) = parsed_json("[]");
    let foreign = Value::Foreign(0x1234);

    assert_eq!(module.instance_p(&foreign), Value::Nil);
    let err = module.tree_root(&foreign).unwrap_err();
    assert_eq!(err.symbol(), "wrong-type-argument");
    let err = module.node_type(&instance).unwrap_err();
    assert!(matches!(err, YeastError::WrongType { expected: "yeast-node-p", .. }));
    assert!(module.finalize(&foreign).is_err());

    finalize_all(&mut module, &[instance]);
}

#[test]
fn empty_document_root_and_out_of_range_child() {
    let (mut module, instance) = parsed_json("");
    let (tree, root) = snapshot(&mut module, &instance);

    assert!(module.node_p(&root).is_truthy());
    assert_eq!(int(module.node_child_count(&root, &Value::T).unwrap()), 0);
    assert_eq!(child(&mut module, &root, 0), Value::Nil);
    assert_eq!(child(&mut module, &root, 1000), Value::Nil);
    assert_eq!(module.node_parent(&root).unwrap(), Value::Nil);

    finalize_all(&mut module, &[tree, instance, root]);
}

#[test]
fn funcall_drives_a_whole_session() {
    let source = "[1, 2, 3]";
    let mut module = Module::new();
    let call = |module: &mut Module, name: &str, args: &[Value]| {
        module.funcall(name, args, source).unwrap()
    };

    let instance = call(&mut module, "yeast-make-instance", &[Value::symbol("json")]);
    assert_eq!(call(&mut module, "yeast-parse", &[instance.clone()]), Value::T);
    let tree = call(&mut module, "yeast-instance-tree", &[instance.clone()]);
    let root = call(&mut module, "yeast-tree-root", &[tree.clone()]);
    let array = call(&mut module, "yeast-node-child", &[root.clone(), Value::Integer(0)]);
    let last = call(
        &mut module,
        "yeast-node-child",
        &[array.clone(), Value::Integer(2)],
    );
    let again = call(
        &mut module,
        "yeast-node-child-for-byte",
        &[array.clone(), Value::Integer(7)],
    );

    assert_eq!(call(&mut module, "yeast-node-eq", &[last.clone(), again.clone()]), Value::T);
    assert_eq!(call(&mut module, "yeast-node-eq", &[last.clone(), Value::Nil]), Value::Nil);
    assert_eq!(
        call(&mut module, "yeast-instance-grammar", &[instance.clone()]),
        Value::symbol("json")
    );

    let err = module
        .funcall("yeast-node-eq", &[last.clone()], source)
        .unwrap_err();
    assert_eq!(err.symbol(), "wrong-number-of-arguments");

    finalize_all(&mut module, &[again, last, array, root, tree, instance]);
}
