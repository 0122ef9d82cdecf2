use crate::common::{child, finalize_all, int, parsed_json, snapshot};
use yeast::Value;

#[test]
fn snapshots_on_both_sides_of_an_edit_stay_traversable() {
    let (mut module, instance) = parsed_json("[1]");
    let (old_tree, old_root) = snapshot(&mut module, &instance);

    // "[1]" -> "[1, 2]": `]` at 2..3 became `, 2]` at 2..6.
    module
        .edit(
            &instance,
            &Value::Integer(2),
            &Value::Integer(6),
            &Value::Integer(1),
            "[1, 2]",
        )
        .unwrap();
    let (new_tree, new_root) = snapshot(&mut module, &instance);

    let old_array = child(&mut module, &old_root, 0);
    let new_array = child(&mut module, &new_root, 0);
    assert_eq!(int(module.node_child_count(&old_array, &Value::Nil).unwrap()), 1);
    assert_eq!(int(module.node_child_count(&new_array, &Value::Nil).unwrap()), 2);
    assert_eq!(int(module.node_end_byte(&old_root).unwrap()), 3);
    assert_eq!(int(module.node_end_byte(&new_root).unwrap()), 6);
    assert_eq!(module.node_eq(&old_array, &new_array).unwrap(), Value::Nil);

    // The instance going away first must not disturb either snapshot.
    module.finalize(&instance).unwrap();
    let second = child(&mut module, &new_array, 1);
    assert_eq!(
        module.node_byte_range(&second).unwrap(),
        Value::cons(Value::Integer(4), Value::Integer(5))
    );
    assert_eq!(module.store().stats().live_parsers(), 1);

    finalize_all(
        &mut module,
        &[old_tree, new_tree, second, old_root, new_array, old_array, new_root],
    );
}

#[test]
fn reparse_does_not_change_an_existing_snapshot() {
    let (mut module, instance) = parsed_json("[true]");
    let (tree, root) = snapshot(&mut module, &instance);

    module
        .edit(
            &instance,
            &Value::Integer(0),
            &Value::Integer(11),
            &Value::Integer(6),
            "{\"x\": null}",
        )
        .unwrap();
    let value = child(&mut module, &root, 0);
    assert_eq!(module.node_type(&value).unwrap(), Value::symbol("array"));

    let (fresh_tree, fresh_root) = snapshot(&mut module, &instance);
    let fresh = child(&mut module, &fresh_root, 0);
    assert_eq!(module.node_type(&fresh).unwrap(), Value::symbol("object"));

    finalize_all(
        &mut module,
        &[value, root, tree, fresh, fresh_root, fresh_tree, instance],
    );
}

#[test]
fn each_node_handle_holds_its_own_tree_reference() {
    let (mut module, instance) = parsed_json("[1, 2]");
    let (tree, root) = snapshot(&mut module, &instance);
    let tree_handle = tree.as_handle().unwrap();

    let a = child(&mut module, &root, 0);
    let b = child(&mut module, &root, 0);
    assert_eq!(module.node_eq(&a, &b).unwrap(), Value::T);
    // Own reference plus root, a and b.
    assert_eq!(module.store().refcount(tree_handle), Some(4));

    module.finalize(&a).unwrap();
    module.finalize(&tree).unwrap();
    assert_eq!(module.store().refcount(tree_handle), Some(2));
    assert_eq!(module.node_type(&b).unwrap(), Value::symbol("array"));

    finalize_all(&mut module, &[b, root, instance]);
}
