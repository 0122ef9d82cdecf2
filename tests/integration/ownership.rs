//! Random finalization orders over a whole Instance -> Tree -> Node graph.

use proptest::prelude::*;
use std::collections::HashSet;
use yeast::{Handle, Kind, Module, Value};

const TEXTS: [&str; 3] = ["[1, 2, 3]", "[[true], {\"k\": 4}, null]", "[\"x\", 5]"];

struct Graph {
    module: Module,
    values: Vec<Value>,
}

/// One instance, `trees` snapshots taken across reparses, and for each
/// snapshot its root, the array under it and `nodes` children of that array.
fn build(trees: usize, nodes: usize) -> Graph {
    let mut module = Module::new();
    let instance = module.make_instance(&Value::symbol("json")).unwrap();
    let mut values = vec![instance.clone()];

    for t in 0..trees {
        module.parse(&instance, TEXTS[t % TEXTS.len()]).unwrap();
        let tree = module.instance_tree(&instance).unwrap();
        let root = module.tree_root(&tree).unwrap();
        let array = module
            .node_child(&root, &Value::Integer(0), &Value::Nil)
            .unwrap();
        values.extend([tree, root, array.clone()]);
        for n in 0..nodes {
            let node = module
                .node_child(&array, &Value::Integer((n % 2) as i64), &Value::T)
                .unwrap();
            assert!(node.as_handle().is_some());
            values.push(node);
        }
    }
    Graph { module, values }
}

/// Every live object's count matches the owners still pointing at it.
fn check_counts(module: &Module, values: &[Value], finalized: &HashSet<Handle>) {
    let store = module.store();
    for value in values {
        let handle = value.as_handle().unwrap();
        if !store.contains(handle) {
            continue;
        }
        let own = u32::from(!finalized.contains(&handle));
        let owners = values
            .iter()
            .filter(|other| match store.type_of(other) {
                Some(Kind::Tree) => store.snapshot(other).unwrap().1.instance() == handle,
                Some(Kind::Node) => store.node(other).unwrap().1.tree() == handle,
                _ => false,
            })
            .count() as u32;

        match store.type_of(value) {
            Some(Kind::Node) => assert_eq!(store.refcount(handle), Some(0)),
            Some(_) => assert_eq!(store.refcount(handle), Some(own + owners)),
            None => unreachable!("contains() said the handle was live"),
        }
    }
}

fn graph_and_order() -> impl Strategy<Value = (usize, usize, Vec<usize>)> {
    (1usize..4, 0usize..4).prop_flat_map(|(trees, nodes)| {
        let total = 1 + trees * (3 + nodes);
        (
            Just(trees),
            Just(nodes),
            Just((0..total).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_finalize_order_frees_everything_exactly_once(
        (trees, nodes, order) in graph_and_order()
    ) {
        let Graph { mut module, values } = build(trees, nodes);
        prop_assert_eq!(values.len(), order.len());

        let mut finalized = HashSet::new();
        for index in order {
            let value = &values[index];
            let handle = value.as_handle().unwrap();
            module.finalize(value).unwrap();
            finalized.insert(handle);

            // A second finalize is always rejected.
            prop_assert!(module.finalize(value).is_err());

            let stats = module.store().stats();
            prop_assert!(stats.parsers_freed <= stats.parsers_created);
            prop_assert!(stats.trees_freed <= stats.trees_created);
            check_counts(&module, &values, &finalized);
        }

        prop_assert!(module.store().is_empty());
        let stats = module.store().stats();
        prop_assert!(stats.is_balanced());
        prop_assert_eq!(stats.parsers_freed, 1);
        prop_assert_eq!(stats.trees_created, stats.trees_freed);
    }

    #[test]
    fn reachable_objects_stay_usable(
        (trees, nodes, order) in graph_and_order(),
        keep in any::<prop::sample::Index>()
    ) {
        let Graph { mut module, values } = build(trees, nodes);
        let kept = keep.index(values.len());

        for index in order.into_iter().filter(|&i| i != kept) {
            module.finalize(&values[index]).unwrap();
        }

        // Whatever survived can still be used, and so can everything it owns.
        let value = &values[kept];
        prop_assert_eq!(module.store().handles(), vec![value.as_handle().unwrap()]);
        match module.store().type_of(value) {
            Some(Kind::Instance) => {
                let reparsed = module.parse(value, "{}").unwrap();
                prop_assert!(reparsed.is_truthy());
            }
            Some(Kind::Tree) => {
                let root = module.tree_root(value).unwrap();
                module.finalize(&root).unwrap();
            }
            Some(Kind::Node) => {
                prop_assert!(module.node_type(value).is_ok());
                prop_assert!(module.node_end_byte(value).is_ok());
            }
            None => prop_assert!(false, "kept handle was freed"),
        }
        prop_assert_eq!(module.store().stats().live_parsers(), 1);

        module.finalize(value).unwrap();
        prop_assert!(module.store().is_empty());
        prop_assert!(module.store().stats().is_balanced());
    }
}
