use crate::common::{finalize_all, parsed_json, sexp};
use ropey::Rope;
use std::borrow::Cow;
use yeast::{Module, TextBuffer, Value};

#[test]
fn reparse_without_edit_is_idempotent() {
    let (mut module, instance) = parsed_json("[1, 2]");
    let after = "[1, 2, {\"k\": [false]}]";
    module
        .edit(
            &instance,
            &Value::Integer(5),
            &Value::Integer(21),
            &Value::Integer(0),
            after,
        )
        .unwrap();
    let first = sexp(&module, &instance);

    assert_eq!(module.parse(&instance, after).unwrap(), Value::T);
    assert_eq!(sexp(&module, &instance), first);
    assert_eq!(module.parse(&instance, after).unwrap(), Value::T);
    assert_eq!(sexp(&module, &instance), first);

    let stats = module.store().stats();
    assert_eq!(stats.trees_created, 4);
    assert_eq!(stats.live_trees(), 1);

    finalize_all(&mut module, &[instance]);
}

#[test]
fn sequence_of_edits_matches_a_fresh_parse() {
    let mut text = String::from("{\"a\": 1}");
    let (mut module, instance) = parsed_json(&text);

    // (start, old end, replacement) applied in order.
    let edits = [(6, 7, "[1, 2]"), (1, 4, "\"bb\""), (13, 13, ", \"c\": null")];
    for (start, old_end, replacement) in edits {
        text.replace_range(start..old_end, replacement);
        let new_end = start + replacement.len();
        let ok = module
            .edit(
                &instance,
                &Value::Integer(start as i64),
                &Value::Integer(new_end as i64),
                &Value::Integer((old_end - start) as i64),
                text.as_str(),
            )
            .unwrap();
        assert_eq!(ok, Value::T);
    }
    assert_eq!(text, "{\"bb\": [1, 2], \"c\": null}");

    let fresh = module.make_instance(&Value::symbol("json")).unwrap();
    module.parse(&fresh, text.as_str()).unwrap();
    assert_eq!(sexp(&module, &instance), sexp(&module, &fresh));

    finalize_all(&mut module, &[fresh, instance]);
}

#[test]
fn rope_buffers_parse_like_strings() {
    let source = "[\"é\", \"ü\", 3]\n".repeat(300);
    let rope = Rope::from_str(&source);

    let mut module = Module::with_chunk_size(64);
    let from_rope = module.make_instance(&Value::symbol("json")).unwrap();
    let from_str = module.make_instance(&Value::symbol("json")).unwrap();
    assert_eq!(module.parse(&from_rope, &rope).unwrap(), Value::T);
    assert_eq!(module.parse(&from_str, source.as_str()).unwrap(), Value::T);
    assert_eq!(sexp(&module, &from_rope), sexp(&module, &from_str));

    finalize_all(&mut module, &[from_rope, from_str]);
}

/// Reports one byte more than it holds.
struct Truncated(&'static str);

impl TextBuffer for Truncated {
    fn buffer_size(&self) -> usize {
        self.0.len() + 1
    }

    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]> {
        self.0.read_range(offset, count)
    }
}

#[test]
fn short_read_reports_failure_but_still_installs_a_tree() {
    let mut module = Module::new();
    let instance = module.make_instance(&Value::symbol("json")).unwrap();

    let ok = module.parse(&instance, &Truncated("[1, 2]")).unwrap();
    assert_eq!(ok, Value::Nil);
    // Input ended at the first short read, before any byte was handed over.
    assert_eq!(sexp(&module, &instance), "(document)");

    let tree = module.instance_tree(&instance).unwrap();
    finalize_all(&mut module, &[tree, instance]);
}
