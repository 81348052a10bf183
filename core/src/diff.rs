//! Structural diff between two JSON trees.
//!
//! `diff(remote, local)` produces the JSON Patch that turns `remote` into
//! `local`. Keys of each container are visited in reverse order (last object
//! key first, highest array index first), so removals of sibling array
//! elements stay valid when applied in sequence. Additions for keys that
//! only exist locally follow the removals of the same container.
//!
//! `diff_removals` keeps only the `remove` operations. That subset deletes
//! remote keys that are absent locally and never writes local content.

use serde_json::Value;

use crate::patch::{escape_pointer_segment, PatchOperation};

/// Full patch transforming `remote` into `local`.
pub fn diff(remote: &Value, local: &Value) -> Vec<PatchOperation> {
    let mut operations = Vec::new();
    generate(remote, local, "", &mut operations);
    operations
}

/// Only the `remove` operations of `diff(remote, local)`, in the same order.
pub fn diff_removals(remote: &Value, local: &Value) -> Vec<PatchOperation> {
    diff(remote, local)
        .into_iter()
        .filter(PatchOperation::is_remove)
        .collect()
}

fn generate(old: &Value, new: &Value, path: &str, operations: &mut Vec<PatchOperation>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, old_value) in old_map.iter().rev() {
                let child = format!("{path}/{}", escape_pointer_segment(key));
                match new_map.get(key) {
                    Some(new_value) => generate(old_value, new_value, &child, operations),
                    None => operations.push(PatchOperation::Remove { path: child }),
                }
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    operations.push(PatchOperation::Add {
                        path: format!("{path}/{}", escape_pointer_segment(key)),
                        value: new_value.clone(),
                    });
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            for (index, old_value) in old_items.iter().enumerate().rev() {
                let child = format!("{path}/{index}");
                match new_items.get(index) {
                    Some(new_value) => generate(old_value, new_value, &child, operations),
                    None => operations.push(PatchOperation::Remove { path: child }),
                }
            }
            for (index, new_value) in new_items.iter().enumerate().skip(old_items.len()) {
                operations.push(PatchOperation::Add {
                    path: format!("{path}/{index}"),
                    value: new_value.clone(),
                });
            }
        }
        _ if old != new => operations.push(PatchOperation::Replace {
            path: path.to_string(),
            value: new.clone(),
        }),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::apply;
    use serde_json::json;

    fn paths(operations: &[PatchOperation]) -> Vec<(&str, &str)> {
        operations.iter().map(|op| (op.op(), op.path())).collect()
    }

    #[test]
    fn removals_skip_local_only_keys() {
        let remote = json!({
            "topLevelKey": "topLevelValue",
            "topLevelObject": {"secondLevelKey": "secondLevelValue"}
        });
        let local = json!({
            "anotherTopLevelKey": "anotherTopLevelValue",
            "topLevelObject": {"anotherSecondLevelKey": "anotherSecondLevelValue"}
        });

        assert_eq!(
            diff_removals(&remote, &local),
            vec![
                PatchOperation::remove("/topLevelObject/secondLevelKey"),
                PatchOperation::remove("/topLevelKey"),
            ]
        );
    }

    #[test]
    fn full_diff_includes_adds_and_replaces() {
        let remote = json!({"a": 1, "b": {"c": 2}, "d": true});
        let local = json!({"a": 2, "b": {"c": 2, "e": 3}, "f": null});
        assert_eq!(
            paths(&diff(&remote, &local)),
            [
                ("remove", "/d"),
                ("add", "/b/e"),
                ("replace", "/a"),
                ("add", "/f"),
            ]
        );
    }

    #[test]
    fn identical_trees_produce_nothing() {
        let tree = json!({"a": [1, {"b": "c"}], "d": null});
        assert!(diff(&tree, &tree).is_empty());
    }

    #[test]
    fn array_removals_run_highest_index_first() {
        let remote = json!({"items": ["a", "b", "c", "d"]});
        let local = json!({"items": ["a", "b"]});
        let removals = diff_removals(&remote, &local);
        assert_eq!(
            removals,
            vec![PatchOperation::remove("/items/3"), PatchOperation::remove("/items/2")]
        );

        let mut patched = remote.clone();
        apply(&mut patched, &removals).unwrap();
        assert_eq!(patched, local);
    }

    #[test]
    fn kind_mismatch_is_a_replace_not_a_removal() {
        let remote = json!({"a": {"nested": 1}, "b": [1]});
        let local = json!({"a": "flat", "b": {"0": 1}});
        assert!(diff_removals(&remote, &local).is_empty());
        assert_eq!(paths(&diff(&remote, &local)), [("replace", "/b"), ("replace", "/a")]);
    }

    #[test]
    fn keys_are_escaped_in_paths() {
        let remote = json!({"a/b": 1, "c~d": 2});
        let removals = diff_removals(&remote, &json!({}));
        assert_eq!(paths(&removals), [("remove", "/c~0d"), ("remove", "/a~1b")]);
    }

    #[test]
    fn applying_removals_leaves_no_remote_only_keys() {
        let remote = json!({
            "title": "t",
            "pages": {
                "home": {"header": "h", "footer": "f"},
                "about": {"body": "b"}
            },
            "tags": ["x", "y", "z"]
        });
        let local = json!({
            "pages": {"home": {"header": "changed", "sidebar": "s"}},
            "tags": ["x"],
            "extra": 1
        });

        let removals = diff_removals(&remote, &local);
        assert!(removals.iter().all(PatchOperation::is_remove));

        let mut patched = remote.clone();
        apply(&mut patched, &removals).unwrap();
        assert_eq!(
            patched,
            json!({
                "pages": {"home": {"header": "h"}},
                "tags": ["x"]
            })
        );
    }
}
