//! Removal of "unset" values so the rendered document stays minimal.
//!
//! A value is prunable when it matches the table below. Pruning works
//! bottom-up: children are pruned first, so a mapping that only held
//! prunable values is itself removed from its parent.
//!
//! | Kind      | Prunable values                                  |
//! |-----------|--------------------------------------------------|
//! | null      | always                                           |
//! | string    | `""`, `"null"`, `"default"`, `"0"`, `","`, `"no"` |
//! | number    | zero                                             |
//! | bool      | `false`                                          |
//! | sequence  | empty                                            |
//! | mapping   | empty                                            |

use serde_json::{Map, Value};

/// String scalars that mean "nothing configured".
pub const DEFAULTABLE_STRINGS: [&str; 6] = ["", "null", "default", "0", ",", "no"];

/// Whether `value` is a no-op default that should not be rendered.
pub fn is_defaultable(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => DEFAULTABLE_STRINGS.contains(&s.as_str()),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Prunes `tree` recursively and hands it back.
///
/// Surviving keys keep their insertion order. Sequences are kept as they are;
/// only mappings are descended into.
pub fn prune(mut tree: Map<String, Value>) -> Map<String, Value> {
    prune_in_place(&mut tree);
    tree
}

/// In-place variant of [`prune`].
pub fn prune_in_place(tree: &mut Map<String, Value>) {
    for value in tree.values_mut() {
        if let Value::Object(child) = value {
            prune_in_place(child);
        }
    }
    tree.retain(|_, value| !is_defaultable(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn defaultable_table() {
        let prunable = [
            json!(null),
            json!(""),
            json!([]),
            json!("null"),
            json!({}),
            json!("default"),
            json!(0),
            json!(0.0),
            json!("0"),
            json!(","),
            json!("no"),
            json!(false),
        ];
        for value in &prunable {
            assert!(is_defaultable(value), "{value} should be prunable");
        }
    }

    #[test]
    fn meaningful_values_survive() {
        let kept = [
            json!("nginx:latest"),
            json!(1),
            json!(-1),
            json!(0.5),
            json!(true),
            json!(["a"]),
            json!({"a": 1}),
            json!("none"),
            json!("00"),
            json!(" "),
        ];
        for value in &kept {
            assert!(!is_defaultable(value), "{value} should be kept");
        }
    }

    #[test]
    fn prune_removes_flat_defaults() {
        let tree = object(json!({
            "image": "nginx",
            "user": "",
            "privileged": false,
            "dns": [],
            "cpus": 0,
        }));
        let pruned = prune(tree);
        assert_eq!(Value::Object(pruned), json!({"image": "nginx"}));
    }

    #[test]
    fn prune_cascades_emptied_mappings() {
        let tree = object(json!({
            "image": "nginx",
            "deploy": {
                "resources": {
                    "limits": {"cpus": 0, "memory": "0"},
                    "reservations": {"memory": "0"},
                },
                "restart_policy": {"condition": "no", "max_attempts": 0},
            },
        }));
        let pruned = prune(tree);
        assert!(!pruned.contains_key("deploy"));
        assert_eq!(pruned.len(), 1);
    }

    #[test]
    fn prune_keeps_partially_filled_mappings() {
        let tree = object(json!({
            "deploy": {
                "resources": {
                    "limits": {"cpus": 512, "memory": "0"},
                },
            },
        }));
        let pruned = prune(tree);
        assert_eq!(
            Value::Object(pruned),
            json!({"deploy": {"resources": {"limits": {"cpus": 512}}}})
        );
    }

    #[test]
    fn prune_preserves_order_of_survivors() {
        let tree = object(json!({"a": 1, "b": "", "c": 3, "d": null, "e": 5}));
        let keys: Vec<String> = prune(tree).keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c", "e"]);
    }

    #[test]
    fn prune_is_idempotent() {
        let tree = object(json!({
            "x": {"y": {"z": ""}, "w": 1},
            "v": [],
            "u": ["", 0],
            "t": "default",
        }));
        let once = prune(tree);
        let twice = prune(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn prune_does_not_descend_into_sequences() {
        let tree = object(json!({"environment": ["", "A=1"], "nested": [{"k": ""}]}));
        let pruned = prune(tree);
        assert_eq!(pruned["environment"], json!(["", "A=1"]));
        assert_eq!(pruned["nested"], json!([{"k": ""}]));
    }

    #[test]
    fn prune_empty_tree() {
        assert!(prune(Map::new()).is_empty());
    }
}
