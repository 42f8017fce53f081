// 🌲 Recursive Extractor - pull account names out of schema-less JSON
// Used by scanners whose source layout is not fixed (CurseForge, Modrinth, deep search).

use crate::collector::{Collector, SubmitOutcome};
use serde_json::Value;

/// Descent stops silently past this depth
pub const MAX_DEPTH: usize = 10;

/// Keys (compared lowercase) whose string values are candidate names
pub const NAME_KEYS: &[&str] = &[
    "username",
    "name",
    "displayname",
    "playername",
    "minecraftusername",
];

fn is_name_key(key: &str) -> bool {
    let key = key.to_lowercase();
    NAME_KEYS.contains(&key.as_str())
}

/// Walk `node` and submit every name found under a known key.
///
/// Matched keys are never descended into, even when their value is not a
/// string. Returns the outcome of each submission in walk order.
pub fn extract(
    node: &Value,
    provenance: &str,
    collector: &Collector,
) -> Vec<SubmitOutcome> {
    let mut outcomes = Vec::new();
    walk(node, 0, &mut |name| {
        outcomes.push(collector.submit(name, provenance));
    });
    outcomes
}

/// Candidate names under known keys, without submitting them
pub fn candidates(node: &Value) -> Vec<String> {
    let mut names = Vec::new();
    walk(node, 0, &mut |name| names.push(name.to_string()));
    names
}

fn walk(node: &Value, depth: usize, emit: &mut dyn FnMut(&str)) {
    if depth > MAX_DEPTH {
        return;
    }

    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if is_name_key(key) {
                    if let Value::String(name) = value {
                        emit(name);
                    }
                } else {
                    walk(value, depth + 1, emit);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, emit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nest(levels: usize, leaf: Value) -> Value {
        (0..levels).fold(leaf, |inner, i| json!({ format!("level{}", i): inner }))
    }

    #[test]
    fn test_only_valid_names_are_collected() {
        let collector = Collector::new();
        let data = json!({
            "profile": { "name": "Alex123" },
            "other": { "username": "bad name!" }
        });

        extract(&data, "Test", &collector);

        let records = collector.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "Alex123");
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let data = json!({
            "DisplayName": "First1",
            "PlayerName": "Second2",
            "minecraftUsername": "Third3",
            "title": "NotAName"
        });
        let mut names = candidates(&data);
        names.sort();
        assert_eq!(names, vec!["First1", "Second2", "Third3"]);
    }

    #[test]
    fn test_arrays_are_walked() {
        let data = json!({ "accounts": [ { "username": "One111" }, { "username": "Two222" } ] });
        assert_eq!(candidates(&data), vec!["One111", "Two222"]);
    }

    #[test]
    fn test_matched_key_is_not_descended() {
        let data = json!({ "name": { "username": "Hidden1" } });
        assert!(candidates(&data).is_empty());
    }

    #[test]
    fn test_depth_bound_stops_descent() {
        // 15 levels deep overall, the only name sits in the object at depth 12
        let leaf = json!({ "username": "TooDeep1", "more": nest(3, json!({})) });
        let deep = nest(12, leaf);
        let collector = Collector::new();
        extract(&deep, "Test", &collector);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_name_at_bound_is_found() {
        let at_bound = nest(MAX_DEPTH, json!({ "username": "JustFits" }));
        assert_eq!(candidates(&at_bound), vec!["JustFits"]);

        let past_bound = nest(MAX_DEPTH + 1, json!({ "username": "JustMiss" }));
        assert!(candidates(&past_bound).is_empty());
    }

    #[test]
    fn test_scalars_ignored() {
        assert!(candidates(&json!("Steve")).is_empty());
        assert!(candidates(&json!([1, true, null])).is_empty());
    }
}
