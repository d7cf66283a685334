//! Mutating operations - condition-driven rewrites of a tree.
//!
//! Every operation here is a thin walk configuration: the input is never
//! mutated and the rebuilt tree is returned.

use std::collections::BTreeMap;

use crate::value::Value;
use crate::walk::{VisitContext, Walker};

/// Replaces every node for which `condition` holds with a clone of
/// `replacement`.
pub fn replace<C>(value: &Value, condition: C, replacement: &Value) -> Value
where
    C: Fn(&Value, &VisitContext) -> bool,
{
    replace_with(value, condition, |_, _| replacement.clone())
}

/// Replaces every node for which `condition` holds with the output of
/// `transform`. Replaced composites are walked again, so a transform that
/// reproduces its input must keep the condition from re-matching.
pub fn replace_with<C, T>(value: &Value, condition: C, transform: T) -> Value
where
    C: Fn(&Value, &VisitContext) -> bool,
    T: Fn(&Value, &VisitContext) -> Value,
{
    Walker::new()
        .condition(condition)
        .transform(move |node, ctx| Some(transform(node, ctx)))
        .walk(value)
}

/// Shallow-merges `patch` over every node for which `condition` holds.
/// Matched non-Mappings become `patch` wholesale.
pub fn merge_at<C>(value: &Value, condition: C, patch: &Value) -> Value
where
    C: Fn(&Value, &VisitContext) -> bool,
{
    replace_with(value, condition, |node, _| node.shallow_merge(patch))
}

/// Drops every field and element for which `keep` does not hold. A dropped
/// composite disappears with everything below it; sequences are
/// re-densified.
pub fn remove_by_condition<C>(value: &Value, keep: C) -> Value
where
    C: Fn(&Value, &VisitContext) -> bool,
{
    Walker::new().condition(keep).removing().walk(value)
}

/// Drops every Null field and element, at all depths.
pub fn remove_nulls(value: &Value) -> Value {
    remove_by_condition(value, |node, _| !node.is_null())
}

/// Drops every blank field and element (Null, `false`, and the empty
/// string). Numbers and empty composites are never blank.
pub fn remove_falsy(value: &Value) -> Value {
    remove_by_condition(value, |node, _| !node.is_blank())
}

/// Rewrites Mapping field names through `mapping` at all depths; names
/// absent from the mapping pass through unchanged.
pub fn rename_keys(value: &Value, mapping: &BTreeMap<String, String>) -> Value {
    Walker::new().key_mapping(mapping).walk(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_replace_matching_values() {
        let value = from_json(r#"{"a": 1, "b": 2, "c": {"d": 1}}"#).unwrap();
        let replaced = replace(&value, |v, _| v == &Value::Int(1), &Value::from("x"));
        assert_eq!(
            replaced,
            from_json(r#"{"a": "x", "b": 2, "c": {"d": "x"}}"#).unwrap()
        );
    }

    #[test]
    fn test_replace_with_derives_from_node() {
        let value = from_json(r#"{"a": 2, "b": {"c": 3}}"#).unwrap();
        let doubled = replace_with(
            &value,
            |v, _| v.as_int().is_some(),
            |v, _| Value::Int(v.as_int().unwrap_or(0) * 2),
        );
        assert_eq!(doubled, from_json(r#"{"a": 4, "b": {"c": 6}}"#).unwrap());
    }

    #[test]
    fn test_replace_with_sees_context() {
        let value = from_json(r#"{"a": 1, "b": 1}"#).unwrap();
        let replaced = replace_with(
            &value,
            |_, ctx| ctx.key == Some("b"),
            |_, _| Value::Int(9),
        );
        assert_eq!(replaced, from_json(r#"{"a": 1, "b": 9}"#).unwrap());
    }

    #[test]
    fn test_merge_at_overlays_matched_mappings() {
        let value = from_json(
            r#"{"items": [{"id": 1, "status": "old"}, {"id": 2, "status": "old"}]}"#,
        )
        .unwrap();
        let patch = from_json(r#"{"status": "new", "extra": true}"#).unwrap();

        let merged = merge_at(&value, |v, _| v.get("id") == Some(&Value::Int(1)), &patch);
        assert_eq!(
            merged,
            from_json(
                r#"{"items": [
                    {"id": 1, "status": "new", "extra": true},
                    {"id": 2, "status": "old"}
                ]}"#,
            )
            .unwrap()
        );
    }

    #[test]
    fn test_merge_at_root() {
        let value = from_json(r#"{"kept": 1}"#).unwrap();
        let patch = from_json(r#"{"added": 2}"#).unwrap();

        let merged = merge_at(&value, |_, ctx| ctx.key.is_none(), &patch);
        assert_eq!(merged, from_json(r#"{"kept": 1, "added": 2}"#).unwrap());
    }

    #[test]
    fn test_remove_by_condition_keeps_passing_entries() {
        let value = from_json(r#"{"a": null, "b": 1}"#).unwrap();
        let cleaned = remove_by_condition(&value, |v, _| !v.is_null());
        assert_eq!(cleaned, from_json(r#"{"b": 1}"#).unwrap());
    }

    #[test]
    fn test_remove_nulls_recurses_and_redensifies() {
        let value = from_json(
            r#"{"a": null, "list": [1, null, 2], "nested": {"x": null, "y": 2}}"#,
        )
        .unwrap();
        assert_eq!(
            remove_nulls(&value),
            from_json(r#"{"list": [1, 2], "nested": {"y": 2}}"#).unwrap()
        );
    }

    #[test]
    fn test_remove_falsy_spares_numbers() {
        let value = from_json(r#"{"a": "", "b": false, "c": 0, "d": "keep"}"#).unwrap();
        assert_eq!(
            remove_falsy(&value),
            from_json(r#"{"c": 0, "d": "keep"}"#).unwrap()
        );
    }

    #[test]
    fn test_rename_keys_at_all_depths() {
        let value = from_json(r#"{"old": 1, "wrap": {"old": 2}, "list": [{"old": 3}]}"#).unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("old".to_string(), "new".to_string());

        assert_eq!(
            rename_keys(&value, &mapping),
            from_json(r#"{"new": 1, "wrap": {"new": 2}, "list": [{"new": 3}]}"#).unwrap()
        );
    }

    #[test]
    fn test_mutations_never_touch_input() {
        let value = from_json(r#"{"a": null, "b": {"c": 1}}"#).unwrap();
        let snapshot = value.clone();
        let _ = remove_nulls(&value);
        let _ = replace(&value, |_, _| true, &Value::Null);
        assert_eq!(value, snapshot);
    }
}
