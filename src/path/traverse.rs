//! Chain-driven reads and structural writes.
//!
//! Every segment of a chain is interpreted against the value it reaches:
//! a Mapping consumes the segment's `key` as a field descent (optionally
//! selecting an element of the sequence stored there), while a Sequence
//! consumes the segment as an element matcher, comparing each element's
//! `key` field against the segment value. Writes rebuild every container
//! along the chain and never mutate the input. Missing containers are
//! created on the way down, so a write into an empty tree produces the
//! full path.

use crate::error::Error;
use crate::reconcile::upsert_by_key;
use crate::value::Value;

use super::selector::{is_field_chain, Selector};

/// Identity field assumed when a sequence upsert has no explicit one.
pub const DEFAULT_ELEMENT_KEY: &str = "id";

/// Reads the value a chain addresses. A segment with an element value
/// resolves to the matched element itself, so reading back a path that
/// was just written yields the written element. Absence anywhere along
/// the chain yields `Ok(None)`; only an empty chain is an error.
pub fn read_at(tree: &Value, chain: &[Selector]) -> Result<Option<Value>, Error> {
    if chain.is_empty() {
        return Err(Error::EmptySelectorChain);
    }
    Ok(read_chain(Some(tree), chain))
}

/// True when the chain resolves to a present value.
pub fn exists_at(tree: &Value, chain: &[Selector]) -> Result<bool, Error> {
    Ok(read_at(tree, chain)?.is_some())
}

/// Writes `value` at the position the chain addresses and returns the
/// rebuilt tree.
///
/// A chain of plain field segments is a nested field set. When the last
/// segment selects a sequence element, the payload is merged over the
/// matched element (payload fields win) with the element's identity field
/// forced to the segment value; an unmatched selection appends. Writing a
/// Mapping payload onto an existing Mapping field merges shallowly,
/// anything else overwrites.
pub fn write_at(tree: &Value, chain: &[Selector], value: &Value) -> Result<Value, Error> {
    let (last, locator) = match chain.split_last() {
        Some(split) => split,
        None => return Err(Error::EmptySelectorChain),
    };
    if is_field_chain(chain) {
        let keys: Vec<&str> = chain.iter().map(|s| s.key.as_str()).collect();
        return Ok(set_nested(tree, &keys, value));
    }
    Ok(rebuild_chain(Some(tree), locator, &|located| {
        write_terminal(located, last, value)
    }))
}

/// Removes what the last segment addresses and returns the rebuilt tree.
///
/// Against a Sequence the first matching element is dropped; against a
/// Mapping the addressed field is set to Null. A single-segment chain
/// applies directly to the root.
pub fn remove_at(tree: &Value, chain: &[Selector]) -> Result<Value, Error> {
    let (last, locator) = match chain.split_last() {
        Some(split) => split,
        None => return Err(Error::EmptySelectorChain),
    };
    Ok(rebuild_chain(Some(tree), locator, &|located| {
        remove_terminal(located, last)
    }))
}

/// Plain nested field set. Intermediate values that are not Mappings are
/// replaced by fresh ones; an empty key list leaves the tree unchanged.
pub fn set_nested(tree: &Value, keys: &[&str], value: &Value) -> Value {
    let (first, rest) = match keys.split_first() {
        Some(split) => split,
        None => return tree.clone(),
    };
    let mut fields = tree.as_map().cloned().unwrap_or_default();
    let next = if rest.is_empty() {
        value.clone()
    } else {
        set_nested(fields.get(first).unwrap_or(&Value::Null), rest, value)
    };
    fields.set((*first).to_string(), next);
    Value::Map(fields)
}

fn read_chain(target: Option<&Value>, chain: &[Selector]) -> Option<Value> {
    let (segment, rest) = match chain.split_first() {
        Some(split) => split,
        None => return target.cloned(),
    };
    match target? {
        Value::List(items) => {
            let needle = segment.element_value.as_deref()?;
            let index = find_position(items, Some(&segment.key), needle)?;
            read_chain(Some(&items[index]), rest)
        }
        Value::Map(fields) => match segment.element_value.as_deref() {
            Some(needle) => {
                let seq = fields.get(&segment.key)?.as_list()?;
                let index = find_position(seq, segment.element_key.as_deref(), needle)?;
                read_chain(Some(&seq[index]), rest)
            }
            None => read_chain(fields.get(&segment.key), rest),
        },
        _ => None,
    }
}

/// Walks the locator segments rebuilding containers, then hands the
/// located value to `apply` and splices its result back in. Selected
/// elements get their identity field restamped on the way up so an
/// element created by `apply` lands addressable.
fn rebuild_chain(
    target: Option<&Value>,
    chain: &[Selector],
    apply: &dyn Fn(Option<&Value>) -> Value,
) -> Value {
    let (segment, rest) = match chain.split_first() {
        Some(split) => split,
        None => return apply(target),
    };
    match target {
        Some(Value::List(items)) => {
            let position = segment
                .element_value
                .as_deref()
                .and_then(|needle| find_position(items, Some(&segment.key), needle));
            let updated = rebuild_chain(position.map(|i| &items[i]), rest, apply);
            let updated =
                stamp_identity(updated, Some(&segment.key), segment.element_value.as_deref());
            Value::List(replace_or_append(items, position, updated))
        }
        other => {
            let mut fields = other.and_then(Value::as_map).cloned().unwrap_or_default();
            match segment.element_value.as_deref() {
                Some(needle) => {
                    let seq = fields
                        .get(&segment.key)
                        .and_then(Value::as_list)
                        .cloned()
                        .unwrap_or_default();
                    let match_field = segment.element_key.as_deref();
                    let position = find_position(&seq, match_field, needle);
                    let updated = rebuild_chain(position.map(|i| &seq[i]), rest, apply);
                    let updated = stamp_identity(updated, match_field, Some(needle));
                    fields.set(
                        segment.key.clone(),
                        Value::List(replace_or_append(&seq, position, updated)),
                    );
                }
                None => {
                    let updated = rebuild_chain(fields.get(&segment.key), rest, apply);
                    fields.set(segment.key.clone(), updated);
                }
            }
            Value::Map(fields)
        }
    }
}

fn write_terminal(container: Option<&Value>, last: &Selector, value: &Value) -> Value {
    if let Some(Value::List(items)) = container {
        return match last.element_value.as_deref() {
            Some(needle) => {
                let stamped = stamp_identity(value.clone(), Some(&last.key), Some(needle));
                Value::List(upsert_matched(items, Some(&last.key), needle, &stamped))
            }
            None => Value::List(upsert_by_key(items, value, &last.key)),
        };
    }

    let mut fields = container.and_then(Value::as_map).cloned().unwrap_or_default();
    let current = fields.get(&last.key).cloned();
    match last.element_value.as_deref() {
        Some(needle) => {
            let seq = current
                .as_ref()
                .and_then(Value::as_list)
                .cloned()
                .unwrap_or_default();
            let match_field = last.element_key.as_deref();
            let stamped = stamp_identity(value.clone(), match_field, Some(needle));
            fields.set(
                last.key.clone(),
                Value::List(upsert_matched(&seq, match_field, needle, &stamped)),
            );
        }
        None => {
            let next = match &current {
                Some(Value::List(seq)) => {
                    Value::List(upsert_by_key(seq, value, DEFAULT_ELEMENT_KEY))
                }
                Some(existing @ Value::Map(_)) => existing.shallow_merge(value),
                _ => value.clone(),
            };
            fields.set(last.key.clone(), next);
        }
    }
    Value::Map(fields)
}

fn remove_terminal(located: Option<&Value>, last: &Selector) -> Value {
    match located {
        Some(Value::List(items)) => match last.element_value.as_deref() {
            Some(needle) => Value::List(remove_first(items, Some(&last.key), needle)),
            None => Value::List(remove_first(items, None, &last.key)),
        },
        Some(Value::Map(fields)) => {
            let removed = last.element_value.as_deref().and_then(|needle| {
                let seq = fields.get(&last.key)?.as_list()?;
                Some(Value::List(remove_first(
                    seq,
                    last.element_key.as_deref(),
                    needle,
                )))
            });
            let mut out = fields.clone();
            out.set(last.key.clone(), removed.unwrap_or(Value::Null));
            Value::Map(out)
        }
        _ => Value::Null,
    }
}

/// Notation matching compares the string form of a segment value against
/// String-typed fields only, so `"id:1"` addresses `{"id": "1"}` and not
/// `{"id": 1}`. Without a field the element itself is the matched scalar.
fn find_position(items: &[Value], field: Option<&str>, needle: &str) -> Option<usize> {
    items.iter().position(|element| match field {
        Some(field) => element.get(field).and_then(Value::as_str) == Some(needle),
        None => element.as_str() == Some(needle),
    })
}

fn upsert_matched(items: &[Value], field: Option<&str>, needle: &str, payload: &Value) -> Vec<Value> {
    match find_position(items, field, needle) {
        Some(index) => {
            let merged = items[index].shallow_merge(payload);
            replace_or_append(items, Some(index), merged)
        }
        None => replace_or_append(items, None, payload.clone()),
    }
}

fn remove_first(items: &[Value], field: Option<&str>, needle: &str) -> Vec<Value> {
    let mut out = items.to_vec();
    if let Some(index) = find_position(items, field, needle) {
        out.remove(index);
    }
    out
}

fn stamp_identity(value: Value, field: Option<&str>, needle: Option<&str>) -> Value {
    match (value, field, needle) {
        (Value::Map(mut fields), Some(field), Some(needle)) => {
            fields.set(field.to_string(), Value::String(needle.to_string()));
            Value::Map(fields)
        }
        (value, _, _) => value,
    }
}

fn replace_or_append(items: &[Value], position: Option<usize>, element: Value) -> Vec<Value> {
    let mut out = items.to_vec();
    match position {
        Some(index) => out[index] = element,
        None => out.push(element),
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::path::parse_chain;
    use crate::value::from_json;

    fn chain(segments: &[&str]) -> Vec<Selector> {
        parse_chain(segments).unwrap()
    }

    #[test]
    fn test_read_plain_fields() {
        let tree = from_json(r#"{"a": {"b": {"c": 7}}}"#).unwrap();
        assert_eq!(
            read_at(&tree, &chain(&["a", "b", "c"])).unwrap(),
            Some(Value::Int(7))
        );
        assert_eq!(read_at(&tree, &chain(&["a", "missing"])).unwrap(), None);
    }

    #[test]
    fn test_read_selects_element() {
        let tree =
            from_json(r#"{"items": [{"id": "1", "name": "x"}, {"id": "2", "name": "y"}]}"#)
                .unwrap();

        let element = read_at(&tree, &chain(&["items:id:2"])).unwrap();
        assert_eq!(element, from_json(r#"{"id": "2", "name": "y"}"#).ok());

        let name = read_at(&tree, &chain(&["items:id:2", "name"])).unwrap();
        assert_eq!(name, Some(Value::from("y")));
    }

    #[test]
    fn test_read_matches_inside_sequence() {
        let tree = from_json(r#"{"items": [{"id": "1"}, {"id": "2", "tag": "hit"}]}"#).unwrap();
        // Once a segment lands on the sequence, the next segment's key is
        // the matcher field.
        let hit = read_at(&tree, &chain(&["items", "id:2"])).unwrap();
        assert_eq!(hit, from_json(r#"{"id": "2", "tag": "hit"}"#).ok());
    }

    #[test]
    fn test_read_is_string_typed() {
        let tree = from_json(r#"{"items": [{"id": 1, "name": "int-keyed"}]}"#).unwrap();
        assert_eq!(read_at(&tree, &chain(&["items:id:1"])).unwrap(), None);
    }

    #[test]
    fn test_read_identity_element() {
        let tree = from_json(r#"{"tags": ["alpha", "beta"]}"#).unwrap();
        assert_eq!(
            read_at(&tree, &chain(&["tags:beta"])).unwrap(),
            Some(Value::from("beta"))
        );
        assert_eq!(read_at(&tree, &chain(&["tags:gamma"])).unwrap(), None);
    }

    #[test]
    fn test_read_empty_chain_is_error() {
        let tree = from_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(read_at(&tree, &[]), Err(Error::EmptySelectorChain));
    }

    #[test]
    fn test_exists_at() {
        let tree = from_json(r#"{"a": {"b": null}, "items": [{"id": "1"}]}"#).unwrap();
        assert!(exists_at(&tree, &chain(&["a", "b"])).unwrap());
        assert!(exists_at(&tree, &chain(&["items:id:1"])).unwrap());
        assert!(!exists_at(&tree, &chain(&["items:id:9"])).unwrap());
        assert!(!exists_at(&tree, &chain(&["a", "c"])).unwrap());
    }

    #[test]
    fn test_set_nested_rebuilds() {
        let tree = from_json(r#"{"a": {"keep": 1}}"#).unwrap();
        let out = set_nested(&tree, &["a", "b", "c"], &Value::Int(5));
        assert_eq!(
            out,
            from_json(r#"{"a": {"keep": 1, "b": {"c": 5}}}"#).unwrap()
        );
        // Input untouched.
        assert_eq!(tree, from_json(r#"{"a": {"keep": 1}}"#).unwrap());
    }

    #[test]
    fn test_set_nested_replaces_scalar_intermediate() {
        let tree = from_json(r#"{"a": 3}"#).unwrap();
        let out = set_nested(&tree, &["a", "b"], &Value::from("v"));
        assert_eq!(out, from_json(r#"{"a": {"b": "v"}}"#).unwrap());
    }

    #[test]
    fn test_write_plain_chain_sets_field() {
        let tree = from_json(r#"{"settings": {"theme": "light"}}"#).unwrap();
        let out = write_at(&tree, &chain(&["settings", "theme"]), &Value::from("dark")).unwrap();
        assert_eq!(out, from_json(r#"{"settings": {"theme": "dark"}}"#).unwrap());
    }

    #[test]
    fn test_write_merges_matched_element() {
        let tree = from_json(r#"{"items": [{"id": "1", "name": "x", "keep": true}]}"#).unwrap();
        let payload = from_json(r#"{"id": "1", "name": "y"}"#).unwrap();

        let out = write_at(&tree, &chain(&["items:id:1"]), &payload).unwrap();
        assert_eq!(
            out,
            from_json(r#"{"items": [{"id": "1", "name": "y", "keep": true}]}"#).unwrap()
        );
    }

    #[test]
    fn test_write_appends_unmatched_element() {
        let tree = from_json(r#"{"items": [{"id": "1"}]}"#).unwrap();
        let payload = from_json(r#"{"name": "new"}"#).unwrap();

        let out = write_at(&tree, &chain(&["items:id:2"]), &payload).unwrap();
        // The identity field is stamped from the segment.
        assert_eq!(
            out,
            from_json(r#"{"items": [{"id": "1"}, {"id": "2", "name": "new"}]}"#).unwrap()
        );
    }

    #[test]
    fn test_write_into_empty_tree_builds_path() {
        let tree = Value::Map(Default::default());
        let payload = from_json(r#"{"name": "built"}"#).unwrap();

        let out = write_at(&tree, &chain(&["a", "list:id:1", "name"]), &payload).unwrap();
        assert_eq!(
            out,
            from_json(r#"{"a": {"list": [{"id": "1", "name": {"name": "built"}}]}}"#).unwrap()
        );
    }

    #[test]
    fn test_write_deep_chain_updates_nested_element() {
        let tree = from_json(
            r#"{"fields": [{"id": "3", "options": [{"id": "a", "label": "old"}]}]}"#,
        )
        .unwrap();

        let out = write_at(
            &tree,
            &chain(&["fields:id:3", "options", "id:a", "label"]),
            &Value::from("new"),
        )
        .unwrap();
        assert_eq!(
            out,
            from_json(r#"{"fields": [{"id": "3", "options": [{"id": "a", "label": "new"}]}]}"#)
                .unwrap()
        );
    }

    #[test]
    fn test_write_plain_terminal_over_sequence_field_upserts_by_default_key() {
        let tree =
            from_json(r#"{"groups": [{"id": "g", "items": [{"id": "1", "v": 1}]}]}"#).unwrap();
        let payload = from_json(r#"{"id": "1", "v": 2}"#).unwrap();

        let out = write_at(&tree, &chain(&["groups:id:g", "items"]), &payload).unwrap();
        assert_eq!(
            out,
            from_json(r#"{"groups": [{"id": "g", "items": [{"id": "1", "v": 2}]}]}"#).unwrap()
        );
    }

    #[test]
    fn test_write_all_plain_chain_replaces_wholesale() {
        // Without a selecting segment anywhere in the chain the write is a
        // plain nested set, even onto a sequence field.
        let tree = from_json(r#"{"items": [{"id": "1"}]}"#).unwrap();
        let payload = from_json(r#"{"id": "2"}"#).unwrap();

        let out = write_at(&tree, &chain(&["items"]), &payload).unwrap();
        assert_eq!(out, from_json(r#"{"items": {"id": "2"}}"#).unwrap());
    }

    #[test]
    fn test_write_overwrites_scalar_field() {
        let tree = from_json(r#"{"a": {"b": 1}}"#).unwrap();
        let out = write_at(&tree, &chain(&["a", "b"]), &Value::from(2i64)).unwrap();
        assert_eq!(out, from_json(r#"{"a": {"b": 2}}"#).unwrap());
    }

    #[test]
    fn test_write_identity_element() {
        let tree = from_json(r#"{"tags": ["alpha"]}"#).unwrap();

        let added = write_at(&tree, &chain(&["tags:beta"]), &Value::from("beta")).unwrap();
        assert_eq!(added, from_json(r#"{"tags": ["alpha", "beta"]}"#).unwrap());

        let replaced = write_at(&added, &chain(&["tags:alpha"]), &Value::from("gamma")).unwrap();
        assert_eq!(replaced, from_json(r#"{"tags": ["gamma", "beta"]}"#).unwrap());
    }

    #[test]
    fn test_write_empty_chain_is_error() {
        let tree = from_json(r#"{}"#).unwrap();
        assert_eq!(
            write_at(&tree, &[], &Value::Null),
            Err(Error::EmptySelectorChain)
        );
    }

    #[test]
    fn test_remove_element_from_sequence() {
        let tree = from_json(r#"{"items": [{"id": "1"}, {"id": "2"}, {"id": "1"}]}"#).unwrap();

        // Only the first match goes.
        let out = remove_at(&tree, &chain(&["items:id:1"])).unwrap();
        assert_eq!(out, from_json(r#"{"items": [{"id": "2"}, {"id": "1"}]}"#).unwrap());
    }

    #[test]
    fn test_remove_nested_element() {
        let tree = from_json(
            r#"{"fields": [{"id": "3", "options": [{"id": "a"}, {"id": "b"}]}]}"#,
        )
        .unwrap();

        let out = remove_at(&tree, &chain(&["fields:id:3", "options", "id:a"])).unwrap();
        assert_eq!(
            out,
            from_json(r#"{"fields": [{"id": "3", "options": [{"id": "b"}]}]}"#).unwrap()
        );
    }

    #[test]
    fn test_remove_field_sets_null() {
        let tree = from_json(r#"{"a": {"b": 1, "c": 2}}"#).unwrap();
        let out = remove_at(&tree, &chain(&["a", "b"])).unwrap();
        assert_eq!(out, from_json(r#"{"a": {"b": null, "c": 2}}"#).unwrap());
    }

    #[test]
    fn test_remove_single_segment_applies_to_root() {
        let tree = from_json(r#"{"items": [1, 2]}"#).unwrap();
        let out = remove_at(&tree, &chain(&["items"])).unwrap();
        assert_eq!(out, from_json(r#"{"items": null}"#).unwrap());
    }

    #[test]
    fn test_remove_identity_element() {
        let tree = from_json(r#"{"tags": ["alpha", "beta"]}"#).unwrap();
        let out = remove_at(&tree, &chain(&["tags:beta"])).unwrap();
        assert_eq!(out, from_json(r#"{"tags": ["alpha"]}"#).unwrap());
    }

    #[test]
    fn test_remove_missing_match_is_noop_on_sequence() {
        let tree = from_json(r#"{"items": [{"id": "1"}]}"#).unwrap();
        let out = remove_at(&tree, &chain(&["items:id:9"])).unwrap();
        assert_eq!(out, tree);
    }
}
