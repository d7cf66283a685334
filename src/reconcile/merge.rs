//! Merging - combining two sequences of Mappings by identity keys.
//!
//! Two elements share an identity when every listed key compares equal
//! through a dotted-path lookup; two absent values are equal. Multiple
//! elements with one identity resolve to the first in input order.

use crate::error::Error;
use crate::value::{Map, Value};

use super::sort::sort_by_priority;

/// Options for [`merge_and_add_by_keys`].
///
/// `keys_to_check` is the identity; `keys_to_merge` names the incoming
/// fields carried onto matched elements. With `include_all` every field
/// of every element survives and the result keeps the original order up
/// front. `remove_missing` drops original elements with no incoming
/// identity match before merging. `priorities` overrides the ordering of
/// the final result.
#[derive(Debug, Clone, Default)]
pub struct MergeSpec {
    pub keys_to_check: Vec<String>,
    pub keys_to_merge: Vec<String>,
    pub priorities: Option<Vec<Value>>,
    pub include_all: bool,
    pub remove_missing: bool,
}

impl MergeSpec {
    /// A spec with only the identity keys set.
    pub fn checking(keys: &[&str]) -> Self {
        MergeSpec {
            keys_to_check: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// Drops elements whose identity was already seen, keeping the first.
pub fn dedupe_by_keys(items: &[Value], keys: &[&str]) -> Result<Vec<Value>, Error> {
    if keys.is_empty() {
        return Err(Error::missing_identity_keys("dedupe_by_keys"));
    }
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.iter().any(|kept| keys_match(kept, item, keys)) {
            out.push(item.clone());
        }
    }
    Ok(out)
}

/// Identity union preferring `incoming`: its elements come first (deduped
/// among themselves), followed by `original` elements whose identity did
/// not appear.
pub fn union_by_keys(
    original: &[Value],
    incoming: &[Value],
    keys: &[&str],
) -> Result<Vec<Value>, Error> {
    if keys.is_empty() {
        return Err(Error::missing_identity_keys("union_by_keys"));
    }
    let mut out: Vec<Value> = Vec::new();
    for item in incoming.iter().chain(original) {
        if !out.iter().any(|kept| keys_match(kept, item, keys)) {
            out.push(item.clone());
        }
    }
    Ok(out)
}

/// Deep-merges each incoming element over its first identity match from
/// `original` (incoming wins per field; Sequences replace wholesale). An
/// element with no match merges over nothing. The result has incoming's
/// order and length.
pub fn merge_by_keys(
    original: &[Value],
    incoming: &[Value],
    keys: &[&str],
) -> Result<Vec<Value>, Error> {
    if keys.is_empty() {
        return Err(Error::missing_identity_keys("merge_by_keys"));
    }
    Ok(incoming
        .iter()
        .map(
            |item| match original.iter().find(|base| keys_match(base, item, keys)) {
                Some(base) => base.deep_merge(item),
                None => item.clone(),
            },
        )
        .collect())
}

/// Reconciles `incoming` into `original` under the policies of `spec`.
///
/// With `include_all` the result is the identity union, deep-merged, in
/// the original sequence's order (incoming-only identities follow). The
/// restricted mode instead carries only `keys_to_merge` fields onto
/// matched originals, keeps unmatched originals whole, strips unmatched
/// incoming elements down to identity and merge keys, and orders the
/// result by `priorities` or first appearance of the leading identity
/// key.
pub fn merge_and_add_by_keys(
    original: &[Value],
    incoming: &[Value],
    spec: &MergeSpec,
) -> Result<Vec<Value>, Error> {
    let keys: Vec<&str> = spec.keys_to_check.iter().map(String::as_str).collect();
    if keys.is_empty() {
        return Err(Error::missing_identity_keys("merge_and_add_by_keys"));
    }
    let first_key = keys[0];

    let retained: Vec<Value> = if spec.remove_missing {
        original
            .iter()
            .filter(|base| incoming.iter().any(|item| keys_match(base, item, &keys)))
            .cloned()
            .collect()
    } else {
        original.to_vec()
    };

    if spec.include_all {
        let combined = union_by_keys(&retained, incoming, &keys)?;
        let merged = merge_by_keys(&retained, &combined, &keys)?;
        let priorities: Vec<Value> = retained
            .iter()
            .filter_map(|item| item.get(first_key).cloned())
            .collect();
        return Ok(sort_by_priority(&merged, Some(first_key), &priorities, None));
    }

    let merge_keys: Vec<&str> = spec.keys_to_merge.iter().map(String::as_str).collect();
    let mut result = carry_merge(&retained, incoming, &keys, &merge_keys);

    let mut unmerged: Vec<Value> = Vec::new();
    for base in &retained {
        if !result.iter().any(|kept| keys_match(kept, base, &keys)) {
            unmerged.push(base.clone());
        }
    }
    for item in incoming {
        if !result.iter().any(|kept| keys_match(kept, item, &keys)) {
            unmerged.push(restrict_fields(item, &keys, &merge_keys));
        }
    }
    result.extend(unmerged);

    let priorities: Vec<Value> = match &spec.priorities {
        Some(listed) => listed.clone(),
        None => {
            let mut seen: Vec<Value> = Vec::new();
            for item in retained.iter().chain(incoming) {
                if let Some(value) = item.get(first_key) {
                    if !seen.contains(value) {
                        seen.push(value.clone());
                    }
                }
            }
            seen
        }
    };
    Ok(sort_by_priority(&result, Some(first_key), &priorities, None))
}

/// Position-preserving sequence upsert. A Mapping item replaces-by-merge
/// the first element sharing its `key` field (item fields win); other
/// items match by identity and never merge. No match appends.
pub fn upsert_by_key(items: &[Value], item: &Value, key: &str) -> Vec<Value> {
    let mut out = items.to_vec();
    if let Value::Map(fields) = item {
        let needle = fields.get(key);
        match items.iter().position(|el| el.get(key) == needle) {
            Some(index) => out[index] = items[index].shallow_merge(item),
            None => out.push(item.clone()),
        }
    } else if !items.contains(item) {
        out.push(item.clone());
    }
    out
}

/// Removes the first element whose `key` field equals `needle`, or the
/// first element equal to it when `key` is None.
pub fn remove_by_key(items: &[Value], key: Option<&str>, needle: &Value) -> Vec<Value> {
    let mut out = items.to_vec();
    let position = items.iter().position(|el| match key {
        Some(key) => el.get(key) == Some(needle),
        None => el == needle,
    });
    if let Some(index) = position {
        out.remove(index);
    }
    out
}

fn keys_match(a: &Value, b: &Value, keys: &[&str]) -> bool {
    keys.iter().all(|key| a.get_path(key) == b.get_path(key))
}

fn carry_merge(
    original: &[Value],
    incoming: &[Value],
    keys: &[&str],
    merge_keys: &[&str],
) -> Vec<Value> {
    original
        .iter()
        .filter_map(|base| {
            let matched = incoming.iter().find(|item| keys_match(base, item, keys))?;
            let mut out = base.as_map().cloned().unwrap_or_default();
            if let Some(fields) = matched.as_map() {
                for (key, value) in fields.iter() {
                    if merge_keys.contains(&key.as_str()) {
                        out.set(key.clone(), value.clone());
                    }
                }
            }
            Some(Value::Map(out))
        })
        .collect()
}

fn restrict_fields(item: &Value, keys: &[&str], merge_keys: &[&str]) -> Value {
    let fields = match item.as_map() {
        Some(fields) => fields,
        None => return item.clone(),
    };
    let mut out = Map::new();
    for (key, value) in fields.iter() {
        if keys.contains(&key.as_str()) || merge_keys.contains(&key.as_str()) {
            out.set(key.clone(), value.clone());
        }
    }
    Value::Map(out)
}
