//! Sorting - value, key, priority, condition and group orderings.
//!
//! All functions return a new Vec and rely on the standard library's
//! stable sort, so elements the comparator cannot tell apart keep their
//! input order.

use std::cmp::Ordering;

use crate::value::Value;

/// Sort direction for value and key sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sorts raw elements. Numbers order numerically; everything else orders
/// by its case-folded string form, which puts composites (no string form)
/// first.
pub fn sort_values(items: &[Value], direction: SortDirection) -> Vec<Value> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| directed(compare_sort_values(Some(a), Some(b)), direction));
    out
}

/// Sorts Mappings by the value at a dotted-path key.
pub fn sort_by_key(items: &[Value], key: &str, direction: SortDirection) -> Vec<Value> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        directed(
            compare_sort_values(a.get_path(key), b.get_path(key)),
            direction,
        )
    });
    out
}

/// Orders elements by membership in a priority list: listed values first,
/// in list order, then everything else in input order. `key` projects each
/// element before the lookup; a Mapping priority entry is consulted
/// through `priority_key` (falling back to `key`) so callers can pass the
/// reference elements themselves as priorities.
pub fn sort_by_priority(
    items: &[Value],
    key: Option<&str>,
    priorities: &[Value],
    priority_key: Option<&str>,
) -> Vec<Value> {
    let match_key = priority_key.or(key);
    let normalized: Vec<&Value> = priorities
        .iter()
        .map(|entry| match (entry, match_key) {
            (Value::Map(_), Some(k)) => entry.get(k).unwrap_or(entry),
            _ => entry,
        })
        .collect();

    let mut out = items.to_vec();
    out.sort_by_key(|item| {
        let value = match key {
            Some(k) => item.get_path(k),
            None => Some(item),
        };
        value
            .and_then(|v| normalized.iter().position(|p| *p == v))
            .unwrap_or(usize::MAX)
    });
    out
}

/// Moves elements satisfying `condition` ahead of those that do not.
/// `keys` selects what the condition sees: nothing for the element itself,
/// one key for that field (absent fields present as Null), several keys
/// for a picked sub-Mapping.
pub fn sort_by_condition(
    items: &[Value],
    keys: &[&str],
    condition: &dyn Fn(&Value) -> bool,
) -> Vec<Value> {
    let passes = |item: &Value| match keys {
        [] => condition(item),
        [key] => condition(item.get(key).unwrap_or(&Value::Null)),
        _ => {
            let picked = item
                .as_map()
                .map(|m| Value::Map(m.pick(keys)))
                .unwrap_or(Value::Null);
            condition(&picked)
        }
    };

    let mut out = items.to_vec();
    out.sort_by_key(|item| !passes(item));
    out
}

/// Composite ordering over several dotted-path keys: the first key that
/// tells two elements apart decides. Fields that are both numeric compare
/// numerically, anything else by string form with absence as the empty
/// string.
pub fn sort_by_group_keys(items: &[Value], keys: &[&str]) -> Vec<Value> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        keys.iter()
            .map(|key| compare_group_field(a.get_path(key), b.get_path(key)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    out
}

/// Projects a sequence into the order of `values`: for each listed value,
/// the first element whose `key` field equals it. Elements matching no
/// listed value are dropped.
pub fn sort_by_key_values(items: &[Value], key: &str, values: &[Value]) -> Vec<Value> {
    values
        .iter()
        .filter_map(|value| items.iter().find(|item| item.get(key) == Some(value)))
        .cloned()
        .collect()
}

/// Like [`sort_by_key_values`] but appends, in input order, the elements
/// whose `key` field matched none of the claimed values.
pub fn sort_by_key_values_include_all(
    items: &[Value],
    key: &str,
    values: &[Value],
) -> Vec<Value> {
    let mut out = sort_by_key_values(items, key, values);
    let rest: Vec<Value> = items
        .iter()
        .filter(|item| !out.iter().any(|claimed| claimed.get(key) == item.get(key)))
        .cloned()
        .collect();
    out.extend(rest);
    out
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn compare_sort_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_number), b.and_then(Value::as_number)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => fold_token(a).cmp(&fold_token(b)),
    }
}

fn fold_token(value: Option<&Value>) -> String {
    value
        .and_then(Value::scalar_string)
        .unwrap_or_default()
        .to_lowercase()
}

fn compare_group_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_number), b.and_then(Value::as_number)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => group_token(a).cmp(&group_token(b)),
    }
}

fn group_token(value: Option<&Value>) -> String {
    value.and_then(Value::scalar_string).unwrap_or_default()
}
