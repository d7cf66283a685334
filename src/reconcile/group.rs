//! Grouping - bucketing sequences of Mappings by field values.

use crate::error::Error;
use crate::value::{Map, Value};

/// Buckets elements by their `key` field, preserving first-seen bucket
/// order. Every bucket is a Mapping `{ <key>: value, "items": [...] }`
/// where the bucket value keeps its original type; elements without the
/// field land in a Null bucket.
pub fn group_by_key(items: &[Value], key: &str) -> Vec<Value> {
    let mut buckets: Vec<(Value, Vec<Value>)> = Vec::new();
    for item in items {
        let bucket_value = item.get(key).cloned().unwrap_or(Value::Null);
        match buckets.iter_mut().find(|(value, _)| *value == bucket_value) {
            Some((_, members)) => members.push(item.clone()),
            None => buckets.push((bucket_value, vec![item.clone()])),
        }
    }

    buckets
        .into_iter()
        .map(|(value, members)| {
            let mut bucket = Map::new();
            bucket.set(key.to_string(), value);
            bucket.set("items".to_string(), Value::List(members));
            Value::Map(bucket)
        })
        .collect()
}

/// Groups by the first key, then recursively regroups each bucket's
/// `items` by the remaining keys, so two keys yield buckets of buckets.
/// An empty key list is a usage error.
pub fn group_by(items: &[Value], keys: &[&str]) -> Result<Vec<Value>, Error> {
    let (first, rest) = match keys.split_first() {
        Some(split) => split,
        None => return Err(Error::MissingGroupKeys),
    };

    let mut grouped = group_by_key(items, first);
    if rest.is_empty() {
        return Ok(grouped);
    }

    for bucket in &mut grouped {
        if let Value::Map(fields) = bucket {
            let members = fields
                .get("items")
                .and_then(Value::as_list)
                .cloned()
                .unwrap_or_default();
            fields.set("items".to_string(), Value::List(group_by(&members, rest)?));
        }
    }
    Ok(grouped)
}
