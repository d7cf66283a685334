//! Read accessors - collecting values out of a tree.
//!
//! Collection happens during a plain walk; results are deduplicated by
//! value (first hit wins) and ordered by the caller's key list rather
//! than by discovery order.

use std::cell::RefCell;
use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::value::Value;
use crate::walk::{VisitContext, Walker};

/// One match-and-transform rule for [`read_by_transforms`].
///
/// A Mapping is in scope when it carries `match_key` with a field value
/// whose token form equals `match_value`'s, or when `match_key` is dotted
/// and the Mapping sits at a path ending in its leading components with
/// the final component as the matching field. `condition` can veto a
/// matched Mapping; without `transform` the Mapping itself is collected.
pub struct KeyedTransform<'a> {
    pub match_key: String,
    pub match_value: Value,
    pub condition: Option<Box<dyn Fn(&Value, &VisitContext) -> bool + 'a>>,
    pub transform: Option<Box<dyn Fn(&Value, &VisitContext) -> Value + 'a>>,
}

impl<'a> KeyedTransform<'a> {
    pub fn new(match_key: impl Into<String>, match_value: impl Into<Value>) -> Self {
        KeyedTransform {
            match_key: match_key.into(),
            match_value: match_value.into(),
            condition: None,
            transform: None,
        }
    }

    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Value, &VisitContext) -> bool + 'a,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value, &VisitContext) -> Value + 'a,
    {
        self.transform = Some(Box::new(transform));
        self
    }
}

/// An ordered set of [`KeyedTransform`] rules with a lazily built
/// `"<match_key>-<match_value>"` lookup index. Later duplicates of a pair
/// shadow earlier ones. Holds caller closures, so not `Clone`.
pub struct TransformSet<'a> {
    entries: Vec<KeyedTransform<'a>>,
    index: OnceCell<HashMap<String, usize>>,
}

impl<'a> TransformSet<'a> {
    pub fn new(entries: Vec<KeyedTransform<'a>>) -> Self {
        TransformSet {
            entries,
            index: OnceCell::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn match_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.match_key.as_str())
    }

    fn lookup(&self, match_key: &str, token: &str) -> Option<&KeyedTransform<'a>> {
        let index = self.index.get_or_init(|| {
            self.entries
                .iter()
                .enumerate()
                .map(|(position, entry)| {
                    let token = entry.match_value.scalar_string().unwrap_or_default();
                    (format!("{}-{}", entry.match_key, token), position)
                })
                .collect()
        });
        index
            .get(&format!("{match_key}-{token}"))
            .map(|position| &self.entries[*position])
    }
}

/// Collects every field and element for which `condition` holds, each
/// recorded under the key it was found at. Duplicates (by value) keep the
/// first hit; the result is ordered by the recorded key's position in
/// `priority_keys`, unlisted keys last in discovery order.
pub fn read_by_condition<C>(value: &Value, priority_keys: &[&str], condition: C) -> Vec<Value>
where
    C: Fn(&Value, &VisitContext) -> bool,
{
    let collected: RefCell<Vec<(String, Value)>> = RefCell::new(Vec::new());
    {
        let walker = Walker::new().condition(|node, ctx| {
            if condition(node, ctx) {
                collected
                    .borrow_mut()
                    .push((ctx.key.unwrap_or("").to_string(), node.clone()));
            }
            false
        });
        walker.walk(value);
    }
    collect_ordered(collected.into_inner(), priority_keys)
}

/// Collects the values of every node whose key is listed, or whose named
/// key path ends in a dotted entry. Ordering and dedup as in
/// [`read_by_condition`], with `keys` as the priority list.
pub fn read_by_keys(value: &Value, keys: &[&str]) -> Vec<Value> {
    collect_by_keys(value, keys, None)
}

/// [`read_by_keys`] with every hit passed through `transform` before it
/// is collected.
pub fn read_by_keys_with<T>(value: &Value, keys: &[&str], transform: T) -> Vec<Value>
where
    T: Fn(&Value, &VisitContext) -> Value,
{
    collect_by_keys(value, keys, Some(&transform))
}

/// Runs a [`TransformSet`] over every Mapping in the tree and collects
/// the rule outputs. A direct `match_key` field beats a trailing-path
/// match when both apply.
pub fn read_by_transforms(value: &Value, transforms: &TransformSet) -> Vec<Value> {
    let keys: Vec<&str> = transforms.match_keys().collect();
    let collected: RefCell<Vec<(String, Value)>> = RefCell::new(Vec::new());
    {
        let walker = Walker::new().condition(|node, ctx| {
            let fields = match node {
                Value::Map(fields) => fields,
                _ => return false,
            };
            let matched = keys
                .iter()
                .copied()
                .find(|k| !k.contains('.') && fields.get(k).is_some())
                .or_else(|| {
                    keys.iter().copied().find(|k| {
                        let parts: Vec<&str> = k.split('.').collect();
                        match parts.split_last() {
                            Some((field, prefix)) if !prefix.is_empty() => {
                                ctx.path_ends_with(prefix) && fields.get(field).is_some()
                            }
                            _ => false,
                        }
                    })
                });

            if let Some(matched_key) = matched {
                let field = matched_key.rsplit('.').next().unwrap_or(matched_key);
                let token = fields
                    .get(field)
                    .and_then(Value::scalar_string)
                    .unwrap_or_default();
                if let Some(entry) = transforms.lookup(matched_key, &token) {
                    let passes = entry
                        .condition
                        .as_ref()
                        .map_or(true, |condition| condition(node, ctx));
                    if passes {
                        let out = match &entry.transform {
                            Some(transform) => transform(node, ctx),
                            None => node.clone(),
                        };
                        collected.borrow_mut().push((matched_key.to_string(), out));
                    }
                }
            }
            false
        });
        walker.walk(value);
    }
    collect_ordered(collected.into_inner(), &keys)
}

fn collect_by_keys(
    value: &Value,
    keys: &[&str],
    transform: Option<&dyn Fn(&Value, &VisitContext) -> Value>,
) -> Vec<Value> {
    let collected: RefCell<Vec<(String, Value)>> = RefCell::new(Vec::new());
    {
        let walker = Walker::new().condition(|node, ctx| {
            let matched = keys
                .iter()
                .copied()
                .find(|k| ctx.key == Some(*k))
                .or_else(|| {
                    keys.iter().copied().find(|k| {
                        k.contains('.') && {
                            let parts: Vec<&str> = k.split('.').collect();
                            ctx.path_ends_with(&parts)
                        }
                    })
                });
            if let Some(matched_key) = matched {
                let out = match transform {
                    Some(transform) => transform(node, ctx),
                    None => node.clone(),
                };
                collected.borrow_mut().push((matched_key.to_string(), out));
            }
            false
        });
        walker.walk(value);
    }
    collect_ordered(collected.into_inner(), keys)
}

fn collect_ordered(entries: Vec<(String, Value)>, priority: &[&str]) -> Vec<Value> {
    let mut unique: Vec<(String, Value)> = Vec::new();
    for (key, value) in entries {
        if !unique.iter().any(|(_, kept)| *kept == value) {
            unique.push((key, value));
        }
    }
    unique.sort_by_key(|(key, _)| {
        priority
            .iter()
            .position(|candidate| *candidate == key.as_str())
            .unwrap_or(usize::MAX)
    });
    unique.into_iter().map(|(_, value)| value).collect()
}
