//! Generic copy-on-visit tree traversal.

use std::collections::BTreeMap;

use crate::value::{Map, Value};
use crate::walk::VisitContext;

/// Condition callback: decides whether a node participates in the walk's
/// transform (or, in removal mode, whether it survives).
pub type ConditionFn<'a> = Box<dyn Fn(&Value, &VisitContext) -> bool + 'a>;

/// Transform callback: returns the replacement for a node, or None to keep
/// the node as-is.
pub type TransformFn<'a> = Box<dyn Fn(&Value, &VisitContext) -> Option<Value> + 'a>;

/// Walker rebuilds a tree, visiting every field and element exactly once.
///
/// The input is never mutated: every kept Map and List is reconstructed on
/// the way back up, even when unchanged. Conditions gate transforms; in
/// removal mode (`removing`) they instead decide survival, and only entries
/// for which the condition holds are carried into the rebuilt containers.
/// Sequences are re-densified after removals.
#[derive(Default)]
pub struct Walker<'a> {
    condition: Option<ConditionFn<'a>>,
    transform: Option<TransformFn<'a>>,
    key_mapping: Option<&'a BTreeMap<String, String>>,
    remove: bool,
}

impl<'a> Walker<'a> {
    pub fn new() -> Self {
        Walker::default()
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
        F: Fn(&Value, &VisitContext) -> Option<Value> + 'a,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Field names of every visited Map are rewritten through `mapping`;
    /// names absent from it pass through unchanged.
    pub fn key_mapping(mut self, mapping: &'a BTreeMap<String, String>) -> Self {
        self.key_mapping = Some(mapping);
        self
    }

    /// Switches the walk to removal mode: entries are kept exactly when the
    /// condition passes. Callers wanting "remove what matches" invert their
    /// predicate before handing it over.
    pub fn removing(mut self) -> Self {
        self.remove = true;
        self
    }

    /// Runs the walk and returns the rebuilt tree. A scalar root is returned
    /// unchanged.
    pub fn walk(&self, value: &Value) -> Value {
        let mut named = Vec::new();
        let mut absolute = Vec::new();
        self.walk_value(value, &mut named, &mut absolute)
    }

    fn walk_value(
        &self,
        value: &Value,
        named: &mut Vec<String>,
        absolute: &mut Vec<String>,
    ) -> Value {
        match value {
            Value::Map(_) => self.walk_map(value, named, absolute),
            Value::List(_) => self.walk_list(value, named, absolute),
            other => other.clone(),
        }
    }

    fn walk_map(&self, value: &Value, named: &mut Vec<String>, absolute: &mut Vec<String>) -> Value {
        let level = absolute.len();

        // The whole root Mapping is tested and possibly replaced before its
        // fields are visited. Deeper Mappings are handled by visit_entry.
        let mut replaced_root = None;
        if level == 0 {
            if let (Some(condition), Some(transform)) = (&self.condition, &self.transform) {
                let ctx = VisitContext {
                    key: None,
                    parent: None,
                    key_path: &[],
                    absolute_path: &[],
                    level: 0,
                };
                if condition(value, &ctx) {
                    replaced_root = transform(value, &ctx);
                }
            }
        }

        let current = replaced_root.as_ref().unwrap_or(value);
        let map = match current {
            Value::Map(m) => m,
            other => return other.clone(),
        };

        let mut out = Map::new();
        for (key, child) in map.iter() {
            let key = match self.key_mapping {
                Some(mapping) => mapping.get(key).cloned().unwrap_or_else(|| key.clone()),
                None => key.clone(),
            };
            named.push(key.clone());
            absolute.push(key.clone());
            let kept = self.visit_entry(child, &key, current, named, absolute, level);
            named.pop();
            absolute.pop();
            if let Some(new_value) = kept {
                out.set(key, new_value);
            }
        }
        Value::Map(out)
    }

    fn walk_list(
        &self,
        value: &Value,
        named: &mut Vec<String>,
        absolute: &mut Vec<String>,
    ) -> Value {
        let level = absolute.len();
        let items = match value {
            Value::List(items) => items,
            _ => return value.clone(),
        };

        let mut out = Vec::new();
        for (index, child) in items.iter().enumerate() {
            let index_key = index.to_string();
            absolute.push(index_key.clone());
            let kept = self.visit_entry(child, &index_key, value, named, absolute, level);
            absolute.pop();
            if let Some(new_value) = kept {
                out.push(new_value);
            }
        }
        Value::List(out)
    }

    /// Visits one field or element. Returns None when the entry is dropped
    /// (removal mode only).
    fn visit_entry(
        &self,
        child: &Value,
        key: &str,
        parent: &Value,
        named: &mut Vec<String>,
        absolute: &mut Vec<String>,
        level: usize,
    ) -> Option<Value> {
        let composite = child.is_map() || child.is_list();
        let passed;
        let mut derived = None;
        {
            let ctx = VisitContext {
                key: Some(key),
                parent: Some(parent),
                key_path: named.as_slice(),
                absolute_path: absolute.as_slice(),
                level,
            };
            passed = match &self.condition {
                Some(condition) => condition(child, &ctx),
                None => true,
            };
            if passed {
                if composite {
                    // Composite values are only transformed when the caller
                    // supplied both callbacks; the condition alone cannot
                    // distinguish "visit" from "replace".
                    if self.condition.is_some() {
                        if let Some(transform) = &self.transform {
                            derived = transform(child, &ctx);
                        }
                    }
                } else if !self.remove {
                    if let Some(transform) = &self.transform {
                        derived = transform(child, &ctx);
                    }
                }
            }
        }

        if composite {
            if self.remove && !passed {
                return None;
            }
            let next = derived.as_ref().unwrap_or(child);
            Some(self.walk_value(next, named, absolute))
        } else if passed {
            if self.remove {
                Some(child.clone())
            } else {
                Some(derived.unwrap_or_else(|| child.clone()))
            }
        } else if self.remove {
            None
        } else {
            Some(child.clone())
        }
    }
}
