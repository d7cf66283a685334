//! Async replacement - batch-resolving transforms over one tree.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

use futures::future::try_join_all;

use crate::value::Value;
use crate::walk::{VisitContext, Walker};

/// Replaces every node for which `condition` holds with the resolved
/// output of `transform`.
///
/// All transform futures are started from one pass over the tree and
/// awaited together; a second pass splices the outputs back in. Nodes are
/// correlated between the passes by key and value, so equal nodes under
/// the same key share one resolved replacement. Any failed future fails
/// the whole call and the input is returned unchanged by virtue of never
/// being mutated.
pub async fn replace_async<C, F, Fut, E>(
    value: &Value,
    condition: C,
    transform: F,
) -> Result<Value, E>
where
    C: Fn(&Value, &VisitContext) -> bool,
    F: Fn(&Value, &VisitContext) -> Fut,
    Fut: Future<Output = Result<Value, E>>,
{
    let pending: RefCell<Vec<((String, Value), Fut)>> = RefCell::new(Vec::new());
    {
        let walker = Walker::new().condition(|node, ctx| {
            if condition(node, ctx) {
                let identity = (ctx.key.unwrap_or("").to_string(), node.clone());
                pending.borrow_mut().push((identity, transform(node, ctx)));
            }
            false
        });
        walker.walk(value);
    }

    let (identities, futures): (Vec<_>, Vec<_>) = pending.into_inner().into_iter().unzip();
    let outputs = try_join_all(futures).await?;
    let replacements: HashMap<(String, Value), Value> =
        identities.into_iter().zip(outputs).collect();

    // The walker borrows `replacements`; bind the result so the walker is
    // dropped before the map.
    let rebuilt = Walker::new()
        .condition(|node, ctx| {
            replacements.contains_key(&(ctx.key.unwrap_or("").to_string(), node.clone()))
        })
        .transform(|node, ctx| {
            replacements
                .get(&(ctx.key.unwrap_or("").to_string(), node.clone()))
                .cloned()
        })
        .walk(value);
    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::from_json;

    async fn lookup_label(token: &str) -> Result<Value, String> {
        match token {
            "a" => Ok(Value::from("Alpha")),
            "b" => Ok(Value::from("Beta")),
            _ => Err(format!("unknown token {token}")),
        }
    }

    #[tokio::test]
    async fn test_replace_async_resolves_every_match() {
        let value =
            from_json(r#"{"first": "a", "nested": {"second": "b"}, "keep": 1}"#).unwrap();

        let replaced = replace_async(
            &value,
            |v, _| v.as_str().is_some(),
            |v, _| {
                let token = v.as_str().unwrap_or("").to_string();
                async move { lookup_label(&token).await }
            },
        )
        .await
        .unwrap();

        assert_eq!(
            replaced,
            from_json(r#"{"first": "Alpha", "nested": {"second": "Beta"}, "keep": 1}"#).unwrap()
        );
    }

    #[tokio::test]
    async fn test_replace_async_correlates_equal_nodes() {
        // Same key and value at two depths resolve to one shared output.
        let value = from_json(r#"{"x": "a", "nested": {"x": "a"}}"#).unwrap();

        let replaced = replace_async(
            &value,
            |v, _| v.as_str().is_some(),
            |v, _| {
                let token = v.as_str().unwrap_or("").to_string();
                async move { lookup_label(&token).await }
            },
        )
        .await
        .unwrap();

        assert_eq!(
            replaced,
            from_json(r#"{"x": "Alpha", "nested": {"x": "Alpha"}}"#).unwrap()
        );
    }

    #[tokio::test]
    async fn test_replace_async_fails_whole_batch() {
        let value = from_json(r#"{"first": "a", "second": "zzz"}"#).unwrap();

        let result = replace_async(
            &value,
            |v, _| v.as_str().is_some(),
            |v, _| {
                let token = v.as_str().unwrap_or("").to_string();
                async move { lookup_label(&token).await }
            },
        )
        .await;

        assert_eq!(result, Err("unknown token zzz".to_string()));
    }

    #[tokio::test]
    async fn test_replace_async_no_matches_rebuilds_unchanged() {
        let value = from_json(r#"{"a": 1}"#).unwrap();

        let replaced = replace_async(
            &value,
            |_, _| false,
            |_, _| async { Ok::<Value, String>(Value::Null) },
        )
        .await
        .unwrap();

        assert_eq!(replaced, value);
    }
}
