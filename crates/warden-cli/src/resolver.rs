//! Dot-path lookups into the configuration tree.

use serde_json::Value;

/// Resolves a dot-separated `path` against `tree`.
///
/// Object nodes are indexed by key and array nodes by a decimal index.
/// A missing segment anywhere along the path yields `None`.
#[must_use]
pub fn resolve<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(tree, |node, segment| match node {
        Value::Object(entries) => entries.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    })
}

/// Renders a resolved value for display: strings verbatim, anything else as
/// compact JSON.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
