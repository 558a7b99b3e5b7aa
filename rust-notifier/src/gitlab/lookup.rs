//! Defensive reads from an untyped JSON tree.

use serde_json::Value;

/// Walk `path` through nested objects.
///
/// Returns `None` when a key is missing or an intermediate value is not an
/// object. An empty path returns `value` itself.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Like [`lookup`], but only yields non-empty strings.
///
/// An empty string is reported as absent, so callers substitute their
/// placeholder for it. Discord rejects embed fields with an empty value.
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)?.as_str().filter(|s| !s.is_empty())
}
