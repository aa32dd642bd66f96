//! Helpers for building and cleaning loosely typed configuration trees.

use serde_json::{Map, Value};

/// Inserts `value` at a dotted `path`, creating intermediate tables.
///
/// A non-table value found on the way is replaced by a table.
pub(crate) fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').filter(|s| !s.is_empty()).peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_owned(), value);
            return;
        }

        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
}

/// Removes every `null` from a tree.
///
/// `null` marks a key as unset: it must never clobber a value coming from a
/// lower-priority source. Returns `None` if the whole tree is unset.
pub fn prune_unset(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => Some(Value::Object(
            map.into_iter()
                .filter_map(|(key, value)| prune_unset(value).map(|value| (key, value)))
                .collect(),
        )),
        Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(prune_unset).collect(),
        )),
        other => Some(other),
    }
}
