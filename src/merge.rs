//! Helpers for the layered value tree: deep merge, dotted-key access and key
//! case folding.

use serde_json::{Map, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a map for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                base.insert(key, Value::Object(deep_merge(base_map, overlay_map)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// Set `value` at a dotted key, creating intermediate maps. A scalar sitting
/// where an intermediate map is needed gets replaced.
pub fn set_nested(map: &mut Map<String, Value>, dotted_key: &str, value: Value) {
    match dotted_key.split_once('.') {
        None => {
            map.insert(dotted_key.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = map
                .entry(head)
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(sub) = slot {
                set_nested(sub, rest, value);
            }
        }
    }
}

/// Look up a dotted key.
pub fn get_nested<'a>(map: &'a Map<String, Value>, dotted_key: &str) -> Option<&'a Value> {
    let mut segments = dotted_key.split('.');
    let first = segments.next()?;
    let mut current = map.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// All dotted paths to non-map values. Empty maps count as leaves so they are
/// not lost when a tree is rebuilt from its keys.
pub fn leaf_keys(map: &Map<String, Value>) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(map, "", &mut keys);
    keys
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, keys: &mut Vec<String>) {
    for (key, value) in map {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => collect_keys(inner, &dotted, keys),
            _ => keys.push(dotted),
        }
    }
}

/// Lowercase every key in the tree. Keys that collide after folding merge,
/// the later one (in map order) winning.
pub fn lowercase_keys(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        let value = match value {
            Value::Object(inner) => Value::Object(lowercase_keys(inner)),
            other => other,
        };
        let mut single = Map::new();
        single.insert(key.to_lowercase(), value);
        out = deep_merge(out, single);
    }
    out
}

/// Rename keys of `tree` to the spelling used in `shape` when they match
/// ignoring case. This lets lowercase config keys land on fields such as
/// `#[serde(rename = "Port")]`.
pub fn align_keys(tree: Map<String, Value>, shape: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in tree {
        let target = shape
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&key))
            .cloned()
            .unwrap_or(key);
        let value = match (value, shape.get(&target)) {
            (Value::Object(inner), Some(Value::Object(inner_shape))) => {
                Value::Object(align_keys(inner, inner_shape))
            }
            (value, _) => value,
        };
        out.insert(target, value);
    }
    out
}
