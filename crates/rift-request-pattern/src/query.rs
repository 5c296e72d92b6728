//! Query-string parsing and encoding.
//!
//! Query strings decode into a [`QueryMap`] using subscript notation:
//! `a[b]=1` nests, `a[]=1&a[]=2` collects into an array, and repeated flat
//! keys keep the last value. The same decoder doubles as the default body
//! decoder for form-encoded payloads.

use serde_json::{Map, Value};

/// Decoded query parameters. Values are strings, `null` for bare keys,
/// arrays for `key[]` entries or nested maps for `key[sub]` entries.
pub type QueryMap = Map<String, Value>;

/// Parse a query string (without the leading `?`) into a [`QueryMap`].
///
/// Keys and values are percent-decoded and `+` is read as a space.
pub fn parse_query_string(query: &str) -> QueryMap {
    let mut params = QueryMap::new();
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), Value::String(decode_component(value))),
            None => (decode_component(pair), Value::Null),
        };
        insert_subscript(&mut params, &split_subscripts(&key), value);
    }
    params
}

/// Encode a [`QueryMap`] back into a query string.
///
/// Top-level and nested keys are emitted in sorted order so the output is
/// deterministic; array order is preserved.
pub fn encode_query(params: &QueryMap) -> String {
    let mut pairs = Vec::new();
    for (key, value) in sorted_entries(params) {
        flatten_pair(&mut pairs, key, value);
    }
    pairs.join("&")
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Split `a[b][]` into `["a", "b", ""]`. Keys that are not well-formed
/// subscripts are returned whole.
fn split_subscripts(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key];
    }

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return vec![key];
        };
        segments.push(&stripped[..close]);
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() {
        return vec![key];
    }
    segments
}

fn insert_subscript(target: &mut QueryMap, segments: &[&str], value: Value) {
    let Some((head, tail)) = segments.split_first() else {
        return;
    };

    match tail {
        [] => {
            target.insert((*head).to_string(), value);
        }
        [""] => {
            let entry = target
                .entry((*head).to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            match entry {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            }
        }
        _ => {
            let entry = target
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                insert_subscript(nested, tail, value);
            }
        }
    }
}

fn sorted_entries(map: &QueryMap) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn encode_key(key: &str) -> String {
    urlencoding::encode(key)
        .replace("%5B", "[")
        .replace("%5D", "]")
}

fn flatten_pair(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => pairs.push(encode_key(key)),
        Value::String(s) => pairs.push(format!("{}={}", encode_key(key), urlencoding::encode(s))),
        Value::Array(items) => {
            let array_key = format!("{key}[]");
            for item in items {
                flatten_pair(pairs, &array_key, item);
            }
        }
        Value::Object(nested) => {
            for (sub_key, sub_value) in sorted_entries(nested) {
                flatten_pair(pairs, &format!("{key}[{sub_key}]"), sub_value);
            }
        }
        other => pairs.push(format!("{}={}", encode_key(key), other)),
    }
}
