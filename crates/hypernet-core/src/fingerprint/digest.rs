//! Canonical digest (`tn`) of a device profile.
//!
//! Keys are visited in sorted order at every level. Numbers become fixed-point
//! integers with four implied decimals (truncated, not rounded), nested objects
//! are inlined recursively and everything else is stringified. The pieces are
//! concatenated without separators and MD5-hashed.

use serde_json::{Map, Number, Value};

use crate::utils::text::{md5_hex, py_str};

const FIXED_POINT_SCALE: i128 = 10_000;

/// Order-independent concatenation of all values in `map`.
pub fn canonical_string(map: &Map<String, Value>) -> String {
    let mut out = String::new();
    write_canonical(map, &mut out);
    out
}

/// Lowercase hex MD5 of [`canonical_string`].
pub fn canonical_digest(map: &Map<String, Value>) -> String {
    md5_hex(canonical_string(map))
}

fn write_canonical(map: &Map<String, Value>, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable();

    for key in keys {
        match map.get(key) {
            Some(Value::Number(n)) => out.push_str(&fixed_point(n)),
            Some(Value::Bool(b)) => out.push_str(&(i128::from(*b) * FIXED_POINT_SCALE).to_string()),
            Some(Value::Object(nested)) => write_canonical(nested, out),
            Some(other) => out.push_str(&py_str(other)),
            None => {},
        }
    }
}

fn fixed_point(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return (i128::from(i) * FIXED_POINT_SCALE).to_string();
    }
    if let Some(u) = n.as_u64() {
        return (i128::from(u) * FIXED_POINT_SCALE).to_string();
    }
    let scaled = n.as_f64().unwrap_or_default() * 10_000.0;
    format!("{}", scaled.trunc() as i128)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = as_map(json!({"b": 2, "a": 1}));
        let b = as_map(json!({"a": 1, "b": 2}));
        assert_eq!(canonical_string(&a), "1000020000");
        assert_eq!(canonical_digest(&a), canonical_digest(&b));
        assert_eq!(canonical_digest(&a), "56e3c73e707c81c26bc7aac2f6afb943");
    }

    #[test]
    fn test_nested_and_truncated() {
        let map = as_map(json!({"z": "x", "n": {"y": 1.234_567_89, "b": "q"}, "t": -480}));
        assert_eq!(canonical_string(&map), "q12345-4800000x");
        assert_eq!(canonical_digest(&map), "9ae163a5621fad6d8bfe6f6f81a8561f");
    }

    #[test]
    fn test_negative_float_truncates_toward_zero() {
        let map = as_map(json!({"v": -0.000_19}));
        assert_eq!(canonical_string(&map), "-1");
    }

    #[test]
    fn test_bool_null_and_empty() {
        let map = as_map(json!({"a": true, "b": false, "c": null, "d": ""}));
        assert_eq!(canonical_string(&map), "100000None");
        assert_eq!(canonical_digest(&Map::new()), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
