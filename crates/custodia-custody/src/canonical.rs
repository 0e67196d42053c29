//! Canonical JSON encoding.
//!
//! A custody log digest is only meaningful if two structurally equal logs
//! always produce the same bytes. Plain `serde_json` serialization of a
//! `Value` depends on map insertion order, so this module defines the
//! canonical form explicitly:
//!
//!   1. Object keys sorted lexicographically by their UTF-8 bytes.
//!   2. No insignificant whitespace.
//!   3. Strings escaped exactly as `serde_json` escapes them.
//!   4. Numbers rendered exactly as `serde_json` renders them.
//!
//! Everything that feeds a digest goes through `canonical_bytes`.

use serde_json::Value;

/// Render `value` in canonical form as UTF-8 bytes.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_value(&mut out, value);
    out.into_bytes()
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        // `Number`'s Display is the same ryu/itoa rendering serde_json
        // uses when serializing, so round-trips stay byte-identical.
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped(out, key);
                out.push(':');
                write_value(out, &map[*key]);
            }
            out.push('}');
        }
    }
}

/// Escape `s` as a JSON string literal, delegating to serde_json so the
/// escaping rules can never drift from the deserializer's.
fn write_escaped(out: &mut String, s: &str) {
    // Serializing a &str to a JSON string cannot fail.
    let escaped = serde_json::to_string(s).expect("string serialization is infallible");
    out.push_str(&escaped);
}
