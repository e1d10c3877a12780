//! Canonical JSON (RFC 8785) for `@json` literals.

use serde_json::Value as JsonValue;

/// Serialize JSON in canonical form: sorted keys, no whitespace,
/// shortest number forms.
pub fn canonicalize(data: &JsonValue) -> String {
    let mut out = String::new();
    write_value(data, &mut out);
    out
}

fn write_value(data: &JsonValue, out: &mut String) {
    match data {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        JsonValue::Number(n) => out.push_str(&canonical_number(n)),
        JsonValue::String(s) => out.push_str(&JsonValue::String(s.clone()).to_string()),
        JsonValue::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        JsonValue::Object(map) => {
            // Keys sort by UTF-16 code units
            let mut pairs: Vec<(&String, &JsonValue)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.encode_utf16().cmp(b.0.encode_utf16()));

            out.push('{');
            for (i, (k, v)) in pairs.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&JsonValue::String(k.clone()).to_string());
                out.push(':');
                write_value(v, out);
            }
            out.push('}');
        }
    }
}

fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => {
            // `{:e}` gives `1e21`; canonical form signs the exponent
            let exp = format!("{f:e}");
            match exp.split_once('e') {
                Some((mantissa, e)) if !e.starts_with('-') => format!("{mantissa}e+{e}"),
                _ => exp,
            }
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
