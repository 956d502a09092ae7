//! Length-prefixed tagged encoding understood by the legacy deserializer.
//!
//! ```text
//! N;            null
//! b:1;          boolean
//! i:5;          integral number
//! d:5.5;        fractional number
//! s:2:"ab";     text, prefixed with its byte length
//! a:2:{...}     list or map, entry count then key/value pairs, no `;`
//! ```

use std::fmt::Write;

use crate::legacy::value::LegacyValue;

/// Encodes `value`. Total over every input; an unencodable value on its
/// own yields the empty string.
pub fn serialize(value: &LegacyValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Convenience for JSON input, see [`LegacyValue::from`].
pub fn serialize_json(value: &serde_json::Value) -> String {
    serialize(&LegacyValue::from(value))
}

fn write_value(out: &mut String, value: &LegacyValue) {
    match value {
        LegacyValue::Null => out.push_str("N;"),
        LegacyValue::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
        LegacyValue::Int(i) => {
            let _ = write!(out, "i:{};", i);
        }
        LegacyValue::Float(f) => {
            let tag = if f.round() == *f { 'i' } else { 'd' };
            let _ = write!(out, "{}:{};", tag, format_number(*f));
        }
        LegacyValue::Text(s) => write_text(out, s),
        LegacyValue::List(items) => {
            let entries = items
                .iter()
                .enumerate()
                .filter(|(_, item)| !item.is_unencodable());
            write_structure(out, entries.map(|(index, item)| (Key::Index(index), item)));
        }
        LegacyValue::Map(entries) => {
            let entries = entries.iter().filter(|(_, item)| !item.is_unencodable());
            write_structure(out, entries.map(|(key, item)| (Key::Name(key), item)));
        }
        LegacyValue::Unencodable => {}
    }
}

enum Key<'a> {
    Index(usize),
    Name(&'a str),
}

fn write_structure<'a>(out: &mut String, entries: impl Iterator<Item = (Key<'a>, &'a LegacyValue)>) {
    let mut body = String::new();
    let mut count = 0usize;
    for (key, item) in entries {
        match key {
            Key::Index(index) => {
                let _ = write!(body, "i:{};", index);
            }
            Key::Name(name) => write_key(&mut body, name),
        }
        write_value(&mut body, item);
        count += 1;
    }
    let _ = write!(out, "a:{}:{{{}}}", count, body);
}

/// Digit-only keys are array indices in the legacy format.
fn write_key(out: &mut String, key: &str) {
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        let digits = key.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        let _ = write!(out, "i:{};", digits);
    } else {
        write_text(out, key);
    }
}

fn write_text(out: &mut String, s: &str) {
    let _ = write!(out, "s:{}:\"{}\";", legacy_byte_len(s), s);
}

/// Byte length as the legacy encoder counts it: per UTF-16 code unit,
/// 1 below 0x80, 2 below 0x800, 3 otherwise. Astral characters count as
/// two surrogates (6) instead of their true UTF-8 width (4).
pub fn legacy_byte_len(s: &str) -> usize {
    s.encode_utf16()
        .map(|unit| match unit {
            0..=0x7f => 1,
            0x80..=0x7ff => 2,
            _ => 3,
        })
        .sum()
}

/// Number to text the way the legacy runtime prints doubles.
pub fn format_number(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_owned();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if f == 0.0 {
        // covers -0
        return "0".to_owned();
    }

    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(serialize(&LegacyValue::Null), "N;");
        assert_eq!(serialize(&true.into()), "b:1;");
        assert_eq!(serialize(&false.into()), "b:0;");
        assert_eq!(serialize(&5i64.into()), "i:5;");
        assert_eq!(serialize(&(-12i64).into()), "i:-12;");
        assert_eq!(serialize(&5.5f64.into()), "d:5.5;");
        assert_eq!(serialize(&"ab".into()), "s:2:\"ab\";");
        assert_eq!(serialize(&"".into()), "s:0:\"\";");
    }

    #[test]
    fn integral_float_uses_integer_tag() {
        assert_eq!(serialize(&LegacyValue::Float(5.0)), "i:5;");
        assert_eq!(serialize(&LegacyValue::Float(-0.0)), "i:0;");
        assert_eq!(serialize(&LegacyValue::Float(1e21)), "i:1e+21;");
        assert_eq!(serialize(&LegacyValue::Float(0.1)), "d:0.1;");
        assert_eq!(serialize(&LegacyValue::Float(1.5e-7)), "d:1.5e-7;");
    }

    #[test]
    fn non_finite_numbers() {
        assert_eq!(serialize(&LegacyValue::Float(f64::NAN)), "d:NaN;");
        assert_eq!(serialize(&LegacyValue::Float(f64::INFINITY)), "i:Infinity;");
        assert_eq!(serialize(&LegacyValue::Float(f64::NEG_INFINITY)), "i:-Infinity;");
    }

    #[test]
    fn text_length_counts_legacy_bytes() {
        // U+00E9 is 2 bytes, U+20AC is 3
        assert_eq!(serialize(&"é".into()), "s:2:\"é\";");
        assert_eq!(serialize(&"€".into()), "s:3:\"€\";");
        assert_eq!(serialize(&"a€b".into()), "s:5:\"a€b\";");
        // U+1F600 is a surrogate pair: 3 + 3
        assert_eq!(legacy_byte_len("😀"), 6);
    }

    #[test]
    fn list_uses_integer_keys() {
        let value = LegacyValue::list(["a", "b"]);
        assert_eq!(serialize(&value), "a:2:{i:0;s:1:\"a\";i:1;s:1:\"b\";}");
        assert_eq!(serialize(&LegacyValue::List(vec![])), "a:0:{}");
    }

    #[test]
    fn digit_keys_become_integers() {
        let value = LegacyValue::map([("0", "a"), ("1", "b")]);
        assert_eq!(serialize(&value), "a:2:{i:0;s:1:\"a\";i:1;s:1:\"b\";}");

        let value = LegacyValue::map([("007", 1i64), ("x1", 2), ("", 3)]);
        assert_eq!(serialize(&value), "a:3:{i:7;i:1;s:2:\"x1\";i:2;s:0:\"\";i:3;}");
    }

    #[test]
    fn unencodable_entries_are_skipped_and_not_counted() {
        let value = LegacyValue::Map(vec![
            ("name".into(), "x".into()),
            ("callback".into(), LegacyValue::Unencodable),
            ("n".into(), LegacyValue::Null),
        ]);
        assert_eq!(serialize(&value), "a:2:{s:4:\"name\";s:1:\"x\";s:1:\"n\";N;}");

        let value = LegacyValue::List(vec![1i64.into(), LegacyValue::Unencodable, 3i64.into()]);
        assert_eq!(serialize(&value), "a:2:{i:0;i:1;i:2;i:3;}");

        assert_eq!(serialize(&LegacyValue::Unencodable), "");
    }

    #[test]
    fn nested_structures_from_json() {
        let value = json!({
            "emails": [{"email": "a@b.c", "variables": {"name": "Jo"}}],
            "active": true,
            "rate": 0.25
        });
        assert_eq!(
            serialize_json(&value),
            concat!(
                "a:3:{",
                "s:6:\"emails\";a:1:{i:0;a:2:{s:5:\"email\";s:5:\"a@b.c\";s:9:\"variables\";a:1:{s:4:\"name\";s:2:\"Jo\";}}}",
                "s:6:\"active\";b:1;",
                "s:4:\"rate\";d:0.25;",
                "}"
            )
        );
    }

    #[test]
    fn json_objects_list_index_keys_first() {
        assert_eq!(serialize_json(&json!({"b": 1, "1": 2})), "a:2:{i:1;i:2;s:1:\"b\";i:1;}");
    }

    #[test]
    fn deterministic_for_same_input() {
        let value = json!({"b": [1, 2.5, "x"], "a": {"k": null}});
        assert_eq!(serialize_json(&value), serialize_json(&value));
    }
}
