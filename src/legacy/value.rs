use serde_json::Value;

/// Input of the legacy tagged encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Elements are keyed by their index.
    List(Vec<LegacyValue>),
    /// Entries keep insertion order.
    Map(Vec<(String, LegacyValue)>),
    /// Something with no encoding (a callback, a handle); skipped inside
    /// containers.
    Unencodable,
}

impl LegacyValue {
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<LegacyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        LegacyValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<LegacyValue>,
        I: IntoIterator<Item = V>,
    {
        LegacyValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_unencodable(&self) -> bool {
        matches!(self, LegacyValue::Unencodable)
    }
}

impl From<Value> for LegacyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => LegacyValue::Null,
            Value::Bool(b) => LegacyValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    LegacyValue::Int(i)
                } else {
                    // u64 above i64::MAX and every float land here
                    LegacyValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => LegacyValue::Text(s),
            Value::Array(items) => LegacyValue::List(items.into_iter().map(LegacyValue::from).collect()),
            Value::Object(map) => LegacyValue::Map(enumeration_order(
                map.into_iter().map(|(k, v)| (k, LegacyValue::from(v))).collect(),
            )),
        }
    }
}

/// Largest canonical array index of the legacy runtime (2^32 - 2).
const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

/// Array index of a key, when the legacy runtime treats it as one: digits
/// only, no leading zero unless the key is `0`, below 2^32 - 1.
fn array_index(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u64>().ok().filter(|i| *i <= MAX_ARRAY_INDEX)
}

/// Object key order of the legacy runtime: array indices ascending, then
/// every other key in insertion order.
fn enumeration_order(entries: Vec<(String, LegacyValue)>) -> Vec<(String, LegacyValue)> {
    let (mut indexed, named): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(key, _)| array_index(key).is_some());
    indexed.sort_by_key(|(key, _)| array_index(key));
    indexed.extend(named);
    indexed
}

impl From<&Value> for LegacyValue {
    fn from(value: &Value) -> Self {
        LegacyValue::from(value.clone())
    }
}

impl From<bool> for LegacyValue {
    fn from(b: bool) -> Self {
        LegacyValue::Bool(b)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for LegacyValue {
            fn from(i: $t) -> Self {
                LegacyValue::Int(i64::from(i))
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for LegacyValue {
    fn from(f: f32) -> Self {
        LegacyValue::Float(f64::from(f))
    }
}

impl From<f64> for LegacyValue {
    fn from(f: f64) -> Self {
        LegacyValue::Float(f)
    }
}

impl From<&str> for LegacyValue {
    fn from(s: &str) -> Self {
        LegacyValue::Text(s.to_owned())
    }
}

impl From<String> for LegacyValue {
    fn from(s: String) -> Self {
        LegacyValue::Text(s)
    }
}

impl<T: Into<LegacyValue>> From<Option<T>> for LegacyValue {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(LegacyValue::Null)
    }
}

impl<T: Into<LegacyValue>> From<Vec<T>> for LegacyValue {
    fn from(items: Vec<T>) -> Self {
        LegacyValue::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_adapter_keeps_object_order() {
        let value = LegacyValue::from(json!({"z": 1, "a": [true, null], "m": 1.5}));
        assert_eq!(
            value,
            LegacyValue::Map(vec![
                ("z".into(), LegacyValue::Int(1)),
                ("a".into(), LegacyValue::List(vec![LegacyValue::Bool(true), LegacyValue::Null])),
                ("m".into(), LegacyValue::Float(1.5)),
            ])
        );
    }

    #[test]
    fn json_adapter_puts_array_indices_first() {
        let value = LegacyValue::from(json!({"b": 1, "10": "x", "01": "y", "2": "z", "4294967295": "w"}));
        let keys: Vec<&str> = match &value {
            LegacyValue::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            other => panic!("unexpected {:?}", other),
        };
        // "01" has a leading zero and 4294967295 is past the last index: both stay in place
        assert_eq!(keys, vec!["2", "10", "b", "01", "4294967295"]);
    }

    #[test]
    fn huge_unsigned_becomes_float() {
        assert_eq!(LegacyValue::from(json!(u64::MAX)), LegacyValue::Float(u64::MAX as f64));
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(LegacyValue::from(None::<i32>), LegacyValue::Null);
        assert_eq!(LegacyValue::from(Some("x")), LegacyValue::Text("x".into()));
    }
}
