//! Field deserializers that never fail. A value of the wrong shape decodes as
//! `None` (or an empty list), so one odd record cannot sink a whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(as_id))
}

pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(as_number))
}

pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(as_text))
}

pub fn records<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

pub fn as_id(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Strings, numbers and booleans print as themselves; arrays join with ", ".
/// Blank strings count as missing.
pub fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_id() {
        assert_eq!(as_id(&json!(42)), Some(42));
        assert_eq!(as_id(&json!(42.0)), Some(42));
        assert_eq!(as_id(&json!(" 42 ")), Some(42));
        assert_eq!(as_id(&json!(42.5)), None);
        assert_eq!(as_id(&json!("abc")), None);
        assert_eq!(as_id(&json!(null)), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(7.5)), Some(7.5));
        assert_eq!(as_number(&json!("8.1")), Some(8.1));
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!([1])), None);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(as_text(&json!("Drama")), Some("Drama".to_string()));
        assert_eq!(as_text(&json!("  ")), None);
        assert_eq!(as_text(&json!(1995)), Some("1995".to_string()));
        assert_eq!(
            as_text(&json!(["Tom Hanks", null, "Tim Allen"])),
            Some("Tom Hanks, Tim Allen".to_string())
        );
        assert_eq!(as_text(&json!([])), None);
        assert_eq!(as_text(&json!({ "a": 1 })), None);
    }
}
