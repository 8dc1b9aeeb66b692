//! Lenient deserializers for fields the backends disagree on.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts RFC 3339 timestamps and naive ISO timestamps (treated as UTC).
/// Anything unparseable becomes `None` instead of failing the whole record.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Identifiers arrive as strings from the identity provider and as numbers
/// from the REST backend.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Numeric identifiers, also when a backend sends them as strings.
pub(crate) fn id_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_from_value(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a numeric id, got {value}"))
    })
}

pub(crate) fn opt_id_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => number_from_value(&value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a numeric id, got {value}"))
        }),
    }
}

fn number_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_from_value_accepts_numeric_strings() {
        assert_eq!(number_from_value(&Value::from(12)), Some(12));
        assert_eq!(number_from_value(&Value::from(" 12 ")), Some(12));
        assert_eq!(number_from_value(&Value::from("abc")), None);
        assert_eq!(number_from_value(&Value::from(-1)), None);
    }

    #[test]
    fn test_parse_timestamp_accepts_rfc3339_and_naive() {
        assert!(parse_timestamp("2024-05-01T10:00:00.000Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
