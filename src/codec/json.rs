use serde_json::Value;
use serde_json::error::Category;

use crate::codec::{Encoding, MessageCodec};
use crate::error::Error;
use crate::types::{
    FIELD_DURATION, FIELD_ERROR, FIELD_QUERY_ID, FIELD_REQUEST_ID, FIELD_TABLE_ID,
    SubscriptionError, WIRE_FIELDS,
};

/// Self-describing text encoding: one JSON object keyed by wire name.
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    fn encode(&self, value: &SubscriptionError) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SubscriptionError, Error> {
        let parsed: Value = serde_json::from_slice(bytes).map_err(classify_parse_error)?;
        from_value(&parsed)
    }
}

fn classify_parse_error(err: serde_json::Error) -> Error {
    match err.classify() {
        Category::Eof => Error::Truncated {
            reason: err.to_string(),
        },
        Category::Syntax | Category::Data | Category::Io => Error::Malformed {
            reason: err.to_string(),
        },
    }
}

/// Builds a value from an already-parsed JSON object, e.g. one nested in a
/// larger server message envelope.
pub fn from_value(value: &Value) -> Result<SubscriptionError, Error> {
    let obj = value.as_object().ok_or_else(|| Error::Malformed {
        reason: format!("expected a JSON object, got {}", json_kind(value)),
    })?;

    for key in obj.keys() {
        if !WIRE_FIELDS.contains(&key.as_str()) {
            tracing::debug!(field = %key, "ignoring unknown subscription error field");
        }
    }

    let duration = match obj.get(FIELD_DURATION) {
        None => {
            return Err(Error::MissingField {
                field: FIELD_DURATION,
            });
        }
        Some(v) => v.as_u64().ok_or_else(|| Error::InvalidField {
            field: FIELD_DURATION,
            reason: format!("expected an unsigned 64-bit integer, got {v}"),
        })?,
    };

    let error = match obj.get(FIELD_ERROR) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(Error::InvalidField {
                field: FIELD_ERROR,
                reason: format!("expected a string, got {}", json_kind(other)),
            });
        }
    };

    Ok(SubscriptionError::from_fields(
        duration,
        optional_id(obj, FIELD_REQUEST_ID)?,
        optional_id(obj, FIELD_QUERY_ID)?,
        optional_id(obj, FIELD_TABLE_ID)?,
        error,
    ))
}

/// Accepts a bare integer, `null`, or the SATS sum form `{"some": n}` / `{"none": []}`.
fn optional_id(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<u32>, Error> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Object(sum)) if sum.len() == 1 => match sum.iter().next() {
            Some((tag, _)) if tag == "none" => Ok(None),
            Some((tag, inner)) if tag == "some" => bare_id(inner, field).map(Some),
            _ => Err(Error::InvalidField {
                field,
                reason: format!("expected an option variant `some` or `none`, got {v}"),
            }),
        },
        Some(v) => bare_id(v, field).map(Some),
    }
}

fn bare_id(value: &Value, field: &'static str) -> Result<u32, Error> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| Error::InvalidField {
            field,
            reason: format!("expected an unsigned 32-bit integer, got {value}"),
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::panic,
    reason = "test code uses unwrap/panic for concise assertions"
)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<SubscriptionError, Error> {
        JsonCodec.decode(json.as_bytes())
    }

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    fn random_id(state: &mut u64) -> Option<u32> {
        match lcg_next(state) % 4 {
            0 => None,
            1 => Some(0),
            2 => Some(u32::MAX),
            _ => Some((lcg_next(state) >> 32) as u32),
        }
    }

    fn random_text(state: &mut u64) -> String {
        const ALPHABET: &[&str] = &["a", "Z", " ", "\"", "\\", "\n", "é", "表", "🦀", "\u{0}"];
        let len = lcg_next(state) % 12;
        (0..len)
            .map(|_| ALPHABET[(lcg_next(state) % ALPHABET.len() as u64) as usize])
            .collect()
    }

    #[test]
    fn decodes_query_scoped_example() {
        let value = decode(
            r#"{"total_host_execution_duration_micros":1500,"query_id":7,"error":"table not found"}"#,
        )
        .unwrap();
        assert_eq!(value.total_host_execution_duration_micros(), 1500);
        assert_eq!(value.request_id(), None);
        assert_eq!(value.query_id(), Some(7));
        assert_eq!(value.table_id(), None);
        assert_eq!(value.error(), "table not found");
    }

    #[test]
    fn missing_error_defaults_to_empty() {
        let value = decode(r#"{"total_host_execution_duration_micros":0}"#).unwrap();
        assert_eq!(value, SubscriptionError::empty());
        let value = decode(r#"{"total_host_execution_duration_micros":0,"error":null}"#).unwrap();
        assert_eq!(value.error(), "");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let value = decode(
            r#"{"total_host_execution_duration_micros":2,"error":"x","retry_after_micros":500}"#,
        )
        .unwrap();
        assert_eq!(value, SubscriptionError::from_fields(2, None, None, None, "x"));
    }

    #[test]
    fn null_identifier_is_absent_not_zero() {
        let value = decode(
            r#"{"total_host_execution_duration_micros":1,"request_id":null,"query_id":0}"#,
        )
        .unwrap();
        assert_eq!(value.request_id(), None);
        assert_eq!(value.query_id(), Some(0));
    }

    #[test]
    fn sats_sum_form_options_decode() {
        let value = decode(
            r#"{"total_host_execution_duration_micros":1500,"request_id":{"none":[]},"query_id":{"some":7},"table_id":{"some":0},"error":"table not found"}"#,
        )
        .unwrap();
        assert_eq!(
            value,
            SubscriptionError::from_fields(1500, None, Some(7), Some(0), "table not found")
        );
    }

    #[test]
    fn malformed_sum_form_options_are_rejected() {
        let cases: &[&str] = &[
            r#"{"total_host_execution_duration_micros":1,"query_id":{"some":"7"}}"#,
            r#"{"total_host_execution_duration_micros":1,"query_id":{"some":4294967296}}"#,
            r#"{"total_host_execution_duration_micros":1,"query_id":{"maybe":7}}"#,
            r#"{"total_host_execution_duration_micros":1,"query_id":{"some":7,"none":[]}}"#,
            r#"{"total_host_execution_duration_micros":1,"query_id":{}}"#,
        ];
        for json in cases {
            assert!(
                matches!(
                    decode(json),
                    Err(Error::InvalidField {
                        field: FIELD_QUERY_ID,
                        ..
                    })
                ),
                "expected InvalidField for {json}"
            );
        }
    }

    #[test]
    fn absent_and_zero_stay_distinct_after_roundtrip() {
        let zero = SubscriptionError::from_fields(1, Some(0), None, None, "");
        let absent = SubscriptionError::from_fields(1, None, None, None, "");
        let zero_back = JsonCodec.decode(&JsonCodec.encode(&zero).unwrap()).unwrap();
        let absent_back = JsonCodec.decode(&JsonCodec.encode(&absent).unwrap()).unwrap();
        assert_eq!(zero_back.request_id(), Some(0));
        assert_eq!(absent_back.request_id(), None);
        assert_ne!(zero_back, absent_back);
    }

    #[test]
    fn absent_identifiers_are_omitted_on_the_wire() {
        let bytes = JsonCodec
            .encode(&SubscriptionError::from_fields(9, None, Some(0), None, "e"))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("request_id"));
        assert!(!text.contains("table_id"));
        assert!(text.contains(r#""query_id":0"#));
    }

    #[test]
    fn truncated_input_is_reported_as_truncated() {
        assert!(matches!(decode(""), Err(Error::Truncated { .. })));
        assert!(matches!(
            decode(r#"{"total_host_execution_duration_micros":15"#),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn structural_errors_are_malformed() {
        assert!(matches!(decode("[1,2]"), Err(Error::Malformed { .. })));
        assert!(matches!(decode("{,}"), Err(Error::Malformed { .. })));
        assert!(matches!(
            JsonCodec.decode(b"{\"error\":\"\xff\"}"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn missing_duration_is_rejected() {
        assert!(matches!(
            decode(r#"{"error":"boom"}"#),
            Err(Error::MissingField {
                field: FIELD_DURATION
            })
        ));
    }

    #[test]
    fn mistyped_fields_are_rejected() {
        let cases: &[(&str, &str)] = &[
            (
                r#"{"total_host_execution_duration_micros":-1}"#,
                FIELD_DURATION,
            ),
            (
                r#"{"total_host_execution_duration_micros":1.5}"#,
                FIELD_DURATION,
            ),
            (
                r#"{"total_host_execution_duration_micros":"10"}"#,
                FIELD_DURATION,
            ),
            (
                r#"{"total_host_execution_duration_micros":null}"#,
                FIELD_DURATION,
            ),
            (
                r#"{"total_host_execution_duration_micros":1,"request_id":4294967296}"#,
                FIELD_REQUEST_ID,
            ),
            (
                r#"{"total_host_execution_duration_micros":1,"query_id":"7"}"#,
                FIELD_QUERY_ID,
            ),
            (
                r#"{"total_host_execution_duration_micros":1,"table_id":-3}"#,
                FIELD_TABLE_ID,
            ),
            (
                r#"{"total_host_execution_duration_micros":1,"error":42}"#,
                FIELD_ERROR,
            ),
        ];
        for (json, expected_field) in cases {
            match decode(json) {
                Err(Error::InvalidField { field, .. }) => {
                    assert_eq!(field, *expected_field, "wrong field for {json}");
                }
                other => panic!("expected InvalidField for {json}, got {other:?}"),
            }
        }
    }

    #[test]
    fn boundary_values_roundtrip() {
        let value =
            SubscriptionError::from_fields(u64::MAX, Some(u32::MAX), Some(0), Some(u32::MAX), "");
        let back = JsonCodec.decode(&JsonCodec.encode(&value).unwrap()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn manual_decode_agrees_with_serde_derive() {
        let json = serde_json::json!({
            "total_host_execution_duration_micros": 77,
            "request_id": 3,
            "table_id": 0,
            "future_field": [1, 2, 3]
        });
        let manual = from_value(&json).unwrap();
        let derived: SubscriptionError = serde_json::from_value(json).unwrap();
        assert_eq!(manual, derived);
    }

    #[test]
    fn roundtrip_property_holds_for_randomized_values() {
        let mut seed = 0x0005_EED5_u64;
        for _ in 0..5_000 {
            let value = SubscriptionError::from_fields(
                lcg_next(&mut seed),
                random_id(&mut seed),
                random_id(&mut seed),
                random_id(&mut seed),
                random_text(&mut seed),
            );
            let bytes = JsonCodec.encode(&value).unwrap();
            assert_eq!(JsonCodec.decode(&bytes).unwrap(), value);
        }
    }
}
