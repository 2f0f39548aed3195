#![expect(
    clippy::unwrap_used,
    clippy::panic,
    reason = "test code uses unwrap/panic for concise assertions"
)]

use subscription_error_wire::{
    Encoding, Error, ErrorScope, ScopeWarning, SubscriptionError, codec_for, decode, encode,
};

#[derive(serde::Deserialize)]
struct ObservedMessage {
    label: String,
    message: serde_json::Value,
}

fn load_observed(filename: &str) -> Vec<ObservedMessage> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = format!("{manifest_dir}/tests/fixtures/{filename}");
    let data =
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    serde_json::from_str(&data).unwrap_or_else(|e| panic!("failed to parse {path}: {e}"))
}

fn decode_observed(label: &str) -> SubscriptionError {
    let observed = load_observed("observed_errors.json");
    let entry = observed
        .iter()
        .find(|m| m.label == label)
        .unwrap_or_else(|| panic!("missing fixture for {label}"));
    let bytes = serde_json::to_vec(&entry.message).unwrap();
    decode(Encoding::Json, &bytes).unwrap_or_else(|e| panic!("decode failed for {label}: {e}"))
}

// ──────────────────── fixtures ────────────────────

#[test]
fn every_observed_message_decodes() {
    for entry in load_observed("observed_errors.json") {
        let bytes = serde_json::to_vec(&entry.message).unwrap();
        let result = decode(Encoding::Json, &bytes);
        assert!(result.is_ok(), "{} failed: {result:?}", entry.label);
    }
}

#[test]
fn query_scoped_example_decodes_field_for_field() {
    let value = decode_observed("unknown_table_in_query");
    assert_eq!(value.total_host_execution_duration_micros(), 1500);
    assert_eq!(value.request_id(), None);
    assert_eq!(value.query_id(), Some(7));
    assert_eq!(value.table_id(), None);
    assert_eq!(value.error(), "table not found");
    assert_eq!(value.scope(), ErrorScope::Query { query_id: 7 });
}

#[test]
fn zero_request_id_is_a_real_scope() {
    let value = decode_observed("one_off_query_parse_error");
    assert_eq!(value.request_id(), Some(0));
    assert_eq!(value.scope(), ErrorScope::Request { request_id: 0 });
}

#[test]
fn fully_scoped_error_routes_to_table() {
    let value = decode_observed("table_update_failed");
    assert_eq!(
        value.scope(),
        ErrorScope::Table {
            query_id: Some(3),
            table_id: 4096
        }
    );
    assert_eq!(value.scope_warning(), None);
}

#[test]
fn bare_message_falls_back_to_connection_scope() {
    let value = decode_observed("connection_level_without_text");
    assert_eq!(value, SubscriptionError::empty());
    assert_eq!(value.scope(), ErrorScope::Connection);
}

#[test]
fn extra_server_fields_are_ignored() {
    let value = decode_observed("newer_server_extra_fields");
    assert_eq!(
        value,
        SubscriptionError::from_fields(5000, None, Some(0), None, "subscription limit reached")
    );
}

#[test]
fn sats_sum_form_options_decode_from_server_traffic() {
    let value = decode_observed("sats_sum_form_options");
    assert_eq!(
        value,
        SubscriptionError::from_fields(640, None, Some(2), Some(0), "column `owner` does not exist")
    );
    assert_eq!(
        value.scope(),
        ErrorScope::Table {
            query_id: Some(2),
            table_id: 0
        }
    );
}

#[test]
fn scope_hierarchy_counterexamples_are_flagged_not_rejected() {
    let flagged: Vec<(String, ScopeWarning)> = load_observed("observed_errors.json")
        .into_iter()
        .filter_map(|entry| {
            let bytes = serde_json::to_vec(&entry.message).unwrap();
            let value = decode(Encoding::Json, &bytes).unwrap();
            value.scope_warning().map(|w| (entry.label, w))
        })
        .collect();

    assert_eq!(
        flagged,
        vec![(
            "orphan_table_scope".to_string(),
            ScopeWarning::TableWithoutQuery { table_id: 12 }
        )]
    );
}

// ──────────────────── cross-encoding ────────────────────

#[test]
fn observed_messages_survive_both_encodings() {
    for entry in load_observed("observed_errors.json") {
        let json = serde_json::to_vec(&entry.message).unwrap();
        let value = decode(Encoding::Json, &json).unwrap();
        for encoding in [Encoding::Json, Encoding::Bsatn] {
            let bytes = encode(encoding, &value).unwrap();
            assert_eq!(
                decode(encoding, &bytes).unwrap(),
                value,
                "{} did not round-trip through {encoding}",
                entry.label
            );
        }
    }
}

#[test]
fn codec_lookup_by_subprotocol() {
    let encoding = Encoding::from_subprotocol("v1.bsatn.spacetimedb").unwrap();
    let codec = codec_for(encoding);
    let value = SubscriptionError::from_fields(1, None, Some(2), Some(3), "x");
    let bytes = codec.encode(&value).unwrap();
    assert_eq!(codec.decode(&bytes).unwrap(), value);
}

#[test]
fn bytes_of_one_encoding_are_rejected_by_the_other() {
    let value = SubscriptionError::from_fields(1500, None, Some(7), None, "table not found");
    let binary = encode(Encoding::Bsatn, &value).unwrap();
    assert!(matches!(
        decode(Encoding::Json, &binary),
        Err(Error::Malformed { .. })
    ));
}
