use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::codec::{self, Encoding};
use crate::types::SubscriptionError;

#[derive(Serialize)]
struct DecodedView<'a> {
    total_host_execution_duration_micros: u64,
    request_id: Option<u32>,
    query_id: Option<u32>,
    table_id: Option<u32>,
    error: &'a str,
    scope: &'static str,
    warning: Option<String>,
}

impl<'a> From<&'a SubscriptionError> for DecodedView<'a> {
    fn from(value: &'a SubscriptionError) -> Self {
        Self {
            total_host_execution_duration_micros: value.total_host_execution_duration_micros(),
            request_id: value.request_id(),
            query_id: value.query_id(),
            table_id: value.table_id(),
            error: value.error(),
            scope: value.scope().as_str(),
            warning: value.scope_warning().map(|w| w.to_string()),
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    // u64 durations become BigInt so large values survive the crossing.
    let serializer =
        serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}

fn error_result(msg: &str) -> JsValue {
    to_js(&serde_json::json!({ "error": msg }))
}

fn decode_to_js(encoding: Encoding, bytes: &[u8]) -> JsValue {
    match codec::decode(encoding, bytes) {
        Ok(value) => to_js(&DecodedView::from(&value)),
        Err(e) => error_result(&e.to_string()),
    }
}

/// Decode a text-protocol subscription error.
#[wasm_bindgen]
pub fn decode_subscription_error_json(json: &str) -> JsValue {
    decode_to_js(Encoding::Json, json.as_bytes())
}

/// Decode a binary-protocol subscription error.
#[wasm_bindgen]
pub fn decode_subscription_error_bsatn(bytes: &[u8]) -> JsValue {
    decode_to_js(Encoding::Bsatn, bytes)
}

/// Re-encode a text-protocol subscription error in the binary layout.
#[wasm_bindgen]
pub fn encode_subscription_error_bsatn(json: &str) -> Result<Vec<u8>, JsValue> {
    let value = codec::decode(Encoding::Json, json.as_bytes())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    codec::encode(Encoding::Bsatn, &value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Websocket subprotocol for an encoding name (`"json"` or `"bsatn"`).
#[wasm_bindgen]
pub fn subprotocol_for(encoding: &str) -> Option<String> {
    encoding
        .parse::<Encoding>()
        .ok()
        .map(|e| e.subprotocol().to_string())
}
