use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Wire name of the host execution time.
pub const FIELD_DURATION: &str = "total_host_execution_duration_micros";
/// Wire name of the request scope identifier.
pub const FIELD_REQUEST_ID: &str = "request_id";
/// Wire name of the query scope identifier.
pub const FIELD_QUERY_ID: &str = "query_id";
/// Wire name of the table scope identifier.
pub const FIELD_TABLE_ID: &str = "table_id";
/// Wire name of the error text.
pub const FIELD_ERROR: &str = "error";

/// Wire names in encoding order. Stable across versions; new fields are only appended.
pub const WIRE_FIELDS: &[&str] = &[
    FIELD_DURATION,
    FIELD_REQUEST_ID,
    FIELD_QUERY_ID,
    FIELD_TABLE_ID,
    FIELD_ERROR,
];

/// An error the server raised while evaluating or maintaining a subscription.
///
/// The three identifiers narrow what the error pertains to. An absent
/// identifier means "not scoped at that level"; `Some(0)` is a real id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionError {
    #[serde(rename = "total_host_execution_duration_micros")]
    duration_micros: u64,
    #[serde(
        rename = "request_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    request_id: Option<u32>,
    #[serde(rename = "query_id", default, skip_serializing_if = "Option::is_none")]
    query_id: Option<u32>,
    #[serde(rename = "table_id", default, skip_serializing_if = "Option::is_none")]
    table_id: Option<u32>,
    #[serde(rename = "error", default, deserialize_with = "null_as_empty")]
    message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SubscriptionError {
    /// Placeholder value: zero duration, no scope, empty text.
    pub fn empty() -> Self {
        Self {
            duration_micros: 0,
            request_id: None,
            query_id: None,
            table_id: None,
            message: String::new(),
        }
    }

    /// Fully specified value. No validation beyond the field types.
    pub fn from_fields(
        duration_micros: u64,
        request_id: Option<u32>,
        query_id: Option<u32>,
        table_id: Option<u32>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            duration_micros,
            request_id,
            query_id,
            table_id,
            message: error.into(),
        }
    }

    /// Microseconds the host spent on the request that produced this error.
    pub fn total_host_execution_duration_micros(&self) -> u64 {
        self.duration_micros
    }

    /// Host execution time as a [`Duration`].
    pub fn host_execution_duration(&self) -> Duration {
        Duration::from_micros(self.duration_micros)
    }

    /// Request this error is scoped to, if any.
    pub fn request_id(&self) -> Option<u32> {
        self.request_id
    }

    /// Standing query this error is scoped to, if any.
    pub fn query_id(&self) -> Option<u32> {
        self.query_id
    }

    /// Table within the query this error is scoped to, if any.
    pub fn table_id(&self) -> Option<u32> {
        self.table_id
    }

    /// Human-readable description. May be empty, never missing.
    pub fn error(&self) -> &str {
        &self.message
    }

    /// Consumes the value, returning the error text.
    pub fn into_error(self) -> String {
        self.message
    }
}

impl Default for SubscriptionError {
    fn default() -> Self {
        Self::empty()
    }
}
