/// Failure to turn bytes into a [`SubscriptionError`](crate::SubscriptionError) or back.
///
/// This is never the server-reported error itself; that one is ordinary data.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("truncated input: {reason}")]
    Truncated { reason: String },

    #[error("malformed input: {reason}")]
    Malformed { reason: String },

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
