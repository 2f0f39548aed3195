pub mod bsatn;
pub mod json;

use crate::codec::bsatn::BsatnCodec;
use crate::codec::json::JsonCodec;
use crate::error::Error;
use crate::types::SubscriptionError;

pub const JSON_SUBPROTOCOL: &str = "v1.json.spacetimedb";
pub const BSATN_SUBPROTOCOL: &str = "v1.bsatn.spacetimedb";

/// Wire encoding negotiated with the server, one per websocket subprotocol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
pub enum Encoding {
    Json,
    Bsatn,
}

impl Encoding {
    pub fn from_subprotocol(subprotocol: &str) -> Option<Self> {
        match subprotocol {
            JSON_SUBPROTOCOL => Some(Self::Json),
            BSATN_SUBPROTOCOL => Some(Self::Bsatn),
            _ => None,
        }
    }

    pub fn subprotocol(self) -> &'static str {
        match self {
            Self::Json => JSON_SUBPROTOCOL,
            Self::Bsatn => BSATN_SUBPROTOCOL,
        }
    }

    pub fn all_subprotocols() -> &'static [&'static str] {
        &[JSON_SUBPROTOCOL, BSATN_SUBPROTOCOL]
    }
}

pub trait MessageCodec: Sync {
    fn encoding(&self) -> Encoding;

    fn encode(&self, value: &SubscriptionError) -> Result<Vec<u8>, Error>;

    /// Decodes one message. Unknown fields are skipped and a missing `error`
    /// becomes `""`; anything else that does not fit fails this call only.
    fn decode(&self, bytes: &[u8]) -> Result<SubscriptionError, Error>;
}

pub fn codec_for(encoding: Encoding) -> &'static dyn MessageCodec {
    match encoding {
        Encoding::Json => &JsonCodec,
        Encoding::Bsatn => &BsatnCodec,
    }
}

/// Decodes with the codec for `encoding` and logs any scope inconsistency.
pub fn decode(encoding: Encoding, bytes: &[u8]) -> Result<SubscriptionError, Error> {
    let value = codec_for(encoding).decode(bytes)?;
    if let Some(warning) = value.scope_warning() {
        tracing::warn!(
            %warning,
            encoding = encoding.as_ref(),
            "subscription error violates scope hierarchy"
        );
    }
    Ok(value)
}

pub fn encode(encoding: Encoding, value: &SubscriptionError) -> Result<Vec<u8>, Error> {
    codec_for(encoding).encode(value)
}
