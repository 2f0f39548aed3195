#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod codec;
pub mod error;
pub mod scope;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use codec::bsatn::BsatnCodec;
pub use codec::json::JsonCodec;
pub use codec::{Encoding, MessageCodec, codec_for, decode, encode};
pub use error::Error;
pub use scope::{ErrorScope, ScopeWarning};
pub use types::{SubscriptionError, WIRE_FIELDS};
