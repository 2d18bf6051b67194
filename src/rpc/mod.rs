//! GWT-RPC wire support for the two portal calls.
//!
//! - `encoding`: the integer-to-text encoding used for `long` arguments
//! - `payload`: the pipe-delimited request bodies

pub mod encoding;
pub mod payload;

pub use encoding::encode_long;
pub use payload::{RpcPayload, generated_url_payload, login_payload};
