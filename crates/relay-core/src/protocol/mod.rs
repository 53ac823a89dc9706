//! Protocol module containing message types and the JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{encode_server_message, parse_message, ProtocolError};
pub use messages::*;
