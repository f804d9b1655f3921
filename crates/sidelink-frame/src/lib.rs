//! Length-prefixed string framing for cluster sideband messages.
//!
//! Every sideband frame is a sequence of UTF-8 strings, each written as a
//! 2-byte big-endian length followed by that many bytes. The first string is
//! a command tag ("Connect", "PlayerList"), the rest are tag-specific fields.
//! The format is wire-compatible with the routing proxy's existing protocol.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode_fields, encode_fields, MAX_FIELD_LEN};
pub use error::{FrameError, Result};
pub use message::{Message, PLAYER_SEPARATOR, TAG_CONNECT, TAG_PLAYER_LIST};
