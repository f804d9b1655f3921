use bytes::{Bytes, BytesMut};

use crate::codec::{decode_fields, encode_fields};
use crate::error::{FrameError, Result};

/// Tag of an outbound relocate frame.
pub const TAG_CONNECT: &str = "Connect";
/// Tag of roster query and roster response frames.
pub const TAG_PLAYER_LIST: &str = "PlayerList";

/// Separator used to pack a roster into a single string field.
///
/// Pre-existing proxy format; player names must not contain it.
pub const PLAYER_SEPARATOR: &str = ", ";

/// A typed sideband message.
///
/// `PlayerList` frames are disambiguated by arity: one field after the tag is
/// a query, two fields is a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Ask the proxy to move the carrying session to another server.
    Relocate { destination: String },
    /// Ask the proxy for the roster of a server.
    RosterQuery { server: String },
    /// The proxy's answer to a roster query.
    RosterResponse {
        server: String,
        players: Vec<String>,
    },
}

impl Message {
    /// Encode into wire bytes.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        match self {
            Message::Relocate { destination } => {
                encode_fields(&[TAG_CONNECT, destination], &mut buf)?;
            }
            Message::RosterQuery { server } => {
                encode_fields(&[TAG_PLAYER_LIST, server], &mut buf)?;
            }
            Message::RosterResponse { server, players } => {
                if let Some(name) = players.iter().find(|p| p.contains(PLAYER_SEPARATOR)) {
                    return Err(FrameError::ReservedSeparator { name: name.clone() });
                }
                let packed = players.join(PLAYER_SEPARATOR);
                encode_fields(&[TAG_PLAYER_LIST, server, &packed], &mut buf)?;
            }
        }
        Ok(buf.freeze())
    }

    /// Decode wire bytes into a typed message.
    ///
    /// Returns `Ok(None)` for an unrecognized tag — receivers ignore foreign
    /// traffic on the shared channel. A recognized tag with the wrong field
    /// count fails with `Arity`.
    pub fn decode(payload: &[u8]) -> Result<Option<Message>> {
        let mut fields = decode_fields(payload)?.into_iter();
        let tag = fields.next().ok_or(FrameError::EmptyFrame)?;
        let rest: Vec<String> = fields.collect();

        match tag.as_str() {
            TAG_CONNECT => match rest.len() {
                1 => {
                    let mut rest = rest.into_iter();
                    Ok(Some(Message::Relocate {
                        destination: rest.next().ok_or(FrameError::EmptyFrame)?,
                    }))
                }
                actual => Err(arity(tag, 1, actual)),
            },
            TAG_PLAYER_LIST => match rest.len() {
                1 => {
                    let mut rest = rest.into_iter();
                    Ok(Some(Message::RosterQuery {
                        server: rest.next().ok_or(FrameError::EmptyFrame)?,
                    }))
                }
                2 => {
                    let mut rest = rest.into_iter();
                    let server = rest.next().ok_or(FrameError::EmptyFrame)?;
                    let packed = rest.next().ok_or(FrameError::EmptyFrame)?;
                    Ok(Some(Message::RosterResponse {
                        server,
                        players: unpack_players(&packed),
                    }))
                }
                actual => Err(arity(tag, 2, actual)),
            },
            _ => Ok(None),
        }
    }
}

fn arity(tag: String, expected: usize, actual: usize) -> FrameError {
    FrameError::Arity {
        tag,
        expected,
        actual,
    }
}

fn unpack_players(packed: &str) -> Vec<String> {
    if packed.is_empty() {
        return Vec::new();
    }
    packed.split(PLAYER_SEPARATOR).map(str::to_owned).collect()
}
