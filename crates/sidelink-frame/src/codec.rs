use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Maximum encoded length of a single string, bounded by the 2-byte prefix.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// Encode a sequence of strings into the wire format.
///
/// Wire format, per string:
/// ```text
/// ┌──────────────┬──────────────────┐
/// │ Length (2B BE)│ UTF-8 bytes      │
/// └──────────────┴──────────────────┘
/// ```
/// Strings are written in argument order; the caller puts the command tag
/// first. No escaping is applied beyond the length prefix.
pub fn encode_fields<S: AsRef<str>>(fields: &[S], dst: &mut BytesMut) -> Result<()> {
    for field in fields {
        let bytes = field.as_ref().as_bytes();
        if bytes.len() > MAX_FIELD_LEN {
            return Err(FrameError::FieldTooLong {
                len: bytes.len(),
                max: MAX_FIELD_LEN,
            });
        }
        dst.reserve(2 + bytes.len());
        dst.put_u16(bytes.len() as u16);
        dst.put_slice(bytes);
    }
    Ok(())
}

/// Decode a buffer into its string sequence.
///
/// Reads length-prefixed strings until the buffer is exhausted. Fails with
/// `Truncated` if the buffer ends mid-string (inside a length prefix or
/// inside a string body) and `InvalidUtf8` on malformed bytes.
pub fn decode_fields(src: &[u8]) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut offset = 0;

    while offset < src.len() {
        if src.len() - offset < 2 {
            return Err(FrameError::Truncated { offset });
        }
        let len = u16::from_be_bytes([src[offset], src[offset + 1]]) as usize;
        offset += 2;

        if src.len() - offset < len {
            return Err(FrameError::Truncated { offset });
        }
        let field = String::from_utf8(src[offset..offset + len].to_vec())?;
        offset += len;
        fields.push(field);
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(fields: &[&str]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_fields(fields, &mut buf).unwrap();
        buf
    }

    #[test]
    fn encode_decode_roundtrip() {
        let buf = encode(&["PlayerList", "arena", "Alice, Bob"]);
        let fields = decode_fields(&buf).unwrap();
        assert_eq!(fields, vec!["PlayerList", "arena", "Alice, Bob"]);
    }

    #[test]
    fn empty_buffer_decodes_to_no_fields() {
        assert!(decode_fields(&[]).unwrap().is_empty());
    }

    #[test]
    fn unicode_fields_survive() {
        let buf = encode(&["Connect", "ロビー", "café"]);
        let fields = decode_fields(&buf).unwrap();
        assert_eq!(fields, vec!["Connect", "ロビー", "café"]);
    }

    #[test]
    fn empty_string_field() {
        let buf = encode(&["PlayerList", ""]);
        let fields = decode_fields(&buf).unwrap();
        assert_eq!(fields, vec!["PlayerList", ""]);
    }

    #[test]
    fn truncated_mid_prefix() {
        let mut buf = encode(&["Connect"]);
        buf.extend_from_slice(&[0x00]); // lone half of a length prefix
        assert!(matches!(
            decode_fields(&buf),
            Err(FrameError::Truncated { .. })
        ));
    }

    #[test]
    fn truncated_mid_string() {
        let buf = encode(&["Connect", "lobby"]);
        let cut = &buf[..buf.len() - 2];
        assert!(matches!(
            decode_fields(cut),
            Err(FrameError::Truncated { .. })
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u16(2);
        buf.put_slice(&[0xFF, 0xFE]);
        assert!(matches!(
            decode_fields(&buf),
            Err(FrameError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn oversized_field_rejected() {
        let big = "x".repeat(MAX_FIELD_LEN + 1);
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_fields(&[big.as_str()], &mut buf),
            Err(FrameError::FieldTooLong { .. })
        ));
    }

    #[test]
    fn field_at_exact_cap_roundtrips() {
        let max = "y".repeat(MAX_FIELD_LEN);
        let mut buf = BytesMut::new();
        encode_fields(&[max.as_str()], &mut buf).unwrap();
        let fields = decode_fields(&buf).unwrap();
        assert_eq!(fields[0].len(), MAX_FIELD_LEN);
    }
}
