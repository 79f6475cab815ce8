//! Packet codec for the length-prefixed wire format.
//!
//! A packet on the wire is `len3 || id13 || payload`: a 3-byte big-endian
//! payload length, a 13-byte identifier right-padded with spaces, and a
//! UTF-8 payload of the declared length. The header is always exactly
//! 16 bytes. This module is pure byte arithmetic; reassembly of partial
//! reads happens in the connection layer.

use crate::error::WireError;

/// Bytes in the big-endian payload length prefix.
pub const LEN_FIELD: usize = 3;

/// Bytes in the space-padded identifier field.
pub const ID_LEN: usize = 13;

/// Bytes in the full packet header (length prefix plus identifier).
pub const HEADER_LEN: usize = LEN_FIELD + ID_LEN;

/// Application ceiling on payload size: 1 MiB minus the header.
pub const MAX_PAYLOAD: usize = 1024 * 1024 - HEADER_LEN;

/// One decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Identifier with trailing padding stripped.
    pub id: String,
    /// UTF-8 payload text.
    pub payload: String,
}

/// Encode a payload and identifier into wire bytes.
///
/// Fails with [`WireError::MessageTooLarge`] when the payload exceeds
/// [`MAX_PAYLOAD`] and with [`WireError::IdTooLong`] when the identifier
/// does not fit its 13-byte field. Shorter identifiers are padded on the
/// right with spaces.
pub fn encode(payload: &[u8], id: &str) -> Result<Vec<u8>, WireError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(WireError::MessageTooLarge(payload.len()));
    }
    if id.len() > ID_LEN {
        return Err(WireError::IdTooLong(id.len()));
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    // The length fits 24 bits (MAX_PAYLOAD < 2^24), so the three low-order
    // big-endian bytes carry it exactly.
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
    buf.extend_from_slice(id.as_bytes());
    buf.resize(HEADER_LEN, b' ');
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Decode a fully reassembled packet buffer.
///
/// The caller is responsible for reassembly: `buf` must hold the complete
/// 16-byte header plus the payload the header declares. Truncated buffers
/// are rejected, and malformed UTF-8 in either field propagates as
/// [`WireError::InvalidUtf8`].
pub fn decode(buf: &[u8]) -> Result<Packet, WireError> {
    if buf.len() < HEADER_LEN {
        return Err(WireError::TruncatedHeader(buf.len()));
    }
    let declared = decode_length([0, buf[0], buf[1], buf[2]]) as usize;
    let got = buf.len() - HEADER_LEN;
    if got < declared {
        return Err(WireError::TruncatedPayload { declared, got });
    }

    let id = std::str::from_utf8(&buf[LEN_FIELD..HEADER_LEN])?
        .trim_end()
        .to_string();
    let payload = std::str::from_utf8(&buf[HEADER_LEN..HEADER_LEN + declared])?.to_string();
    Ok(Packet { id, payload })
}

/// Decode the payload length from its 3-byte field, widened with a leading
/// zero byte so the standard 4-byte big-endian integer decode applies.
pub fn decode_length(bytes_with_leading_zero: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes_with_leading_zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let wire = encode(b"hello", "user1").unwrap();
        let packet = decode(&wire).unwrap();
        assert_eq!(packet.id, "user1");
        assert_eq!(packet.payload, "hello");
    }

    #[test]
    fn test_wire_layout() {
        // 3-byte length, 13-byte padded id, then the payload.
        let wire = encode(b"hello", "user1").unwrap();
        assert_eq!(&wire[..LEN_FIELD], &[0x00, 0x00, 0x05]);
        assert_eq!(&wire[LEN_FIELD..HEADER_LEN], b"user1        ");
        assert_eq!(&wire[HEADER_LEN..], b"hello");
        assert_eq!(wire.len(), HEADER_LEN + 5);
    }

    #[test]
    fn test_round_trip_empty_payload() {
        let wire = encode(b"", "a").unwrap();
        assert_eq!(wire.len(), HEADER_LEN);
        let packet = decode(&wire).unwrap();
        assert_eq!(packet.id, "a");
        assert_eq!(packet.payload, "");
    }

    #[test]
    fn test_round_trip_empty_id() {
        let wire = encode(b"x", "").unwrap();
        let packet = decode(&wire).unwrap();
        assert_eq!(packet.id, "");
        assert_eq!(packet.payload, "x");
    }

    #[test]
    fn test_id_at_field_width_is_not_padded() {
        let id = "exactly13byte";
        assert_eq!(id.len(), ID_LEN);
        let wire = encode(b"p", id).unwrap();
        assert_eq!(&wire[LEN_FIELD..HEADER_LEN], id.as_bytes());
        assert_eq!(decode(&wire).unwrap().id, id);
    }

    #[test]
    fn test_oversized_id_rejected() {
        let err = encode(b"p", "fourteen-bytes").unwrap_err();
        assert_eq!(err, WireError::IdTooLong(14));
    }

    #[test]
    fn test_payload_at_ceiling() {
        let payload = vec![b'x'; MAX_PAYLOAD];
        let wire = encode(&payload, "big").unwrap();
        assert_eq!(wire.len(), 1024 * 1024);
        assert_eq!(decode(&wire).unwrap().payload.len(), MAX_PAYLOAD);
    }

    #[test]
    fn test_payload_over_ceiling_rejected() {
        let payload = vec![b'x'; MAX_PAYLOAD + 1];
        let err = encode(&payload, "big").unwrap_err();
        assert_eq!(err, WireError::MessageTooLarge(MAX_PAYLOAD + 1));
    }

    #[test]
    fn test_decode_truncated_header() {
        let err = decode(&[0x00, 0x00, 0x05, b'u']).unwrap_err();
        assert_eq!(err, WireError::TruncatedHeader(4));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let mut wire = encode(b"hello", "user1").unwrap();
        wire.truncate(HEADER_LEN + 3);
        let err = decode(&wire).unwrap_err();
        assert_eq!(
            err,
            WireError::TruncatedPayload {
                declared: 5,
                got: 3
            }
        );
    }

    #[test]
    fn test_decode_rejects_malformed_utf8() {
        let mut wire = encode(b"hello", "user1").unwrap();
        wire[HEADER_LEN] = 0xFF;
        assert!(matches!(
            decode(&wire).unwrap_err(),
            WireError::InvalidUtf8(_)
        ));
    }

    #[test]
    fn test_decode_length() {
        assert_eq!(decode_length([0, 0x00, 0x00, 0x05]), 5);
        assert_eq!(decode_length([0, 0x01, 0x00, 0x00]), 65536);
        assert_eq!(decode_length([0, 0xFF, 0xFF, 0xFF]), (1 << 24) - 1);
    }
}
