//! PTL controller wire constants.
//!
//! The stub never parses what the client sends. Every non-empty read is
//! answered with the same acknowledgement frame:
//!
//! ```text
//! STX  "000002"  "OK"  CR LF  ETX
//! 02   303030303032  4f4b  0d0a  03
//! ```
//!
//! The six-byte field is emitted verbatim; it is not derived from the
//! payload length.

use bytes::Bytes;
use std::fmt::Write;

/// Start-of-text marker.
pub const STX: u8 = 0x02;

/// End-of-text marker.
pub const ETX: u8 = 0x03;

/// Address the controller listens on.
pub const LISTEN_ADDR: &str = "127.0.0.1:5000";

/// Maximum bytes consumed by a single read.
pub const READ_SIZE: usize = 4096;

/// Pending-connection queue length for the listening socket.
pub const BACKLOG: i32 = 1;

/// The fixed acknowledgement frame.
pub const ACK_FRAME: [u8; 12] = [
    STX, b'0', b'0', b'0', b'0', b'0', b'2', b'O', b'K', b'\r', b'\n', ETX,
];

/// Build the acknowledgement sent in reply to one inbound message.
pub fn ack_frame() -> Bytes {
    Bytes::from_static(&ACK_FRAME)
}

/// Render bytes as lowercase hex with no separators.
pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Text enclosed by STX/ETX, if the read is a single UTF-8 frame.
///
/// Only used for logging; anything else is answered just the same.
pub fn frame_text(data: &[u8]) -> Option<&str> {
    match data {
        [STX, inner @ .., ETX] => std::str::from_utf8(inner).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr_fixed() {
        assert_eq!(LISTEN_ADDR, "127.0.0.1:5000");
        let addr: std::net::SocketAddr = LISTEN_ADDR.parse().unwrap();
        assert!(addr.is_ipv4());
    }

    #[test]
    fn test_ack_frame_bytes() {
        assert_eq!(ACK_FRAME.len(), 12);
        assert_eq!(&ACK_FRAME[..], b"\x02000002OK\r\n\x03");
        assert_eq!(
            ACK_FRAME,
            [0x02, 0x30, 0x30, 0x30, 0x30, 0x30, 0x32, 0x4F, 0x4B, 0x0D, 0x0A, 0x03]
        );
    }

    #[test]
    fn test_ack_frame_is_fresh_and_identical() {
        let first = ack_frame();
        let second = ack_frame();
        assert_eq!(first, second);
        assert_eq!(&first[..], &ACK_FRAME[..]);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(b"\x02TEST\x03"), "025445535403");
        assert_eq!(to_hex(&ACK_FRAME), "023030303030324f4b0d0a03");
        assert_eq!(to_hex(&[0x00, 0xff, 0xab]), "00ffab");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_frame_text() {
        assert_eq!(frame_text(b"\x02TEST\x03"), Some("TEST"));
        assert_eq!(
            frame_text(b"\x02PP50500m1m1111:0001: 3/10\x03"),
            Some("PP50500m1m1111:0001: 3/10")
        );
        assert_eq!(frame_text(b"\x02\x03"), Some(""));
    }

    #[test]
    fn test_frame_text_unframed() {
        assert_eq!(frame_text(b"TEST"), None);
        assert_eq!(frame_text(b"\x02TEST"), None);
        assert_eq!(frame_text(b"TEST\x03"), None);
        assert_eq!(frame_text(b"\x02"), None);
        assert_eq!(frame_text(b""), None);
        assert_eq!(frame_text(b"\x02\xff\xfe\x03"), None);
    }
}
