//! Frame encoding and decoding for the camera link.
//!
//! Frame format:
//! - MAGIC (4 bytes): `"PVIC"` capture frame, `"PVIE"` camera error
//! - LENGTH (4 bytes): payload byte count, big-endian
//! - CRC (2 bytes): CRC-16/MODBUS of the payload, big-endian
//! - PAYLOAD (LENGTH bytes): JPEG data, absent on an error frame
//!
//! The byte stream has no other framing; the reader scans for a magic
//! sequence with a sliding window, so line noise before a frame is skipped
//! rather than reported.

use alloc::vec::Vec;

use crate::crc::{crc16, Crc16};

/// Magic sequence opening a capture frame
pub const MAGIC_FRAME: [u8; 4] = *b"PVIC";

/// Magic sequence opening a camera-reported error frame
pub const MAGIC_ERROR: [u8; 4] = *b"PVIE";

/// Trigger byte sent from hub to camera
pub const TRIGGER_BYTE: u8 = b'C';

/// Length + CRC fields following the magic
pub const TRAILER_LEN: usize = 6;

/// Smallest accepted payload; a zero length is a corrupted field
pub const MIN_PAYLOAD_LEN: u32 = 1;

/// Largest accepted payload. Bounds the frame buffer allocation against a
/// corrupted length field; the camera's JPEGs stay well under this.
pub const MAX_PAYLOAD_LEN: u32 = 400_000;

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Header bytes do not start with a known magic sequence
    BadMagic,
    /// Declared payload length outside the accepted bounds
    BadLength(u32),
    /// Payload checksum does not match the declared value
    ChecksumMismatch { expected: u16, actual: u16 },
    /// The camera reported a capture failure
    RemoteError,
}

/// Decoded length/CRC fields of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Payload byte count
    pub len: u32,
    /// Expected CRC-16 of the payload
    pub crc: u16,
}

impl FrameHeader {
    /// Parse the 6 trailer bytes following a magic sequence
    pub fn parse(trailer: &[u8; TRAILER_LEN]) -> Self {
        let len = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let crc = u16::from_be_bytes([trailer[4], trailer[5]]);
        Self { len, crc }
    }

    /// Check the declared length against the accepted bounds
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.len < MIN_PAYLOAD_LEN || self.len > MAX_PAYLOAD_LEN {
            return Err(FrameError::BadLength(self.len));
        }
        Ok(())
    }

    /// Encode the trailer bytes
    pub fn encode(&self) -> [u8; TRAILER_LEN] {
        let len = self.len.to_be_bytes();
        let crc = self.crc.to_be_bytes();
        [len[0], len[1], len[2], len[3], crc[0], crc[1]]
    }

    /// Strictly decode a full 10-byte header (magic + trailer)
    ///
    /// Used where the header is read as one block rather than scanned out of
    /// a stream. An unknown magic is `BadMagic`; the error magic is
    /// `RemoteError`.
    pub fn decode(header: &[u8; 4 + TRAILER_LEN]) -> Result<Self, FrameError> {
        let magic: [u8; 4] = [header[0], header[1], header[2], header[3]];
        if magic == MAGIC_ERROR {
            return Err(FrameError::RemoteError);
        }
        if magic != MAGIC_FRAME {
            return Err(FrameError::BadMagic);
        }

        let trailer: [u8; TRAILER_LEN] = [
            header[4], header[5], header[6], header[7], header[8], header[9],
        ];
        let parsed = Self::parse(&trailer);
        parsed.validate()?;
        Ok(parsed)
    }
}

/// Encode a complete capture frame around a payload
///
/// The camera side of the wire; used by tests and the capture simulator.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = payload.len() as u32;
    let header = FrameHeader {
        len,
        crc: crc16(payload),
    };
    header.validate()?;

    let mut out = Vec::with_capacity(4 + TRAILER_LEN + payload.len());
    out.extend_from_slice(&MAGIC_FRAME);
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Encode a camera error frame (trailer fields present, payload absent)
pub fn encode_error_frame() -> [u8; 4 + TRAILER_LEN] {
    let header = FrameHeader {
        len: 0,
        crc: crc16(&[]),
    };
    let trailer = header.encode();
    let mut out = [0u8; 4 + TRAILER_LEN];
    out[..4].copy_from_slice(&MAGIC_ERROR);
    out[4..].copy_from_slice(&trailer);
    out
}

/// State machine for extracting frames from a byte stream
///
/// Push parser: feed bytes as they arrive off the wire. Bytes that do not
/// extend a magic match slide a 4-byte window, so leading noise needs no
/// resynchronization beyond the window itself. The payload checksum is
/// carried incrementally across every chunk boundary.
#[derive(Debug)]
pub struct FrameReader {
    state: ReadState,
}

#[derive(Debug)]
enum ReadState {
    /// Sliding-window scan for a magic sequence
    SeekMagic { window: [u8; 4], filled: u8 },
    /// Magic found; collecting the 6 trailer bytes
    Trailer {
        error_frame: bool,
        buf: heapless::Vec<u8, TRAILER_LEN>,
    },
    /// Collecting the payload
    Body {
        header: FrameHeader,
        payload: Vec<u8>,
        crc: Crc16,
    },
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Create a new frame reader
    pub fn new() -> Self {
        Self {
            state: ReadState::SeekMagic {
                window: [0; 4],
                filled: 0,
            },
        }
    }

    /// Reset to scanning for a magic sequence, discarding partial state
    pub fn reset(&mut self) {
        self.state = ReadState::SeekMagic {
            window: [0; 4],
            filled: 0,
        };
    }

    /// Whether the reader is currently receiving a payload
    ///
    /// The capture session uses this to switch from the header timeout to
    /// the body stall timeout.
    pub fn in_body(&self) -> bool {
        matches!(self.state, ReadState::Body { .. })
    }

    /// Payload bytes received so far (0 outside the body phase)
    pub fn body_received(&self) -> usize {
        match &self.state {
            ReadState::Body { payload, .. } => payload.len(),
            _ => 0,
        }
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(payload))` when a complete checksum-verified frame
    /// ends on this byte, `Ok(None)` when more bytes are needed, or `Err` on
    /// a terminal decode failure. After either a frame or an error the
    /// reader is reset and ready for the next magic sequence.
    pub fn feed_byte(&mut self, byte: u8) -> Result<Option<Vec<u8>>, FrameError> {
        match &mut self.state {
            ReadState::SeekMagic { window, filled } => {
                if (*filled as usize) < window.len() {
                    window[*filled as usize] = byte;
                    *filled += 1;
                } else {
                    window.rotate_left(1);
                    window[3] = byte;
                }

                if *filled == 4 {
                    if *window == MAGIC_FRAME {
                        self.state = ReadState::Trailer {
                            error_frame: false,
                            buf: heapless::Vec::new(),
                        };
                    } else if *window == MAGIC_ERROR {
                        self.state = ReadState::Trailer {
                            error_frame: true,
                            buf: heapless::Vec::new(),
                        };
                    }
                    // Anything else keeps sliding; noise is not an error
                }
                Ok(None)
            }
            ReadState::Trailer { error_frame, buf } => {
                // Capacity equals TRAILER_LEN, so this push cannot fail
                let _ = buf.push(byte);
                if buf.len() < TRAILER_LEN {
                    return Ok(None);
                }

                if *error_frame {
                    // Trailer consumed for protocol symmetry; no payload follows
                    self.reset();
                    return Err(FrameError::RemoteError);
                }

                let mut trailer = [0u8; TRAILER_LEN];
                trailer.copy_from_slice(buf);
                let header = FrameHeader::parse(&trailer);
                if let Err(e) = header.validate() {
                    // Reject before allocating a payload buffer
                    self.reset();
                    return Err(e);
                }

                self.state = ReadState::Body {
                    payload: Vec::with_capacity(header.len as usize),
                    crc: Crc16::new(),
                    header,
                };
                Ok(None)
            }
            ReadState::Body {
                header,
                payload,
                crc,
            } => {
                payload.push(byte);
                crc.update(&[byte]);
                if payload.len() < header.len as usize {
                    return Ok(None);
                }

                let actual = crc.finish();
                let expected = header.crc;
                let complete = core::mem::take(payload);
                self.reset();

                if actual != expected {
                    return Err(FrameError::ChecksumMismatch { expected, actual });
                }
                Ok(Some(complete))
            }
        }
    }

    /// Feed a chunk of bytes, returning the first complete frame found
    ///
    /// Bytes after a complete frame are not consumed; the camera sends one
    /// frame per trigger, so in practice there are none.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Option<Vec<u8>>, FrameError> {
        for &byte in bytes {
            if let Some(payload) = self.feed_byte(byte)? {
                return Ok(Some(payload));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn payload(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_roundtrip() {
        let body = payload(64);
        let encoded = encode_frame(&body).unwrap();

        let mut reader = FrameReader::new();
        let parsed = reader.feed(&encoded).unwrap().unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_minimal_frame() {
        // PVIC | 0x00000003 | crc | 01 02 03
        let body = [0x01, 0x02, 0x03];
        let encoded = encode_frame(&body).unwrap();

        let mut reader = FrameReader::new();
        let parsed = reader.feed(&encoded).unwrap().unwrap();
        assert_eq!(parsed, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_resync_after_noise() {
        let body = payload(32);
        let mut stream = vec![0x00, 0xFF, b'P', b'V', 0x12, 0x34];
        stream.extend_from_slice(&encode_frame(&body).unwrap());

        let mut reader = FrameReader::new();
        let parsed = reader.feed(&stream).unwrap().unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_zero_length_rejected() {
        let header = FrameHeader { len: 0, crc: 0 };
        let mut stream = Vec::new();
        stream.extend_from_slice(&MAGIC_FRAME);
        stream.extend_from_slice(&header.encode());

        let mut reader = FrameReader::new();
        assert_eq!(reader.feed(&stream), Err(FrameError::BadLength(0)));
    }

    #[test]
    fn test_oversize_length_rejected_before_payload() {
        let header = FrameHeader {
            len: MAX_PAYLOAD_LEN + 1,
            crc: 0,
        };
        let mut stream = Vec::new();
        stream.extend_from_slice(&MAGIC_FRAME);
        stream.extend_from_slice(&header.encode());

        let mut reader = FrameReader::new();
        // The error surfaces on the last trailer byte, with no payload read
        assert_eq!(
            reader.feed(&stream),
            Err(FrameError::BadLength(MAX_PAYLOAD_LEN + 1))
        );
        assert!(!reader.in_body());
    }

    #[test]
    fn test_checksum_mismatch_on_bit_flip() {
        let body = payload(48);
        let mut encoded = encode_frame(&body).unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0x01;

        let mut reader = FrameReader::new();
        match reader.feed(&encoded) {
            Err(FrameError::ChecksumMismatch { expected, actual }) => {
                assert_ne!(expected, actual);
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_error_frame_consumes_trailer() {
        let stream = encode_error_frame();

        let mut reader = FrameReader::new();
        assert_eq!(reader.feed(&stream), Err(FrameError::RemoteError));

        // The trailer was consumed; a following frame parses cleanly
        let body = payload(16);
        let encoded = encode_frame(&body).unwrap();
        let parsed = reader.feed(&encoded).unwrap().unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_reader_reusable_after_frame() {
        let first = payload(20);
        let second = payload(33);

        let mut reader = FrameReader::new();
        assert_eq!(
            reader.feed(&encode_frame(&first).unwrap()).unwrap(),
            Some(first)
        );
        assert_eq!(
            reader.feed(&encode_frame(&second).unwrap()).unwrap(),
            Some(second)
        );
    }

    #[test]
    fn test_byte_at_a_time_parse() {
        let body = payload(100);
        let encoded = encode_frame(&body).unwrap();

        let mut reader = FrameReader::new();
        for (i, &b) in encoded.iter().enumerate() {
            match reader.feed_byte(b).unwrap() {
                Some(parsed) => {
                    assert_eq!(i, encoded.len() - 1);
                    assert_eq!(parsed, body);
                    return;
                }
                None => continue,
            }
        }
        panic!("frame never completed");
    }

    #[test]
    fn test_strict_header_decode() {
        let mut header = [0u8; 10];
        header[..4].copy_from_slice(&MAGIC_FRAME);
        header[4..].copy_from_slice(&FrameHeader { len: 128, crc: 0xBEEF }.encode());

        let decoded = FrameHeader::decode(&header).unwrap();
        assert_eq!(decoded.len, 128);
        assert_eq!(decoded.crc, 0xBEEF);

        header[..4].copy_from_slice(b"XXXX");
        assert_eq!(FrameHeader::decode(&header), Err(FrameError::BadMagic));

        header[..4].copy_from_slice(&MAGIC_ERROR);
        assert_eq!(FrameHeader::decode(&header), Err(FrameError::RemoteError));
    }

    proptest::proptest! {
        #[test]
        fn prop_roundtrip_any_chunking(
            body in proptest::collection::vec(0u8..=255, 1..600),
            chunk in 1usize..64,
        ) {
            let encoded = encode_frame(&body).unwrap();
            let mut reader = FrameReader::new();

            let mut result = None;
            for piece in encoded.chunks(chunk) {
                if let Some(parsed) = reader.feed(piece).unwrap() {
                    result = Some(parsed);
                }
            }
            proptest::prop_assert_eq!(result, Some(body));
        }
    }
}
