//! Capture session
//!
//! Drives one trigger/receive cycle against the camera link. The caller
//! owns the transport: it flushes stale bytes, writes the trigger byte, and
//! feeds received bytes in as they arrive along with the current time. The
//! session enforces the two link timeouts and maps every frame-reader
//! failure to a terminal outcome.
//!
//! There is no retry here; retry is always a fresh trigger at the
//! orchestrator level.

use alloc::vec::Vec;

use phyllo_protocol::{FrameError, FrameReader};

use crate::config::LinkConfig;

/// Terminal result of one capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Checksum-verified payload received
    Success(Vec<u8>),
    /// No complete header within the header timeout
    HeaderTimeout,
    /// Payload transfer stalled longer than the stall bound
    BodyTimeout,
    /// Header carried an unknown magic sequence
    BadMagic,
    /// Declared payload length outside the configured bounds
    BadLength,
    /// Payload checksum did not match the declared value
    ChecksumMismatch,
    /// The camera reported a capture failure
    RemoteError,
}

impl CaptureOutcome {
    /// Check if this outcome carries a payload
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureOutcome::Success(_))
    }

    /// Short operator-facing description, rendered on failure screens
    pub fn message(&self) -> &'static str {
        match self {
            CaptureOutcome::Success(_) => "ok",
            CaptureOutcome::HeaderTimeout => "timeout header",
            CaptureOutcome::BodyTimeout => "timeout body",
            CaptureOutcome::BadMagic => "bad magic",
            CaptureOutcome::BadLength => "bad length",
            CaptureOutcome::ChecksumMismatch => "crc mismatch",
            CaptureOutcome::RemoteError => "camera error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Scanning for magic and collecting the 6 trailer bytes
    AwaitingHeader,
    /// Payload bytes arriving; deadline extends on activity
    ReceivingBody,
    /// Outcome delivered; session is spent
    Done,
}

/// One trigger/receive cycle
///
/// Created per trigger and discarded once an outcome is produced; never
/// reused. Time is injected as milliseconds so the session runs the same
/// under the firmware clock and under tests.
#[derive(Debug)]
pub struct CaptureSession {
    reader: FrameReader,
    phase: Phase,
    trigger: u8,
    started_at: u64,
    header_deadline: u64,
    stall_deadline: u64,
    body_stall_ms: u32,
}

impl CaptureSession {
    /// Arm a new session
    ///
    /// The caller must flush the transport and write [`trigger_byte`]
    /// before feeding received bytes.
    ///
    /// [`trigger_byte`]: CaptureSession::trigger_byte
    pub fn start(config: &LinkConfig, now_ms: u64) -> Self {
        Self {
            reader: FrameReader::new(),
            phase: Phase::AwaitingHeader,
            trigger: config.trigger,
            started_at: now_ms,
            header_deadline: now_ms + u64::from(config.header_timeout_ms),
            stall_deadline: 0,
            body_stall_ms: config.body_stall_ms,
        }
    }

    /// The byte to write to the camera to start this capture
    pub fn trigger_byte(&self) -> u8 {
        self.trigger
    }

    /// When the trigger was sent
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Check if the session has produced its outcome
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Feed bytes received from the transport
    ///
    /// Any byte arriving during the body phase pushes the stall deadline
    /// out, so the bound is on inactivity, not on total transfer time.
    /// Returns the terminal outcome when this chunk completes the session.
    pub fn feed(&mut self, bytes: &[u8], now_ms: u64) -> Option<CaptureOutcome> {
        if self.phase == Phase::Done || bytes.is_empty() {
            return None;
        }

        for &byte in bytes {
            match self.reader.feed_byte(byte) {
                Ok(Some(payload)) => return self.finish(CaptureOutcome::Success(payload)),
                Ok(None) => {}
                Err(e) => return self.finish(map_frame_error(e)),
            }
        }

        if self.reader.in_body() {
            // Progress observed; reset the stall deadline
            self.phase = Phase::ReceivingBody;
            self.stall_deadline = now_ms + u64::from(self.body_stall_ms);
        }
        None
    }

    /// Check the deadlines on a quiet tick
    pub fn poll(&mut self, now_ms: u64) -> Option<CaptureOutcome> {
        match self.phase {
            Phase::AwaitingHeader if now_ms >= self.header_deadline => {
                self.finish(CaptureOutcome::HeaderTimeout)
            }
            Phase::ReceivingBody if now_ms >= self.stall_deadline => {
                // Partial payload is discarded with the reader; no salvage
                self.finish(CaptureOutcome::BodyTimeout)
            }
            _ => None,
        }
    }

    fn finish(&mut self, outcome: CaptureOutcome) -> Option<CaptureOutcome> {
        self.phase = Phase::Done;
        self.reader.reset();
        Some(outcome)
    }
}

fn map_frame_error(e: FrameError) -> CaptureOutcome {
    match e {
        FrameError::BadMagic => CaptureOutcome::BadMagic,
        FrameError::BadLength(_) => CaptureOutcome::BadLength,
        FrameError::ChecksumMismatch { .. } => CaptureOutcome::ChecksumMismatch,
        FrameError::RemoteError => CaptureOutcome::RemoteError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phyllo_protocol::{encode_error_frame, encode_frame, FrameHeader, MAGIC_FRAME};

    fn test_config() -> LinkConfig {
        LinkConfig {
            header_timeout_ms: 1_000,
            body_stall_ms: 100,
            ..LinkConfig::default()
        }
    }

    fn frame(payload: &[u8]) -> alloc::vec::Vec<u8> {
        encode_frame(payload).unwrap()
    }

    #[test]
    fn test_clean_capture() {
        let payload = [0x42u8; 64];
        let mut session = CaptureSession::start(&test_config(), 0);
        assert_eq!(session.trigger_byte(), b'C');

        let outcome = session.feed(&frame(&payload), 10).unwrap();
        assert_eq!(outcome, CaptureOutcome::Success(payload.to_vec()));
        assert!(session.is_done());
    }

    #[test]
    fn test_header_timeout_on_silence() {
        let mut session = CaptureSession::start(&test_config(), 0);
        assert_eq!(session.poll(999), None);
        assert_eq!(session.poll(1_000), Some(CaptureOutcome::HeaderTimeout));
    }

    #[test]
    fn test_header_timeout_with_partial_magic() {
        let mut session = CaptureSession::start(&test_config(), 0);
        assert_eq!(session.feed(b"PV", 500), None);
        assert_eq!(session.poll(1_000), Some(CaptureOutcome::HeaderTimeout));
    }

    #[test]
    fn test_slow_but_steady_body_never_times_out() {
        let encoded = frame(&[0xA5u8; 50]);
        let mut session = CaptureSession::start(&test_config(), 0);

        // Header plus first body byte, then one byte every 90 ms; total
        // elapsed far exceeds the 100 ms stall bound.
        let mut now = 0u64;
        let mut outcome = session.feed(&encoded[..11], now);
        for &byte in &encoded[11..] {
            now += 90;
            assert_eq!(session.poll(now), None, "stalled at t={now}");
            outcome = session.feed(&[byte], now);
        }

        assert!(now > 100);
        assert_eq!(outcome, Some(CaptureOutcome::Success([0xA5u8; 50].to_vec())));
    }

    #[test]
    fn test_body_stall_times_out() {
        let encoded = frame(&[0x11u8; 50]);
        let mut session = CaptureSession::start(&test_config(), 0);

        // Header and half the body arrive promptly, then the link freezes
        session.feed(&encoded[..30], 10);
        assert_eq!(session.poll(109), None);
        assert_eq!(session.poll(110), Some(CaptureOutcome::BodyTimeout));
    }

    #[test]
    fn test_body_arrival_resets_stall_deadline() {
        let encoded = frame(&[0x22u8; 50]);
        let mut session = CaptureSession::start(&test_config(), 0);

        session.feed(&encoded[..30], 0);
        session.feed(&encoded[30..35], 95);
        // Old deadline (100) has passed, but activity at 95 moved it to 195
        assert_eq!(session.poll(150), None);
        assert_eq!(session.poll(195), Some(CaptureOutcome::BodyTimeout));
    }

    #[test]
    fn test_camera_error_frame() {
        let mut session = CaptureSession::start(&test_config(), 0);
        let outcome = session.feed(&encode_error_frame(), 5);
        assert_eq!(outcome, Some(CaptureOutcome::RemoteError));
    }

    #[test]
    fn test_bad_length_maps_without_body() {
        let mut stream = alloc::vec::Vec::new();
        stream.extend_from_slice(&MAGIC_FRAME);
        stream.extend_from_slice(&FrameHeader { len: 0, crc: 0 }.encode());

        let mut session = CaptureSession::start(&test_config(), 0);
        assert_eq!(session.feed(&stream, 5), Some(CaptureOutcome::BadLength));
    }

    #[test]
    fn test_checksum_mismatch_maps() {
        let mut encoded = frame(&[0x33u8; 20]);
        let last = encoded.len() - 1;
        encoded[last] ^= 0x80;

        let mut session = CaptureSession::start(&test_config(), 0);
        assert_eq!(
            session.feed(&encoded, 5),
            Some(CaptureOutcome::ChecksumMismatch)
        );
    }

    #[test]
    fn test_session_is_spent_after_outcome() {
        let mut session = CaptureSession::start(&test_config(), 0);
        session.poll(1_000).unwrap();

        assert_eq!(session.feed(&frame(&[1u8; 16]), 1_100), None);
        assert_eq!(session.poll(10_000), None);
    }

    #[test]
    fn test_leading_noise_tolerated() {
        let payload = [0x5Au8; 32];
        let mut stream = alloc::vec::Vec::from(&[0xFFu8, 0x00, 0x13, 0x37][..]);
        stream.extend_from_slice(&frame(&payload));

        let mut session = CaptureSession::start(&test_config(), 0);
        let outcome = session.feed(&stream, 10).unwrap();
        assert_eq!(outcome, CaptureOutcome::Success(payload.to_vec()));
    }
}
