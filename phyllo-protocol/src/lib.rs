//! Camera Link Protocol
//!
//! This crate defines the UART-based protocol between the hub and the camera
//! board. The hub sends a one-byte trigger; the camera answers with a single
//! length-prefixed, CRC-checked frame carrying a JPEG payload.
//!
//! # Protocol Overview
//!
//! ```text
//! hub -> camera:  'C'
//! camera -> hub:  ┌───────┬────────┬─────┬──────────────┐
//!                 │ MAGIC │ LENGTH │ CRC │ PAYLOAD      │
//!                 │ 4B    │ 4B BE  │ 2B  │ LENGTH bytes │
//!                 └───────┴────────┴─────┴──────────────┘
//! ```
//!
//! `MAGIC` is `"PVIC"` for a capture frame or `"PVIE"` for a camera-reported
//! error; an error frame carries the length/CRC fields but no payload. The
//! CRC is CRC-16/MODBUS over the payload only. Anything on the line that is
//! not a magic sequence is treated as noise and skipped.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod crc;
pub mod frame;

pub use crc::{crc16, Crc16};
pub use frame::{
    encode_error_frame, encode_frame, FrameError, FrameHeader, FrameReader, MAGIC_ERROR,
    MAGIC_FRAME, MAX_PAYLOAD_LEN, MIN_PAYLOAD_LEN, TRAILER_LEN, TRIGGER_BYTE,
};
