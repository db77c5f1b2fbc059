//! Board-agnostic core logic for the leaf-health hub firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (status display, indicator outputs)
//! - Device state machine (idle / capturing / uploading / waiting / displaying)
//! - Capture session with header and body-stall timeouts
//! - Result correlator for asynchronous analysis results
//! - Indicator animation (LED blink and pulse patterns)
//! - Button debouncing
//! - Configuration type definitions
//!
//! Nothing here reads a clock or touches a peripheral; time enters as a
//! millisecond timestamp and bytes enter as slices, so every module is
//! host-testable.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod button;
pub mod capture;
pub mod config;
pub mod controller;
pub mod indicators;
pub mod result;
pub mod screen;
pub mod state;
pub mod traits;
