//! Hardware driver implementations for the leaf-health hub
//!
//! Implements the `phyllo-core` hardware traits over simple GPIO
//! abstractions. Board-specific pin types adapt to the small pin traits
//! defined here; everything is testable on the host with mock pins.

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod indicator;

pub use button::{GpioButton, InputPin};
pub use indicator::{GpioIndicator, OutputPin};
