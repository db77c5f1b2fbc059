//! Configuration type definitions
//!
//! Plain data with defaults matching the deployed hardware. The firmware
//! overrides fields at construction where a board differs; nothing here is
//! persisted.

use heapless::String;

use phyllo_protocol::TRIGGER_BYTE;

/// Camera link tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// Byte written to the camera to start a capture
    pub trigger: u8,
    /// Bound on magic scan plus the 6 trailer bytes, in milliseconds
    pub header_timeout_ms: u32,
    /// Body stall bound, in milliseconds; resets on every byte of progress
    pub body_stall_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            trigger: TRIGGER_BYTE,
            header_timeout_ms: 8_000,
            body_stall_ms: 12_000,
        }
    }
}

/// Button debounce tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonConfig {
    /// Level must hold this long before an edge is accepted
    pub settle_ms: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self { settle_ms: 40 }
    }
}

/// Indicator animation tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorConfig {
    /// Processing blink half-period
    pub blink_half_period_ms: u32,
    /// Green pulse after a successful upload
    pub upload_pulse_ms: u32,
    /// Green pulse when a result is displayed
    pub success_pulse_ms: u32,
    /// Buzzer pulse when a result is displayed
    pub buzzer_pulse_ms: u32,
    /// Red pulse after a failed cycle
    pub alert_pulse_ms: u32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            blink_half_period_ms: 250,
            upload_pulse_ms: 800,
            success_pulse_ms: 1_500,
            buzzer_pulse_ms: 5_000,
            alert_pulse_ms: 1_500,
        }
    }
}

/// Result polling cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollConfig {
    /// Interval between `GET /result` requests, in milliseconds
    pub interval_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

/// Inference server endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Host name or dotted address
    pub host: String<48>,
    pub port: u16,
    /// Path accepting `POST` image uploads
    pub upload_path: String<32>,
    /// Path serving `GET` analysis results
    pub result_path: String<32>,
    /// Bound on any single HTTP request
    pub request_timeout_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::try_from("192.168.0.181").unwrap(),
            port: 8000,
            upload_path: String::try_from("/upload").unwrap(),
            result_path: String::try_from("/result").unwrap(),
            request_timeout_ms: 10_000,
        }
    }
}
