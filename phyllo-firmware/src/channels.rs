//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.
//!
//! The `Controller` itself lives behind one mutex; tasks lock it briefly
//! and never across an await point, so all device state stays serialized
//! through a single owner.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use phyllo_core::capture::CaptureOutcome;
use phyllo_core::controller::{Controller, UploadResponse};
use phyllo_core::indicators::IndicatorFrame;
use phyllo_core::result::AnalysisResult;
use phyllo_core::screen::StatusScreen;
use phyllo_core::state::TriggerSource;

/// Shared handle to the device orchestrator
pub type SharedController = &'static Mutex<CriticalSectionRawMutex, Controller>;

/// Channel capacity for triggers; extras are coalesced by mode rejection
const TRIGGER_CHANNEL_SIZE: usize = 4;

/// Channel capacity for polled results
const RESULT_CHANNEL_SIZE: usize = 2;

/// Capture triggers from the button and the HTTP server
pub static TRIGGER_CHANNEL: Channel<CriticalSectionRawMutex, TriggerSource, TRIGGER_CHANNEL_SIZE> =
    Channel::new();

/// Controller tells the camera task to run a capture session
pub static CAPTURE_START: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Terminal session outcome from the camera task
pub static OUTCOME_CHANNEL: Channel<CriticalSectionRawMutex, CaptureOutcome, 1> = Channel::new();

/// Controller tells the upload task to POST the retained image
pub static UPLOAD_START: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Upload collaborator's response
pub static UPLOAD_RESPONSE: Channel<CriticalSectionRawMutex, UploadResponse, 1> = Channel::new();

/// Analysis results from the poll task
pub static RESULT_CHANNEL: Channel<CriticalSectionRawMutex, AnalysisResult, RESULT_CHANNEL_SIZE> =
    Channel::new();

/// Screen contents for the display task (latest wins)
pub static SCREEN_UPDATE: Signal<CriticalSectionRawMutex, StatusScreen> = Signal::new();

/// Indicator levels for the LED/buzzer task (latest wins)
pub static INDICATOR_FRAME: Signal<CriticalSectionRawMutex, IndicatorFrame> = Signal::new();
