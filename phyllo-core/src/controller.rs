//! Device orchestrator
//!
//! Owns the single device state: current mode, result correlator, indicator
//! animator, status screen, and the most recent image. Every external
//! stimulus (button edge, capture request, session outcome, upload
//! response, polled result, timer tick) enters through one of the handlers
//! here; the firmware glue executes the returned [`Action`]s against the
//! real transports.
//!
//! Concurrent triggers are serialized by the mode field alone: a trigger is
//! rejected while a cycle is in flight, except from `Waiting`, where it
//! supersedes the pending result.

use alloc::vec::Vec;
use core::fmt::Write as _;

use heapless::String;

use crate::capture::CaptureOutcome;
use crate::config::IndicatorConfig;
use crate::indicators::{IndicatorAnimator, IndicatorFrame};
use crate::result::{AnalysisResult, Correlator, DisplayDecision, Token};
use crate::screen::{StatusScreen, LINE_LEN};
use crate::state::{Event, Mode, TriggerSource};

/// Work the firmware must carry out for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Flush the camera link, send the trigger, run a capture session
    StartCapture,
    /// POST the retained image to the inference server
    Upload,
}

/// What came back from the upload collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResponse {
    /// Server answered with a usable analysis result
    Result(AnalysisResult),
    /// Server accepted the image; result arrives asynchronously
    Accepted { token: Option<Token> },
    /// Request failed (transport down, non-200 status, ...)
    Failed { reason: String<32> },
}

/// Top-level device state machine
pub struct Controller {
    mode: Mode,
    correlator: Correlator,
    animator: IndicatorAnimator,
    screen: StatusScreen,
    screen_dirty: bool,
    last_image: Option<Vec<u8>>,
}

impl Controller {
    pub fn new(indicators: IndicatorConfig) -> Self {
        Self {
            mode: Mode::Idle,
            correlator: Correlator::new(),
            animator: IndicatorAnimator::new(indicators),
            screen: StatusScreen::from_lines(&["Booting..."]),
            screen_dirty: true,
            last_image: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn screen(&self) -> &StatusScreen {
        &self.screen
    }

    /// Most recent successfully captured image, for the `/image.jpg` route
    pub fn last_image(&self) -> Option<&[u8]> {
        self.last_image.as_deref()
    }

    /// Take the screen contents if they changed since the last call
    ///
    /// The display task drains this once per loop pass.
    pub fn take_screen_update(&mut self) -> Option<StatusScreen> {
        if self.screen_dirty {
            self.screen_dirty = false;
            Some(self.screen.clone())
        } else {
            None
        }
    }

    /// Show a status message outside the capture cycle (boot, Wi-Fi state)
    pub fn set_status(&mut self, lines: &[&str]) {
        self.show(lines);
    }

    /// Handle a capture trigger from the button or an HTTP request
    ///
    /// Returns `StartCapture` when accepted; `None` when rejected because a
    /// cycle is already in flight.
    pub fn on_trigger(&mut self, source: TriggerSource, now_ms: u64) -> Option<Action> {
        if !self.mode.accepts_trigger() {
            return None;
        }

        if self.mode == Mode::Waiting {
            // Supersede: a late result for the old capture must not show
            self.correlator.supersede();
        }

        self.mode = self.mode.transition(Event::Trigger);
        self.animator.set_processing(now_ms);
        match source {
            TriggerSource::Button => self.show(&["Button pressed", "Capturing..."]),
            TriggerSource::Request => self.show(&["Capturing...", "Please wait"]),
        }
        Some(Action::StartCapture)
    }

    /// Handle the terminal outcome of the capture session
    pub fn on_capture_outcome(&mut self, outcome: CaptureOutcome, now_ms: u64) -> Option<Action> {
        if self.mode != Mode::Capturing {
            // Stale outcome from a session the mode no longer tracks
            return None;
        }

        match outcome {
            CaptureOutcome::Success(payload) => {
                let mut size_line: String<24> = String::new();
                let _ = write!(size_line, "{} bytes", payload.len());
                self.last_image = Some(payload);
                self.mode = self.mode.transition(Event::CaptureSucceeded);
                self.show(&["Uploading...", &size_line]);
                Some(Action::Upload)
            }
            failure => {
                self.mode = self.mode.transition(Event::CaptureFailed);
                self.animator.alert(now_ms);
                self.show(&["Capture FAILED", failure.message()]);
                None
            }
        }
    }

    /// Handle the upload collaborator's response
    pub fn on_upload_response(&mut self, response: UploadResponse, now_ms: u64) -> Option<Action> {
        if self.mode != Mode::Uploading {
            return None;
        }

        match response {
            UploadResponse::Result(result) => {
                self.mode = self.mode.transition(Event::UploadReturnedResult);
                self.show_result(&result, now_ms);
                self.mode = self.mode.transition(Event::Rendered);
            }
            UploadResponse::Accepted { token } => {
                self.mode = self.mode.transition(Event::UploadAccepted);
                self.correlator.begin_waiting(token);
                self.animator.upload_pulse(now_ms);
                self.show(&["Upload OK", "Waiting result..."]);
            }
            UploadResponse::Failed { reason } => {
                let mut saved_line: String<32> = String::new();
                if let Some(image) = &self.last_image {
                    let _ = write!(saved_line, "{} bytes saved", image.len());
                }
                self.mode = self.mode.transition(Event::UploadFailed);
                self.animator.alert(now_ms);
                self.show(&["Upload failed", &reason, &saved_line]);
            }
        }
        None
    }

    /// Handle a polled or pushed analysis result
    ///
    /// Returns whether the result was rendered. A result is shown while
    /// `Waiting` per the correlator's matching rules, or while `Idle` when
    /// it is unsolicited but fresh; mid-cycle it never interrupts.
    pub fn on_poll_result(&mut self, candidate: &AnalysisResult, now_ms: u64) -> bool {
        if !matches!(self.mode, Mode::Waiting | Mode::Idle) {
            return false;
        }
        if self.correlator.observe(candidate) != DisplayDecision::Show {
            return false;
        }

        self.mode = self.mode.transition(Event::ResultReady);
        self.show_result(candidate, now_ms);
        self.mode = self.mode.transition(Event::Rendered);
        true
    }

    /// Advance indicator animation; called once per run-loop pass
    pub fn tick(&mut self, now_ms: u64) -> IndicatorFrame {
        self.animator.tick(now_ms)
    }

    fn show_result(&mut self, result: &AnalysisResult, now_ms: u64) {
        let token = if result.timestamp.is_empty() {
            // Server gave no token; stamp one locally so the duplicate
            // check keeps working on later polls
            fallback_token(now_ms)
        } else {
            result.timestamp.clone()
        };
        self.correlator.mark_displayed(token);
        self.animator.result_pulse(now_ms);

        let mut leaf: String<LINE_LEN> = String::new();
        let mut disease: String<LINE_LEN> = String::new();
        let mut solution: String<LINE_LEN> = String::new();
        let _ = write!(leaf, "Leaf: {}", non_empty(&result.leaf_name, "Unknown"));
        let _ = write!(
            disease,
            "Disease: {}",
            non_empty(&result.disease, "Unknown")
        );
        let _ = write!(
            solution,
            "Solution: {}",
            non_empty(&result.solution, "No advice")
        );
        self.show(&[&leaf, &disease, &solution]);
    }

    fn show(&mut self, lines: &[&str]) {
        self.screen = StatusScreen::from_lines(lines);
        self.screen_dirty = true;
    }
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn fallback_token(now_ms: u64) -> Token {
    let mut token = Token::new();
    let _ = write!(token, "local-{now_ms}");
    token
}
