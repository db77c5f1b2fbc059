//! State machine definition
//!
//! All indicator, display, and network behavior is a function of the
//! current mode and an event. One capture cycle walks
//! Idle → Capturing → Uploading → (Waiting →) Displaying → Idle;
//! every failure path folds back to Idle.

use super::events::Event;

/// Device modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Ready for a trigger
    Idle,
    /// Capture session running against the camera link
    Capturing,
    /// Image handed to the upload collaborator
    Uploading,
    /// Upload accepted; polling for the analysis result
    Waiting,
    /// Result being rendered (transient, never held)
    Displaying,
}

impl Mode {
    /// Check if a new trigger is accepted in this mode
    ///
    /// A trigger while `Waiting` supersedes the pending result; triggers in
    /// any other busy mode are rejected, not queued.
    pub fn accepts_trigger(&self) -> bool {
        matches!(self, Mode::Idle | Mode::Waiting)
    }

    /// Check if this mode should show the processing blink pattern
    pub fn is_processing(&self) -> bool {
        matches!(self, Mode::Capturing | Mode::Uploading | Mode::Waiting)
    }

    /// Process an event and return the next mode
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Mode::*;

        match (self, event) {
            // Trigger handling; Waiting supersedes the pending result
            (Idle, Trigger) => Capturing,
            (Waiting, Trigger) => Capturing,

            // Capture session outcomes
            (Capturing, CaptureSucceeded) => Uploading,
            (Capturing, CaptureFailed) => Idle,

            // Upload outcomes
            (Uploading, UploadReturnedResult) => Displaying,
            (Uploading, UploadAccepted) => Waiting,
            (Uploading, UploadFailed) => Idle,

            // Asynchronous result delivery
            (Waiting, ResultReady) => Displaying,

            // Displaying is terminal per cycle, not a hold state
            (Displaying, Rendered) => Idle,

            // Default: stay in current mode
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_with_waiting() {
        let mode = Mode::Idle;
        let mode = mode.transition(Event::Trigger);
        assert_eq!(mode, Mode::Capturing);
        let mode = mode.transition(Event::CaptureSucceeded);
        assert_eq!(mode, Mode::Uploading);
        let mode = mode.transition(Event::UploadAccepted);
        assert_eq!(mode, Mode::Waiting);
        let mode = mode.transition(Event::ResultReady);
        assert_eq!(mode, Mode::Displaying);
        let mode = mode.transition(Event::Rendered);
        assert_eq!(mode, Mode::Idle);
    }

    #[test]
    fn test_synchronous_result_skips_waiting() {
        let mode = Mode::Uploading.transition(Event::UploadReturnedResult);
        assert_eq!(mode, Mode::Displaying);
        assert_eq!(mode.transition(Event::Rendered), Mode::Idle);
    }

    #[test]
    fn test_failures_return_to_idle() {
        assert_eq!(Mode::Capturing.transition(Event::CaptureFailed), Mode::Idle);
        assert_eq!(Mode::Uploading.transition(Event::UploadFailed), Mode::Idle);
    }

    #[test]
    fn test_trigger_rejected_while_busy() {
        for mode in [Mode::Capturing, Mode::Uploading, Mode::Displaying] {
            assert!(!mode.accepts_trigger());
            // A trigger event in a busy mode is a no-op
            assert_eq!(mode.transition(Event::Trigger), mode);
        }
    }

    #[test]
    fn test_supersede_from_waiting() {
        assert!(Mode::Waiting.accepts_trigger());
        assert_eq!(Mode::Waiting.transition(Event::Trigger), Mode::Capturing);
    }

    #[test]
    fn test_processing_modes() {
        assert!(Mode::Capturing.is_processing());
        assert!(Mode::Uploading.is_processing());
        assert!(Mode::Waiting.is_processing());
        assert!(!Mode::Idle.is_processing());
        assert!(!Mode::Displaying.is_processing());
    }

    #[test]
    fn test_stale_events_ignored() {
        // Outcomes arriving in the wrong mode do not move the machine
        assert_eq!(Mode::Idle.transition(Event::CaptureSucceeded), Mode::Idle);
        assert_eq!(Mode::Idle.transition(Event::ResultReady), Mode::Idle);
        assert_eq!(Mode::Capturing.transition(Event::UploadAccepted), Mode::Capturing);
    }
}
