//! Events that trigger state transitions

/// Where a capture trigger came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    /// Physical push button edge
    Button,
    /// HTTP capture request
    Request,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Capture requested (button edge or HTTP request)
    Trigger,

    // Capture session outcomes
    /// Frame received and checksum-verified
    CaptureSucceeded,
    /// Session ended in timeout, bad frame, or camera error
    CaptureFailed,

    // Upload outcomes
    /// Upload returned a usable analysis result synchronously
    UploadReturnedResult,
    /// Upload accepted; result will arrive asynchronously
    UploadAccepted,
    /// Upload request failed
    UploadFailed,

    // Result delivery
    /// Correlator matched a polled/pushed result to the pending capture
    ResultReady,
    /// Status screen rendered; cycle complete
    Rendered,
}

impl Event {
    /// Check if this event ends a capture cycle in failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::CaptureFailed | Event::UploadFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_events() {
        assert!(Event::CaptureFailed.is_failure());
        assert!(Event::UploadFailed.is_failure());
        assert!(!Event::Trigger.is_failure());
        assert!(!Event::ResultReady.is_failure());
    }
}
