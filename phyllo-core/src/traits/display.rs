//! Status display trait

use crate::screen::StatusScreen;

/// Errors that can occur while driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transaction failed
    Bus,
    /// Display did not respond in time
    Timeout,
}

/// Trait for the status surface
///
/// The display is a thin collaborator: it renders up to three lines of
/// text and owns its own geometry (wrapping, font, truncation). A failed
/// render is logged and dropped; the hub keeps running without a display.
#[allow(async_fn_in_trait)]
pub trait StatusDisplay {
    /// Render the screen contents
    async fn render(&mut self, screen: &StatusScreen) -> Result<(), DisplayError>;
}
