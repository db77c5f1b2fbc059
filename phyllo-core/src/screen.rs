//! Status screen buffer
//!
//! A small text buffer the orchestrator writes status into and the display
//! task renders. The display collaborator decides wrapping and truncation
//! for its own geometry; lines here are bounded only by the longest status
//! message the hub composes.

use heapless::String;

/// Lines on the status surface
pub const SCREEN_LINES: usize = 3;

/// Maximum characters per status line
pub const LINE_LEN: usize = 112;

/// Text content of the status surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusScreen {
    lines: [String<LINE_LEN>; SCREEN_LINES],
}

impl StatusScreen {
    /// Create an empty screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a screen from up to three lines
    pub fn from_lines(lines: &[&str]) -> Self {
        let mut screen = Self::new();
        for (row, text) in lines.iter().take(SCREEN_LINES).enumerate() {
            screen.set_line(row, text);
        }
        screen
    }

    /// Clear all lines
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Set the content of a row, truncating overlong text
    pub fn set_line(&mut self, row: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
            let end = floor_char_boundary(text, LINE_LEN);
            let _ = line.push_str(&text[..end]);
        }
    }

    /// Get the content of a row
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|l| l.as_str()).unwrap_or("")
    }

    /// Iterate over all lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }
}

/// Largest index `<= max` that lands on a char boundary of `text`
fn floor_char_boundary(text: &str, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines() {
        let screen = StatusScreen::from_lines(&["Capturing...", "Please wait"]);
        assert_eq!(screen.line(0), "Capturing...");
        assert_eq!(screen.line(1), "Please wait");
        assert_eq!(screen.line(2), "");
    }

    #[test]
    fn test_extra_lines_dropped() {
        let screen = StatusScreen::from_lines(&["a", "b", "c", "d"]);
        assert_eq!(screen.lines().count(), SCREEN_LINES);
        assert_eq!(screen.line(2), "c");
    }

    #[test]
    fn test_overlong_line_truncated() {
        let long = "x".repeat(LINE_LEN + 10);
        let mut screen = StatusScreen::new();
        screen.set_line(0, &long);
        assert_eq!(screen.line(0).len(), LINE_LEN);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // Multi-byte character straddling the limit is dropped, not split
        let mut text = "x".repeat(LINE_LEN - 1);
        text.push('ü');
        let mut screen = StatusScreen::new();
        screen.set_line(0, &text);
        assert_eq!(screen.line(0).len(), LINE_LEN - 1);
    }
}
