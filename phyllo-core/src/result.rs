//! Analysis result correlation
//!
//! The inference server delivers results asynchronously; the hub polls for
//! them. The correlator matches a polled result to the capture that
//! requested it using the server-assigned timestamp as a correlation token,
//! and decides whether a candidate is new relative to what is already on
//! the screen - without it, every poll tick would redraw the same result.

use heapless::String;

/// Correlation token capacity; the server stamps `YYYYMMDD_HHMMSS`
pub const TOKEN_LEN: usize = 24;

/// Opaque correlation token (server timestamp)
pub type Token = String<TOKEN_LEN>;

/// One analysis result as delivered by the inference server
///
/// The server emits each field under two names (`leaf_name`/`species`,
/// `disease`/`condition`, `solution`/`recommendation`); the aliases accept
/// either spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisResult {
    #[cfg_attr(feature = "serde", serde(alias = "species"))]
    pub leaf_name: String<32>,
    #[cfg_attr(feature = "serde", serde(alias = "condition"))]
    pub disease: String<48>,
    #[cfg_attr(feature = "serde", serde(alias = "recommendation"))]
    pub solution: String<96>,
    pub timestamp: Token,
}

impl AnalysisResult {
    /// Check if the result carries no usable field
    pub fn is_empty(&self) -> bool {
        self.leaf_name.is_empty()
            && self.disease.is_empty()
            && self.solution.is_empty()
            && self.timestamp.is_empty()
    }
}

/// Whether an observed result should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayDecision {
    Show,
    Suppress,
}

/// Matches asynchronous results to the capture that requested them
///
/// At most one result is pending at a time; a new capture supersedes any
/// prior pending result so a stale analysis is never shown after a newer
/// capture has started.
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    /// A capture is waiting for its result
    waiting: bool,
    /// Token assigned by the server at upload time, if any
    pending: Option<Token>,
    /// A result has been rendered since the current wait began
    displayed_since_wait: bool,
    /// Last token actually rendered, for duplicate detection
    displayed: Option<Token>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting for the result of a fresh upload
    ///
    /// `token` is the server-assigned correlation token from the upload
    /// response; `None` when the server provided none, in which case the
    /// first result observed while waiting is taken (best effort).
    pub fn begin_waiting(&mut self, token: Option<Token>) {
        self.waiting = true;
        self.pending = token;
        self.displayed_since_wait = false;
    }

    /// A new capture started; discard the pending result
    ///
    /// A late result for the old token will no longer match, but the last
    /// displayed token is kept so duplicates stay suppressed.
    pub fn supersede(&mut self) {
        self.waiting = false;
        self.pending = None;
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Decide whether a candidate result should be rendered
    pub fn observe(&self, candidate: &AnalysisResult) -> DisplayDecision {
        if self.waiting {
            let show = match &self.pending {
                Some(token) => {
                    candidate.timestamp == *token
                        && (!self.displayed_since_wait
                            || self.displayed.as_ref() != Some(&candidate.timestamp))
                }
                // No token was assigned; take the first result of this wait
                None => !self.displayed_since_wait,
            };
            if show {
                return DisplayDecision::Show;
            }
        } else if !candidate.timestamp.is_empty()
            && self.displayed.as_ref() != Some(&candidate.timestamp)
            && !candidate.is_empty()
        {
            // Unsolicited or late result, still worth surfacing once
            return DisplayDecision::Show;
        }

        DisplayDecision::Suppress
    }

    /// Record that a result was rendered under `token`
    ///
    /// Ends the current wait. The caller stamps a local fallback token when
    /// the result carried none, so duplicate detection keeps working.
    pub fn mark_displayed(&mut self, token: Token) {
        self.displayed = Some(token);
        self.displayed_since_wait = true;
        self.waiting = false;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(token: &str) -> AnalysisResult {
        AnalysisResult {
            leaf_name: String::try_from("Tomato").unwrap(),
            disease: String::try_from("Early Blight").unwrap(),
            solution: String::try_from("Remove affected leaves").unwrap(),
            timestamp: String::try_from(token).unwrap(),
        }
    }

    #[test]
    fn test_show_exactly_once_for_pending_token() {
        let mut correlator = Correlator::new();
        correlator.begin_waiting(Some(Token::try_from("20250101_120000").unwrap()));

        let candidate = result("20250101_120000");
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Show);

        correlator.mark_displayed(candidate.timestamp.clone());
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Suppress);
    }

    #[test]
    fn test_wrong_token_suppressed_while_waiting() {
        let mut correlator = Correlator::new();
        correlator.begin_waiting(Some(Token::try_from("20250101_120000").unwrap()));

        assert_eq!(
            correlator.observe(&result("20240601_000000")),
            DisplayDecision::Suppress
        );
    }

    #[test]
    fn test_tokenless_wait_takes_first_result() {
        let mut correlator = Correlator::new();
        correlator.begin_waiting(None);

        let first = result("20250101_120000");
        assert_eq!(correlator.observe(&first), DisplayDecision::Show);

        correlator.mark_displayed(first.timestamp.clone());
        assert_eq!(correlator.observe(&first), DisplayDecision::Suppress);
    }

    #[test]
    fn test_supersede_discards_pending() {
        let mut correlator = Correlator::new();
        correlator.begin_waiting(Some(Token::try_from("old-token").unwrap()));
        correlator.supersede();

        // The late result for the old capture must not be shown
        assert!(!correlator.is_waiting());
        assert_eq!(
            correlator.observe(&result("old-token")),
            DisplayDecision::Suppress
        );
    }

    #[test]
    fn test_unsolicited_fresh_result_shown_once() {
        let mut correlator = Correlator::new();

        let candidate = result("20250301_080000");
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Show);

        correlator.mark_displayed(candidate.timestamp.clone());
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Suppress);

        // A newer unsolicited result is again worth surfacing
        assert_eq!(
            correlator.observe(&result("20250301_090000")),
            DisplayDecision::Show
        );
    }

    #[test]
    fn test_empty_or_tokenless_unsolicited_suppressed() {
        let correlator = Correlator::new();

        assert_eq!(
            correlator.observe(&AnalysisResult::default()),
            DisplayDecision::Suppress
        );

        // No token while idle: nothing to dedupe on, so nothing is shown
        let mut tokenless = result("x");
        tokenless.timestamp = Token::new();
        assert_eq!(correlator.observe(&tokenless), DisplayDecision::Suppress);
    }

    #[test]
    fn test_supersede_keeps_duplicate_suppression() {
        let mut correlator = Correlator::new();
        correlator.begin_waiting(Some(Token::try_from("t1").unwrap()));
        correlator.mark_displayed(Token::try_from("t1").unwrap());

        correlator.begin_waiting(Some(Token::try_from("t2").unwrap()));
        correlator.supersede();

        // Old displayed token still suppresses its duplicate
        assert_eq!(correlator.observe(&result("t1")), DisplayDecision::Suppress);
    }

    #[test]
    fn test_same_token_redisplay_blocked_within_wait() {
        // Waiting with a token that was already displayed in this wait
        let mut correlator = Correlator::new();
        correlator.begin_waiting(Some(Token::try_from("t9").unwrap()));

        let candidate = result("t9");
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Show);
        correlator.mark_displayed(candidate.timestamp.clone());

        // mark_displayed ended the wait; every further tick suppresses
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Suppress);
        assert_eq!(correlator.observe(&candidate), DisplayDecision::Suppress);
    }
}
