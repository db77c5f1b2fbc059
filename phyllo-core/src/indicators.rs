//! Indicator animation
//!
//! Time-based, non-blocking generator of the LED and buzzer patterns. The
//! animator is a pure function of injected time and its own sub-state; the
//! orchestrator calls [`tick`](IndicatorAnimator::tick) once per loop pass
//! and hands the frame to the GPIO drivers.
//!
//! Patterns end by absolute end-time comparison, never by counting ticks,
//! so the animation survives irregular tick intervals.

use crate::config::IndicatorConfig;

/// Desired on/off level of each indicator for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorFrame {
    /// Red LED: processing blink, or solid during an alert pulse
    pub red: bool,
    /// Green LED: upload and result pulses
    pub green: bool,
    /// Buzzer: result-displayed pulse
    pub buzzer: bool,
}

/// LED/buzzer pattern generator
#[derive(Debug)]
pub struct IndicatorAnimator {
    config: IndicatorConfig,
    /// Blink pattern active (capture/upload/wait in progress)
    processing: bool,
    blink_state: bool,
    last_blink_ms: u64,
    alert_until: Option<u64>,
    green_until: Option<u64>,
    buzzer_until: Option<u64>,
}

impl IndicatorAnimator {
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            processing: false,
            blink_state: false,
            last_blink_ms: 0,
            alert_until: None,
            green_until: None,
            buzzer_until: None,
        }
    }

    /// Enter the processing blink; clears any previous pulse
    pub fn set_processing(&mut self, now_ms: u64) {
        self.processing = true;
        self.blink_state = true;
        self.last_blink_ms = now_ms;
        self.alert_until = None;
        self.green_until = None;
        self.buzzer_until = None;
    }

    /// Stop the processing blink
    pub fn clear_processing(&mut self) {
        self.processing = false;
        self.blink_state = false;
    }

    /// Green pulse after a successful upload
    pub fn upload_pulse(&mut self, now_ms: u64) {
        self.green_until = Some(now_ms + u64::from(self.config.upload_pulse_ms));
    }

    /// Success pulse when a result reaches the screen: green plus buzzer
    pub fn result_pulse(&mut self, now_ms: u64) {
        self.clear_processing();
        self.green_until = Some(now_ms + u64::from(self.config.success_pulse_ms));
        self.buzzer_until = Some(now_ms + u64::from(self.config.buzzer_pulse_ms));
    }

    /// Red pulse after a failed cycle
    pub fn alert(&mut self, now_ms: u64) {
        self.clear_processing();
        self.green_until = None;
        self.buzzer_until = None;
        self.alert_until = Some(now_ms + u64::from(self.config.alert_pulse_ms));
    }

    /// Advance the animation and return the levels for this instant
    pub fn tick(&mut self, now_ms: u64) -> IndicatorFrame {
        if self.processing
            && now_ms.saturating_sub(self.last_blink_ms)
                >= u64::from(self.config.blink_half_period_ms)
        {
            self.blink_state = !self.blink_state;
            self.last_blink_ms = now_ms;
        }

        // Pulses self-terminate on their absolute end time
        for until in [
            &mut self.alert_until,
            &mut self.green_until,
            &mut self.buzzer_until,
        ] {
            if until.is_some_and(|t| now_ms >= t) {
                *until = None;
            }
        }

        IndicatorFrame {
            red: self.alert_until.is_some() || (self.processing && self.blink_state),
            green: self.green_until.is_some(),
            buzzer: self.buzzer_until.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> IndicatorAnimator {
        IndicatorAnimator::new(IndicatorConfig::default())
    }

    #[test]
    fn test_idle_is_dark() {
        let mut a = animator();
        assert_eq!(a.tick(0), IndicatorFrame::default());
        assert_eq!(a.tick(10_000), IndicatorFrame::default());
    }

    #[test]
    fn test_processing_blink_half_period() {
        let mut a = animator();
        a.set_processing(0);

        assert!(a.tick(0).red);
        assert!(a.tick(249).red);
        assert!(!a.tick(250).red);
        assert!(!a.tick(499).red);
        assert!(a.tick(500).red);
    }

    #[test]
    fn test_blink_survives_irregular_ticks() {
        let mut a = animator();
        a.set_processing(0);

        // A long gap still toggles exactly once per tick call
        assert!(a.tick(0).red);
        assert!(!a.tick(900).red);
        assert!(a.tick(1_200).red);
    }

    #[test]
    fn test_upload_pulse_self_terminates() {
        let mut a = animator();
        a.upload_pulse(1_000);

        assert!(a.tick(1_000).green);
        assert!(a.tick(1_799).green);
        assert!(!a.tick(1_800).green);
        // Stays off without further calls to upload_pulse
        assert!(!a.tick(5_000).green);
    }

    #[test]
    fn test_result_pulse_drives_green_and_buzzer() {
        let mut a = animator();
        a.set_processing(0);
        a.result_pulse(1_000);

        let frame = a.tick(1_000);
        assert!(frame.buzzer);
        assert!(frame.green);
        assert!(!frame.red);

        // Green (1.5 s) ends before the buzzer (5 s)
        assert!(!a.tick(2_500).green);
        assert!(a.tick(5_999).buzzer);
        assert!(!a.tick(6_000).buzzer);
    }

    #[test]
    fn test_alert_pulse_self_terminates() {
        let mut a = animator();
        a.set_processing(0);
        a.alert(2_000);

        let frame = a.tick(2_000);
        assert!(frame.red);
        assert!(!frame.green);
        assert!(!frame.buzzer);

        assert!(a.tick(3_499).red);
        assert!(!a.tick(3_500).red);
    }

    #[test]
    fn test_trigger_during_alert_returns_to_blink() {
        let mut a = animator();
        a.alert(0);
        a.set_processing(100);

        // Blinking again, not solid
        assert!(a.tick(100).red);
        assert!(!a.tick(350).red);
    }

    #[test]
    fn test_set_processing_clears_pulses() {
        let mut a = animator();
        a.upload_pulse(0);
        a.result_pulse(0);
        a.set_processing(10);

        let frame = a.tick(10);
        assert!(!frame.green);
        assert!(!frame.buzzer);
    }
}
