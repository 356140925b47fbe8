//! Robust rate adaptation.
//!
//! Loss is measured over an evaluation window of `ewnd` frames (or until the
//! window times out). The window's loss ratio is compared with the
//! threshold table: above the fall-back threshold of the next lower rate the
//! rate steps down, below the raise threshold of the next higher rate it
//! steps up. Outside basic mode an adaptive RTS window protects frames after
//! losses so collision losses do not drag the rate down.

use std::time::Instant;

use airlink_core::{
    catalog::{decrease, increase, RateIndex},
    config::{RraaConfig, NEVER_FALL_BACK, NEVER_RAISE},
    error::Result,
};
use tracing::{debug, trace};

use crate::rate_control::RateControl;

/// RRAA algorithm.
#[derive(Debug, Clone)]
pub struct Rraa {
    config: RraaConfig,
}

/// Per-station RRAA state.
#[derive(Debug, Clone)]
pub struct RraaStation {
    supported: usize,
    rate: RateIndex,
    /// Frames left in the evaluation window; 0 means the window is closed
    counter: usize,
    /// Frames seen in the evaluation window
    attempts: usize,
    /// Frames lost in the evaluation window
    failed: usize,
    last_reset: Instant,
    rts_on: bool,
    rts_window: u32,
    rts_counter: u32,
    last_frame_failed: bool,
}

impl RraaStation {
    /// Current rate index.
    pub fn rate(&self) -> RateIndex {
        self.rate
    }

    /// Frames left in the current evaluation window.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Frames lost in the current evaluation window.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Returns whether the last answer to `needs_rts` turned RTS on.
    pub fn rts_on(&self) -> bool {
        self.rts_on
    }

    /// Size of the adaptive RTS window.
    pub fn rts_window(&self) -> u32 {
        self.rts_window
    }
}

impl Rraa {
    /// Creates the algorithm.
    pub fn new(config: RraaConfig) -> Self {
        Self { config }
    }

    /// Loss ratio above which a sender at `rate` falls back.
    fn fall_back_threshold(&self, rate: RateIndex) -> f64 {
        if rate == 0 {
            NEVER_FALL_BACK
        } else {
            self.config.thresholds.pmtl(rate - 1)
        }
    }

    /// Loss ratio below which a sender at `rate` moves up.
    fn raise_threshold(&self, station: &RraaStation) -> f64 {
        if station.rate + 1 >= station.supported {
            NEVER_RAISE
        } else {
            self.config.thresholds.pori(station.rate + 1)
        }
    }

    fn reset_window(&self, station: &mut RraaStation, time: Instant) {
        station.counter = self.config.thresholds.ewnd(station.rate);
        station.attempts = 0;
        station.failed = 0;
        station.last_reset = time;
    }

    /// Closes the window when it ran out of frames or time, then re-arms it.
    fn check_timeout(&self, station: &mut RraaStation, time: Instant) {
        let expired = time.saturating_duration_since(station.last_reset) > self.config.timeout;
        if station.counter == 0 || expired {
            if station.attempts > 0 {
                self.evaluate(station);
            }
            self.reset_window(station, time);
        }
    }

    fn evaluate(&self, station: &mut RraaStation) {
        let ratio = station.failed as f64 / station.attempts as f64;
        let previous = station.rate;
        if ratio > self.fall_back_threshold(station.rate) {
            station.rate = decrease(station.rate);
        } else if ratio < self.raise_threshold(station) {
            station.rate = increase(station.rate, station.supported);
            station.rts_on = false;
            station.rts_window = 0;
            station.rts_counter = 0;
        }
        if previous != station.rate {
            debug!(
                "rraa rate {} -> {} (loss {}/{})",
                previous, station.rate, station.failed, station.attempts
            );
        }
    }

    fn record_outcome(&self, station: &mut RraaStation, failed: bool, time: Instant) {
        self.check_timeout(station, time);
        station.counter = station.counter.saturating_sub(1);
        station.attempts += 1;
        station.last_frame_failed = failed;
        if failed {
            station.failed += 1;
        }
        trace!(
            "rraa outcome failed={} window: {} lost of {}, {} left",
            failed,
            station.failed,
            station.attempts,
            station.counter
        );

        if station.counter == 0 {
            self.evaluate(station);
            self.reset_window(station, time);
        } else if failed {
            // The loss count can only grow, so the final ratio is already known to be too high.
            let ewnd = self.config.thresholds.ewnd(station.rate) as f64;
            if station.failed as f64 / ewnd > self.fall_back_threshold(station.rate) {
                let previous = station.rate;
                station.rate = decrease(station.rate);
                debug!("rraa early fall back {} -> {}", previous, station.rate);
                self.reset_window(station, time);
            }
        }
    }

    fn adapt_rts(&self, station: &mut RraaStation) {
        if !station.rts_on && station.last_frame_failed {
            station.rts_window += 1;
            station.rts_counter = station.rts_window;
        } else if station.rts_on == station.last_frame_failed {
            station.rts_window /= 2;
            station.rts_counter = station.rts_window;
        }
        if station.rts_counter > 0 {
            station.rts_on = true;
            station.rts_counter -= 1;
        } else {
            station.rts_on = false;
        }
    }
}

impl RateControl for Rraa {
    type Station = RraaStation;

    fn validate(&self, supported: usize) -> Result<()> {
        self.config.thresholds.validate(supported)
    }

    fn create_station(&self, supported: usize, time: Instant) -> RraaStation {
        RraaStation {
            supported,
            rate: 0,
            counter: 0,
            attempts: 0,
            failed: 0,
            last_reset: time,
            rts_on: false,
            rts_window: 0,
            rts_counter: 0,
            last_frame_failed: false,
        }
    }

    fn on_data_failed(&self, station: &mut RraaStation, time: Instant) {
        self.record_outcome(station, true, time);
    }

    fn on_data_succeeded(&self, station: &mut RraaStation, _ack_snr: f64, time: Instant) {
        self.record_outcome(station, false, time);
    }

    fn on_final_data_failed(&self, station: &mut RraaStation, time: Instant) {
        self.check_timeout(station, time);
    }

    fn on_final_rts_failed(&self, station: &mut RraaStation, time: Instant) {
        self.check_timeout(station, time);
    }

    fn data_mode(&self, station: &mut RraaStation, _frame_size: u32, time: Instant) -> RateIndex {
        self.check_timeout(station, time);
        station.rate
    }

    fn needs_rts(&self, station: &mut RraaStation, _frame_size: u32, normally_required: bool) -> bool {
        if self.config.basic {
            return normally_required;
        }
        self.adapt_rts(station);
        normally_required || station.rts_on
    }

    fn current_rate(&self, station: &RraaStation) -> RateIndex {
        station.rate
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use airlink_core::config::RraaThresholds;

    use super::*;

    fn rraa(basic: bool) -> Rraa {
        Rraa::new(RraaConfig { basic, ..RraaConfig::default() })
    }

    #[test]
    fn test_clean_window_raises_rate() {
        let now = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, now);

        // ewnd at the lowest rate is 6.
        for _ in 0..5 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 0);
        rc.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 1);
        assert_eq!(st.counter(), 10);
        assert_eq!(st.failed(), 0);
    }

    #[test]
    fn test_lossy_window_falls_back_early() {
        let now = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, now);
        st.rate = 3;

        // ewnd 20 at rate 3; pmtl(2) = 0.3116 needs more than 6.2 losses.
        for _ in 0..6 {
            rc.on_data_failed(&mut st, now);
        }
        assert_eq!(st.rate(), 3);
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 2);
        assert_eq!(st.failed(), 0);
        assert_eq!(st.counter(), 20);
    }

    #[test]
    fn test_middle_ratio_keeps_rate() {
        let now = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, now);
        st.rate = 1;

        // ewnd 10 at rate 1: 2 losses is 0.2, above pori(2) and below pmtl(0).
        rc.on_data_failed(&mut st, now);
        rc.on_data_failed(&mut st, now);
        for _ in 0..8 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 1);
        assert_eq!(st.counter(), 10);
    }

    #[test]
    fn test_timeout_closes_partial_window() {
        let start = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, start);
        rc.on_data_succeeded(&mut st, 20.0, start);
        rc.on_data_succeeded(&mut st, 20.0, start);
        assert_eq!(st.counter(), 4);

        let later = start + Duration::from_millis(51);
        assert_eq!(rc.data_mode(&mut st, 1500, later), 1);
        assert_eq!(st.counter(), 10);
    }

    #[test]
    fn test_stale_window_is_closed_by_final_failure() {
        let start = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, start);
        st.rate = 2;
        for _ in 0..6 {
            rc.on_data_failed(&mut st, start);
        }
        rc.on_final_data_failed(&mut st, start + Duration::from_millis(60));
        assert_eq!(st.rate(), 1);
    }

    #[test]
    fn test_highest_rate_never_raises_lowest_never_falls() {
        let now = Instant::now();
        let rc = rraa(true);
        let mut st = rc.create_station(8, now);
        for _ in 0..100 {
            rc.on_data_failed(&mut st, now);
        }
        assert_eq!(st.rate(), 0);

        st.rate = 7;
        st.counter = 0;
        st.attempts = 0;
        st.failed = 0;
        for _ in 0..200 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 7);
    }

    #[test]
    fn test_single_rate_catalog() {
        let now = Instant::now();
        let rc = Rraa::new(RraaConfig {
            thresholds: RraaThresholds::uniform(1, 4, 0.5, 0.5),
            ..RraaConfig::default()
        });
        rc.validate(1).unwrap();
        let mut st = rc.create_station(1, now);
        for i in 0..40 {
            if i % 3 == 0 {
                rc.on_data_failed(&mut st, now);
            } else {
                rc.on_data_succeeded(&mut st, 20.0, now);
            }
            assert_eq!(rc.data_mode(&mut st, 1500, now), 0);
        }
    }

    #[test]
    fn test_validate_checks_table_length() {
        let rc = rraa(false);
        assert!(rc.validate(8).is_ok());
        assert!(rc.validate(4).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_adaptive_rts_window() {
        let now = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, now);
        st.rate = 4;

        assert!(!rc.needs_rts(&mut st, 100, false));

        rc.on_data_failed(&mut st, now);
        assert!(rc.needs_rts(&mut st, 100, false));
        assert_eq!(st.rts_window(), 1);

        // Lost again with RTS on: window halves to 0, RTS goes off.
        rc.on_data_failed(&mut st, now);
        assert!(!rc.needs_rts(&mut st, 100, false));
        assert_eq!(st.rts_window(), 0);

        rc.on_data_failed(&mut st, now);
        assert!(rc.needs_rts(&mut st, 100, false));
        rc.on_data_succeeded(&mut st, 20.0, now);
        assert!(!rc.needs_rts(&mut st, 100, false));
        assert!(rc.needs_rts(&mut st, 3000, true));
    }

    #[test]
    fn test_basic_mode_echoes_normal_rts_policy() {
        let now = Instant::now();
        let rc = rraa(true);
        let mut st = rc.create_station(8, now);
        rc.on_data_failed(&mut st, now);
        assert!(!rc.needs_rts(&mut st, 100, false));
        assert!(rc.needs_rts(&mut st, 3000, true));
        assert!(!st.rts_on());
    }

    #[test]
    fn test_raise_clears_rts_window() {
        let now = Instant::now();
        let rc = rraa(false);
        let mut st = rc.create_station(8, now);
        st.rts_window = 3;
        st.rts_counter = 2;
        st.rts_on = true;
        for _ in 0..6 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 1);
        assert_eq!(st.rts_window(), 0);
        assert!(!st.rts_on());
    }
}
