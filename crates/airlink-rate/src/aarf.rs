//! Auto rate fallback, fixed and adaptive.
//!
//! ARF steps up after `success_threshold` consecutive successes or
//! `timer_timeout` frames at one rate, and steps down after two consecutive
//! failures. The first frame after a step up is a probe: if it fails the
//! rate falls straight back. AARF additionally multiplies both thresholds on
//! every failed probe so a station stuck at a link's edge probes less and
//! less often. They return to their minima once a probe succeeds, and on a
//! regular two-failure fall back.
//!
//! ARF is AARF with both multipliers at 1 (see [`AarfConfig::arf`]).

use std::time::Instant;

use airlink_core::{
    catalog::{decrease, RateIndex},
    config::AarfConfig,
};
use tracing::{debug, trace};

use crate::rate_control::RateControl;

/// ARF/AARF algorithm.
#[derive(Debug, Clone)]
pub struct Aarf {
    config: AarfConfig,
}

/// Per-station ARF/AARF state.
#[derive(Debug, Clone)]
pub struct AarfStation {
    supported: usize,
    timer: u32,
    success: u32,
    failed: u32,
    /// Set right after a step up, until the probe frame resolves
    recovery: bool,
    /// Consecutive failures of the frame chain in flight
    retry: u32,
    success_threshold: u32,
    timer_timeout: u32,
    rate: RateIndex,
}

impl AarfStation {
    /// Current rate index.
    pub fn rate(&self) -> RateIndex {
        self.rate
    }

    /// Consecutive successes needed before the next step up.
    pub fn success_threshold(&self) -> u32 {
        self.success_threshold
    }

    /// Frames at one rate after which a success steps up.
    pub fn timer_timeout(&self) -> u32 {
        self.timer_timeout
    }

    /// Returns whether the next outcome resolves a probe.
    pub fn in_recovery(&self) -> bool {
        self.recovery
    }
}

impl Aarf {
    /// Creates the algorithm.
    pub fn new(config: AarfConfig) -> Self {
        Self { config }
    }

    /// Plain ARF.
    pub fn arf() -> Self {
        Self::new(AarfConfig::arf())
    }

    fn scale(value: u32, k: f64) -> u32 {
        (f64::from(value) * k).min(f64::from(u32::MAX)) as u32
    }
}

impl RateControl for Aarf {
    type Station = AarfStation;

    fn create_station(&self, supported: usize, _time: Instant) -> AarfStation {
        AarfStation {
            supported,
            timer: 0,
            success: 0,
            failed: 0,
            recovery: false,
            retry: 0,
            success_threshold: self.config.min_success_threshold,
            timer_timeout: self.config.min_timer_threshold,
            rate: 0,
        }
    }

    fn on_data_failed(&self, station: &mut AarfStation, _time: Instant) {
        station.timer = station.timer.saturating_add(1);
        station.failed = station.failed.saturating_add(1);
        station.retry = station.retry.saturating_add(1);
        station.success = 0;
        let previous = station.rate;

        if station.recovery {
            if station.retry == 1 {
                // The probe failed: back off and wait longer before the next one.
                station.success_threshold = Self::scale(station.success_threshold, self.config.success_k)
                    .min(self.config.max_success_threshold);
                station.timer_timeout = Self::scale(station.timer_timeout, self.config.timer_k)
                    .max(self.config.min_success_threshold);
                station.rate = decrease(station.rate);
            }
            station.timer = 0;
        } else {
            if (station.retry - 1) % 2 == 1 {
                station.timer_timeout = self.config.min_timer_threshold;
                station.success_threshold = self.config.min_success_threshold;
                station.rate = decrease(station.rate);
            }
            if station.retry >= 2 {
                station.timer = 0;
            }
        }

        trace!("aarf failure: retry={} recovery={}", station.retry, station.recovery);
        if previous != station.rate {
            debug!(
                "aarf rate down {} -> {} (success threshold {}, timer timeout {})",
                previous, station.rate, station.success_threshold, station.timer_timeout
            );
        }
    }

    fn on_data_succeeded(&self, station: &mut AarfStation, _ack_snr: f64, _time: Instant) {
        station.timer = station.timer.saturating_add(1);
        station.success = station.success.saturating_add(1);
        station.failed = 0;
        station.retry = 0;
        if station.recovery {
            // The increase held: start probing the next rate at the base pace.
            station.recovery = false;
            station.success_threshold = self.config.min_success_threshold;
            station.timer_timeout = self.config.min_timer_threshold;
        }
        trace!("aarf success: success={} timer={}", station.success, station.timer);

        let due = station.success == station.success_threshold || station.timer == station.timer_timeout;
        if due && station.rate + 1 < station.supported {
            station.rate += 1;
            station.timer = 0;
            station.success = 0;
            station.recovery = true;
            debug!("aarf rate up {} -> {}", station.rate - 1, station.rate);
        }
    }

    fn on_final_data_failed(&self, station: &mut AarfStation, _time: Instant) {
        station.retry = 0;
        station.recovery = false;
    }

    fn data_mode(&self, station: &mut AarfStation, _frame_size: u32, _time: Instant) -> RateIndex {
        station.rate
    }

    fn current_rate(&self, station: &AarfStation) -> RateIndex {
        station.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aarf() -> Aarf {
        Aarf::new(AarfConfig::default())
    }

    fn climb(rc: &Aarf, st: &mut AarfStation, now: Instant) {
        for _ in 0..st.success_threshold() {
            rc.on_data_succeeded(st, 20.0, now);
        }
    }

    #[test]
    fn test_step_up_after_success_threshold() {
        let now = Instant::now();
        let rc = aarf();
        let mut st = rc.create_station(8, now);

        for _ in 0..9 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 0);
        rc.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 1);
        assert!(st.in_recovery());
    }

    #[test]
    fn test_failed_probe_falls_back_and_grows_thresholds() {
        let now = Instant::now();
        let rc = aarf();
        let mut st = rc.create_station(8, now);
        climb(&rc, &mut st, now);
        assert_eq!(st.rate(), 1);

        rc.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 0);
        assert_eq!(st.success_threshold(), 20);
        assert_eq!(st.timer_timeout(), 30);

        // Another failure in the same chain is not a probe failure.
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.success_threshold(), 20);

        rc.on_final_data_failed(&mut st, now);
        climb(&rc, &mut st, now);
        assert_eq!(st.rate(), 1);
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.success_threshold(), 40);
        assert_eq!(st.timer_timeout(), 60);

        rc.on_final_data_failed(&mut st, now);
        climb(&rc, &mut st, now);
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.success_threshold(), 60);
    }

    #[test]
    fn test_successful_probe_restores_thresholds() {
        let now = Instant::now();
        let rc = aarf();
        let mut st = rc.create_station(8, now);
        climb(&rc, &mut st, now);
        rc.on_data_failed(&mut st, now);
        rc.on_final_data_failed(&mut st, now);
        assert_eq!((st.success_threshold(), st.timer_timeout()), (20, 30));

        climb(&rc, &mut st, now);
        assert_eq!(st.rate(), 1);
        assert!(st.in_recovery());
        assert_eq!(st.success_threshold(), 20);

        rc.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 1);
        assert!(!st.in_recovery());
        assert_eq!(st.success_threshold(), 10);
        assert_eq!(st.timer_timeout(), 15);

        // The next step up needs only the base streak again.
        for _ in 0..9 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 2);
    }

    #[test]
    fn test_two_failures_fall_back_and_restore_thresholds() {
        let now = Instant::now();
        let rc = aarf();
        let mut st = rc.create_station(8, now);
        st.rate = 3;
        climb(&rc, &mut st, now);
        assert_eq!(st.rate(), 4);
        rc.on_data_failed(&mut st, now);
        rc.on_final_data_failed(&mut st, now);
        assert_eq!(st.rate(), 3);
        assert_eq!(st.success_threshold(), 20);

        rc.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 3);
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 2);
        assert_eq!(st.success_threshold(), 10);
        assert_eq!(st.timer_timeout(), 15);

        rc.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 2);
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 1);
    }

    #[test]
    fn test_counters_saturate_at_top_rate() {
        let now = Instant::now();
        let rc = aarf();
        let mut st = rc.create_station(2, now);
        st.rate = 1;
        st.timer = u32::MAX;
        st.success = u32::MAX;
        rc.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 1);
        assert_eq!(st.timer, u32::MAX);
        assert_eq!(st.success, u32::MAX);

        st.failed = u32::MAX;
        st.retry = u32::MAX;
        rc.on_data_failed(&mut st, now);
        assert_eq!(st.failed, u32::MAX);
    }

    #[test]
    fn test_arf_thresholds_stay_fixed() {
        let now = Instant::now();
        let rc = Aarf::arf();
        let mut st = rc.create_station(8, now);
        for _ in 0..5 {
            climb(&rc, &mut st, now);
            rc.on_data_failed(&mut st, now);
            rc.on_final_data_failed(&mut st, now);
            assert_eq!(st.rate(), 0);
            assert_eq!(st.success_threshold(), 10);
            assert_eq!(st.timer_timeout(), 15);
        }
    }

    #[test]
    fn test_timer_steps_up_without_success_streak() {
        let now = Instant::now();
        let rc = Aarf::arf();
        let mut st = rc.create_station(8, now);
        st.rate = 3;
        // A single failure between successes never reaches a fall back.
        for _ in 0..7 {
            rc.on_data_succeeded(&mut st, 20.0, now);
            rc.on_data_failed(&mut st, now);
        }
        assert_eq!(st.rate(), 3);
        assert_eq!(st.timer, 14);
        rc.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 4);
    }

    #[test]
    fn test_top_rate_saturates() {
        let now = Instant::now();
        let rc = aarf();
        let mut st = rc.create_station(2, now);
        for _ in 0..100 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 1);
        assert!(!rc.needs_rts(&mut st, 100, false));
        assert_eq!(rc.rts_mode(&mut st, now), 0);
    }
}
