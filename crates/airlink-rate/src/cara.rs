//! Collision-aware rate adaptation.
//!
//! Counts consecutive successes and failures. A failure streak of
//! `failure_threshold` steps the rate down; a success streak of
//! `success_threshold`, or `timeout` outcomes at the same rate, steps it up.
//! After any failure the next frame is protected by RTS/CTS, which tells
//! collisions apart from channel errors.

use std::time::Instant;

use airlink_core::{
    catalog::{decrease, increase, RateIndex},
    config::CaraConfig,
};
use tracing::{debug, trace};

use crate::rate_control::RateControl;

/// CARA algorithm.
#[derive(Debug, Clone)]
pub struct Cara {
    config: CaraConfig,
}

/// Per-station CARA counters.
#[derive(Debug, Clone)]
pub struct CaraStation {
    supported: usize,
    /// Outcomes since the last rate change
    timer: u32,
    /// Consecutive failures
    failed: u32,
    /// Consecutive successes
    success: u32,
    rate: RateIndex,
}

impl CaraStation {
    /// Current rate index.
    pub fn rate(&self) -> RateIndex {
        self.rate
    }

    /// Consecutive failures.
    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// Consecutive successes.
    pub fn success(&self) -> u32 {
        self.success
    }

    /// Outcomes since the last rate change.
    pub fn timer(&self) -> u32 {
        self.timer
    }
}

impl Cara {
    /// Creates the algorithm.
    pub fn new(config: CaraConfig) -> Self {
        Self { config }
    }
}

impl RateControl for Cara {
    type Station = CaraStation;

    fn create_station(&self, supported: usize, _time: Instant) -> CaraStation {
        CaraStation { supported, timer: 0, failed: 0, success: 0, rate: 0 }
    }

    fn on_data_failed(&self, station: &mut CaraStation, _time: Instant) {
        station.timer += 1;
        station.failed += 1;
        station.success = 0;
        trace!("cara failure: failed={} timer={}", station.failed, station.timer);
        if station.failed >= self.config.failure_threshold {
            let previous = station.rate;
            station.rate = decrease(station.rate);
            station.failed = 0;
            station.timer = 0;
            debug!("cara rate down {} -> {}", previous, station.rate);
        }
    }

    fn on_data_succeeded(&self, station: &mut CaraStation, _ack_snr: f64, _time: Instant) {
        station.timer += 1;
        station.success += 1;
        station.failed = 0;
        trace!("cara success: success={} timer={}", station.success, station.timer);
        if station.success == self.config.success_threshold || station.timer >= self.config.timeout {
            let previous = station.rate;
            station.rate = increase(station.rate, station.supported);
            station.timer = 0;
            station.success = 0;
            if previous != station.rate {
                debug!("cara rate up {} -> {}", previous, station.rate);
            }
        }
    }

    fn data_mode(&self, station: &mut CaraStation, _frame_size: u32, _time: Instant) -> RateIndex {
        station.rate
    }

    fn needs_rts(&self, station: &mut CaraStation, _frame_size: u32, normally_required: bool) -> bool {
        normally_required || station.failed >= self.config.probe_threshold
    }

    fn current_rate(&self, station: &CaraStation) -> RateIndex {
        station.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(supported: usize) -> (Cara, CaraStation, Instant) {
        let now = Instant::now();
        let cara = Cara::new(CaraConfig::default());
        let station = cara.create_station(supported, now);
        (cara, station, now)
    }

    #[test]
    fn test_decrease_after_failure_threshold() {
        let (cara, mut st, now) = station(8);
        st.rate = 4;
        st.timer = 3;

        cara.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 4);
        assert_eq!(st.failed(), 1);

        cara.on_data_failed(&mut st, now);
        assert_eq!(st.rate(), 3);
        assert_eq!(st.failed(), 0);
        assert_eq!(st.timer(), 0);
    }

    #[test]
    fn test_decrease_saturates_at_lowest_rate() {
        let (cara, mut st, now) = station(8);
        for _ in 0..10 {
            cara.on_data_failed(&mut st, now);
        }
        assert_eq!(st.rate(), 0);
    }

    #[test]
    fn test_increase_after_success_threshold() {
        let (cara, mut st, now) = station(8);
        for _ in 0..9 {
            cara.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 0);
        cara.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 1);
        assert_eq!(st.success(), 0);
        assert_eq!(st.timer(), 0);
    }

    #[test]
    fn test_increase_after_timeout() {
        let (cara, mut st, now) = station(8);
        // Alternate so the success streak never reaches its threshold.
        for _ in 0..7 {
            cara.on_data_succeeded(&mut st, 20.0, now);
            cara.on_data_failed(&mut st, now);
        }
        assert_eq!(st.rate(), 0);
        assert_eq!(st.timer(), 14);
        cara.on_data_succeeded(&mut st, 20.0, now);
        assert_eq!(st.rate(), 1);
    }

    #[test]
    fn test_increase_saturates_at_highest_rate() {
        let (cara, mut st, now) = station(2);
        for _ in 0..50 {
            cara.on_data_succeeded(&mut st, 20.0, now);
        }
        assert_eq!(st.rate(), 1);
    }

    #[test]
    fn test_rts_probe_after_failure() {
        let (cara, mut st, now) = station(8);
        assert!(!cara.needs_rts(&mut st, 100, false));
        assert!(cara.needs_rts(&mut st, 3000, true));

        cara.on_data_failed(&mut st, now);
        assert!(cara.needs_rts(&mut st, 100, false));

        cara.on_data_succeeded(&mut st, 20.0, now);
        assert!(!cara.needs_rts(&mut st, 100, false));
    }

    #[test]
    fn test_rts_and_final_callbacks_are_ignored() {
        let (cara, mut st, now) = station(8);
        cara.on_rts_failed(&mut st, now);
        cara.on_final_rts_failed(&mut st, now);
        cara.on_final_data_failed(&mut st, now);
        cara.on_rts_succeeded(&mut st, 10.0, now);
        assert_eq!((st.rate(), st.failed(), st.success(), st.timer()), (0, 0, 0, 0));
        assert_eq!(cara.rts_mode(&mut st, now), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rate_stays_in_catalog_and_streaks_exclusive(
                supported in 1usize..12,
                outcomes in proptest::collection::vec(any::<bool>(), 0..400),
            ) {
                let now = Instant::now();
                let cara = Cara::new(CaraConfig::default());
                let mut st = cara.create_station(supported, now);
                for ok in outcomes {
                    if ok {
                        cara.on_data_succeeded(&mut st, 20.0, now);
                    } else {
                        cara.on_data_failed(&mut st, now);
                    }
                    prop_assert!(st.rate() < supported);
                    prop_assert!(st.failed() == 0 || st.success() == 0);
                    prop_assert!(cara.data_mode(&mut st, 1500, now) < supported);
                }
            }
        }
    }
}
