//! Credit-based periodic rate adaptation.
//!
//! Outcomes only feed period accumulators. Once per `update_period` the
//! accumulated retry and error counts decide whether the rate steps down,
//! earns a credit or loses one; `raise_threshold` credits step the rate up.

use std::time::Instant;

use airlink_core::{
    catalog::{decrease, decrease_by, increase, RateIndex},
    config::OnoeConfig,
    timer::Timer,
};
use tracing::{debug, trace};

use crate::rate_control::RateControl;

/// Frames a period needs before its statistics are trusted.
const MIN_FRAMES_PER_PERIOD: u32 = 10;

/// Onoe algorithm.
#[derive(Debug, Clone)]
pub struct Onoe {
    config: OnoeConfig,
}

/// Per-station Onoe state.
///
/// Owns its periodic update timer; dropping the station drops the timer.
#[derive(Debug, Clone)]
pub struct OnoeStation {
    supported: usize,
    /// RTS retries of the frame in flight
    short_retry: u32,
    /// Data retries of the frame in flight
    long_retry: u32,
    tx_ok: u32,
    tx_err: u32,
    tx_retr: u32,
    credit: u32,
    rate: RateIndex,
    update_timer: Timer,
}

impl OnoeStation {
    /// Current base rate index.
    pub fn rate(&self) -> RateIndex {
        self.rate
    }

    /// Accumulated credit.
    pub fn credit(&self) -> u32 {
        self.credit
    }

    /// Next periodic update.
    pub fn next_update(&self) -> Option<Instant> {
        self.update_timer.deadline()
    }

    fn fold_retries(&mut self) {
        self.tx_retr += self.short_retry + self.long_retry;
        self.short_retry = 0;
        self.long_retry = 0;
    }
}

impl Onoe {
    /// Creates the algorithm.
    pub fn new(config: OnoeConfig) -> Self {
        Self { config }
    }

    fn update_mode(&self, station: &mut OnoeStation) {
        let enough = station.tx_ok + station.tx_err >= MIN_FRAMES_PER_PERIOD;
        let previous = station.rate;

        // Nothing got through, or on average every frame needed a retry.
        let down = (station.tx_err > 0 && station.tx_ok == 0) || (enough && station.tx_ok < station.tx_retr);
        let earn_credit = enough
            && station.tx_err == 0
            && station.tx_retr < station.tx_ok * self.config.add_credit_threshold / 100;

        if down {
            station.rate = decrease(station.rate);
            station.credit = 0;
        } else if earn_credit {
            station.credit += 1;
            if station.credit >= self.config.raise_threshold {
                station.credit = 0;
                station.rate = increase(station.rate, station.supported);
            }
        } else if enough && station.credit > 0 {
            station.credit -= 1;
        }

        trace!(
            "onoe period: ok={} err={} retr={} credit={}",
            station.tx_ok,
            station.tx_err,
            station.tx_retr,
            station.credit
        );
        if previous != station.rate {
            debug!("onoe rate {} -> {}", previous, station.rate);
        }

        station.tx_ok = 0;
        station.tx_err = 0;
        station.tx_retr = 0;
    }
}

impl RateControl for Onoe {
    type Station = OnoeStation;

    fn create_station(&self, supported: usize, time: Instant) -> OnoeStation {
        OnoeStation {
            supported,
            short_retry: 0,
            long_retry: 0,
            tx_ok: 0,
            tx_err: 0,
            tx_retr: 0,
            credit: 0,
            rate: 0,
            update_timer: Timer::armed(time + self.config.update_period),
        }
    }

    fn on_data_failed(&self, station: &mut OnoeStation, _time: Instant) {
        station.long_retry += 1;
    }

    fn on_data_succeeded(&self, station: &mut OnoeStation, _ack_snr: f64, _time: Instant) {
        station.fold_retries();
        station.tx_ok += 1;
    }

    fn on_rts_failed(&self, station: &mut OnoeStation, _time: Instant) {
        station.short_retry += 1;
    }

    fn on_final_data_failed(&self, station: &mut OnoeStation, _time: Instant) {
        station.fold_retries();
        station.tx_err += 1;
    }

    fn on_final_rts_failed(&self, station: &mut OnoeStation, _time: Instant) {
        station.fold_retries();
        station.tx_err += 1;
    }

    fn data_mode(&self, station: &mut OnoeStation, _frame_size: u32, time: Instant) -> RateIndex {
        self.on_timer(station, time);
        let steps = match station.long_retry {
            0..=3 => 0,
            4..=5 => 1,
            6..=7 => 2,
            _ => 3,
        };
        decrease_by(station.rate, steps)
    }

    fn rts_mode(&self, station: &mut OnoeStation, time: Instant) -> RateIndex {
        self.on_timer(station, time);
        0
    }

    fn current_rate(&self, station: &OnoeStation) -> RateIndex {
        station.rate
    }

    fn next_deadline(&self, station: &OnoeStation) -> Option<Instant> {
        station.update_timer.deadline()
    }

    fn on_timer(&self, station: &mut OnoeStation, time: Instant) {
        if station.update_timer.fire(time) {
            self.update_mode(station);
            station.update_timer.schedule_in(time, self.config.update_period);
        }
    }
}
