use std::time::Instant;

use airlink_core::{
    catalog::RateIndex,
    config::{AarfConfig, Config, RateAlgorithm},
    error::Result,
};
use tracing::error;

use crate::{
    aarf::{Aarf, AarfStation},
    cara::{Cara, CaraStation},
    constant_rate::{ConstantRate, ConstantRateStation},
    onoe::{Onoe, OnoeStation},
    rate_control::RateControl,
    rraa::{Rraa, RraaStation},
};

/// One of the built-in algorithms, chosen when the host is configured.
#[derive(Debug, Clone)]
pub enum AnyRateControl {
    /// Fixed modes.
    ConstantRate(ConstantRate),
    /// CARA.
    Cara(Cara),
    /// RRAA.
    Rraa(Rraa),
    /// Onoe.
    Onoe(Onoe),
    /// ARF or AARF, depending on the thresholds.
    Aarf(Aarf),
}

/// Station state of an [`AnyRateControl`].
#[derive(Debug, Clone)]
pub enum AnyStation {
    /// State for [`AnyRateControl::ConstantRate`].
    ConstantRate(ConstantRateStation),
    /// State for [`AnyRateControl::Cara`].
    Cara(CaraStation),
    /// State for [`AnyRateControl::Rraa`].
    Rraa(RraaStation),
    /// State for [`AnyRateControl::Onoe`].
    Onoe(OnoeStation),
    /// State for [`AnyRateControl::Aarf`].
    Aarf(AarfStation),
}

impl AnyRateControl {
    /// Builds the algorithm `config.algorithm` names, with its options from `config`.
    pub fn from_config(config: &Config) -> Self {
        match config.algorithm {
            RateAlgorithm::ConstantRate => AnyRateControl::ConstantRate(ConstantRate::new(config.constant_rate)),
            RateAlgorithm::Cara => AnyRateControl::Cara(Cara::new(config.cara)),
            RateAlgorithm::Rraa => AnyRateControl::Rraa(Rraa::new(config.rraa.clone())),
            RateAlgorithm::Onoe => AnyRateControl::Onoe(Onoe::new(config.onoe)),
            RateAlgorithm::Arf => AnyRateControl::Aarf(Aarf::new(AarfConfig::arf())),
            RateAlgorithm::Aarf => AnyRateControl::Aarf(Aarf::new(config.aarf)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyRateControl::ConstantRate(_) => "constant",
            AnyRateControl::Cara(_) => "cara",
            AnyRateControl::Rraa(_) => "rraa",
            AnyRateControl::Onoe(_) => "onoe",
            AnyRateControl::Aarf(_) => "aarf",
        }
    }

    fn mismatch(&self, station: &AnyStation) {
        error!("station state {:?} does not belong to the {} algorithm", station, self.name());
    }
}

/// Forwards a call to the matching algorithm and station variants.
///
/// A station created by a different algorithm is logged and the call yields `$fallback`.
macro_rules! dispatch {
    ($self:ident, $station:ident, $fallback:expr, |$rc:ident, $st:ident| $call:expr) => {
        match ($self, $station) {
            (AnyRateControl::ConstantRate($rc), AnyStation::ConstantRate($st)) => $call,
            (AnyRateControl::Cara($rc), AnyStation::Cara($st)) => $call,
            (AnyRateControl::Rraa($rc), AnyStation::Rraa($st)) => $call,
            (AnyRateControl::Onoe($rc), AnyStation::Onoe($st)) => $call,
            (AnyRateControl::Aarf($rc), AnyStation::Aarf($st)) => $call,
            (rc, st) => {
                rc.mismatch(st);
                $fallback
            }
        }
    };
}

impl RateControl for AnyRateControl {
    type Station = AnyStation;

    fn validate(&self, supported: usize) -> Result<()> {
        match self {
            AnyRateControl::ConstantRate(rc) => rc.validate(supported),
            AnyRateControl::Cara(rc) => rc.validate(supported),
            AnyRateControl::Rraa(rc) => rc.validate(supported),
            AnyRateControl::Onoe(rc) => rc.validate(supported),
            AnyRateControl::Aarf(rc) => rc.validate(supported),
        }
    }

    fn create_station(&self, supported: usize, time: Instant) -> AnyStation {
        match self {
            AnyRateControl::ConstantRate(rc) => AnyStation::ConstantRate(rc.create_station(supported, time)),
            AnyRateControl::Cara(rc) => AnyStation::Cara(rc.create_station(supported, time)),
            AnyRateControl::Rraa(rc) => AnyStation::Rraa(rc.create_station(supported, time)),
            AnyRateControl::Onoe(rc) => AnyStation::Onoe(rc.create_station(supported, time)),
            AnyRateControl::Aarf(rc) => AnyStation::Aarf(rc.create_station(supported, time)),
        }
    }

    fn on_data_failed(&self, station: &mut AnyStation, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_data_failed(st, time))
    }

    fn on_data_succeeded(&self, station: &mut AnyStation, ack_snr: f64, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_data_succeeded(st, ack_snr, time))
    }

    fn on_rts_failed(&self, station: &mut AnyStation, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_rts_failed(st, time))
    }

    fn on_rts_succeeded(&self, station: &mut AnyStation, cts_snr: f64, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_rts_succeeded(st, cts_snr, time))
    }

    fn on_final_data_failed(&self, station: &mut AnyStation, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_final_data_failed(st, time))
    }

    fn on_final_rts_failed(&self, station: &mut AnyStation, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_final_rts_failed(st, time))
    }

    fn data_mode(&self, station: &mut AnyStation, frame_size: u32, time: Instant) -> RateIndex {
        dispatch!(self, station, 0, |rc, st| rc.data_mode(st, frame_size, time))
    }

    fn rts_mode(&self, station: &mut AnyStation, time: Instant) -> RateIndex {
        dispatch!(self, station, 0, |rc, st| rc.rts_mode(st, time))
    }

    fn needs_rts(&self, station: &mut AnyStation, frame_size: u32, normally_required: bool) -> bool {
        dispatch!(self, station, normally_required, |rc, st| rc.needs_rts(st, frame_size, normally_required))
    }

    fn current_rate(&self, station: &AnyStation) -> RateIndex {
        dispatch!(self, station, 0, |rc, st| rc.current_rate(st))
    }

    fn next_deadline(&self, station: &AnyStation) -> Option<Instant> {
        dispatch!(self, station, None, |rc, st| rc.next_deadline(st))
    }

    fn on_timer(&self, station: &mut AnyStation, time: Instant) {
        dispatch!(self, station, (), |rc, st| rc.on_timer(st, time))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_factory_picks_configured_algorithm() {
        let now = Instant::now();
        for (algorithm, expected) in [
            (RateAlgorithm::ConstantRate, "constant"),
            (RateAlgorithm::Cara, "cara"),
            (RateAlgorithm::Rraa, "rraa"),
            (RateAlgorithm::Onoe, "onoe"),
            (RateAlgorithm::Arf, "aarf"),
            (RateAlgorithm::Aarf, "aarf"),
        ] {
            let rc = AnyRateControl::from_config(&Config::with_algorithm(algorithm));
            assert_eq!(rc.name(), expected);
            rc.validate(8).unwrap();
            let mut st = rc.create_station(8, now);
            assert_eq!(rc.data_mode(&mut st, 1500, now), 0);
            assert_eq!(rc.rts_mode(&mut st, now), 0);
        }
    }

    #[test]
    fn test_arf_uses_fixed_thresholds() {
        let now = Instant::now();
        let rc = AnyRateControl::from_config(&Config::with_algorithm(RateAlgorithm::Arf));
        let mut st = rc.create_station(8, now);
        for _ in 0..10 {
            rc.on_data_succeeded(&mut st, 20.0, now);
        }
        rc.on_data_failed(&mut st, now);
        match &st {
            AnyStation::Aarf(inner) => assert_eq!(inner.success_threshold(), 10),
            other => panic!("unexpected station {:?}", other),
        }
    }

    #[test]
    fn test_only_onoe_has_a_deadline() {
        let now = Instant::now();
        let onoe = AnyRateControl::from_config(&Config::with_algorithm(RateAlgorithm::Onoe));
        let st = onoe.create_station(8, now);
        assert_eq!(onoe.next_deadline(&st), Some(now + Duration::from_secs(1)));

        let cara = AnyRateControl::from_config(&Config::with_algorithm(RateAlgorithm::Cara));
        let st = cara.create_station(8, now);
        assert_eq!(cara.next_deadline(&st), None);
    }

    #[test]
    fn test_mismatched_station_is_a_no_op() {
        let now = Instant::now();
        let cara = AnyRateControl::from_config(&Config::with_algorithm(RateAlgorithm::Cara));
        let onoe = AnyRateControl::from_config(&Config::with_algorithm(RateAlgorithm::Onoe));
        let mut st = onoe.create_station(8, now);

        cara.on_data_failed(&mut st, now);
        assert_eq!(cara.data_mode(&mut st, 1500, now), 0);
        assert!(cara.needs_rts(&mut st, 100, true));
        assert_eq!(cara.next_deadline(&st), None);
    }
}
