use std::time::Instant;

use airlink_core::{
    catalog::RateIndex,
    config::ConstantRateConfig,
    error::{InvalidArgumentKind, Result},
};

use crate::rate_control::RateControl;

/// Always uses the configured data and control modes.
#[derive(Debug, Clone)]
pub struct ConstantRate {
    config: ConstantRateConfig,
}

/// Station state for [`ConstantRate`]. Nothing changes after creation.
#[derive(Debug, Clone)]
pub struct ConstantRateStation {
    supported: usize,
}

impl ConstantRateStation {
    /// Number of rates in the station's catalog.
    pub fn supported(&self) -> usize {
        self.supported
    }
}

impl ConstantRate {
    /// Creates the algorithm.
    pub fn new(config: ConstantRateConfig) -> Self {
        Self { config }
    }
}

impl RateControl for ConstantRate {
    type Station = ConstantRateStation;

    fn validate(&self, supported: usize) -> Result<()> {
        for index in [self.config.data_mode, self.config.control_mode] {
            if index >= supported {
                return Err(InvalidArgumentKind::RateIndex { index, supported }.into());
            }
        }
        Ok(())
    }

    fn create_station(&self, supported: usize, _time: Instant) -> ConstantRateStation {
        ConstantRateStation { supported }
    }

    fn on_data_failed(&self, _station: &mut ConstantRateStation, _time: Instant) {}

    fn on_data_succeeded(&self, _station: &mut ConstantRateStation, _ack_snr: f64, _time: Instant) {}

    fn data_mode(&self, _station: &mut ConstantRateStation, _frame_size: u32, _time: Instant) -> RateIndex {
        self.config.data_mode
    }

    fn rts_mode(&self, _station: &mut ConstantRateStation, _time: Instant) -> RateIndex {
        self.config.control_mode
    }

    fn current_rate(&self, _station: &ConstantRateStation) -> RateIndex {
        self.config.data_mode
    }
}
