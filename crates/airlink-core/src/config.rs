use std::{default::Default, fmt, str::FromStr, time::Duration};

use crate::{
    catalog::RateIndex,
    constants::DEFAULT_RTS_CTS_THRESHOLD,
    error::{ErrorKind, InvalidArgumentKind, Result},
};

/// Rate-adaptation algorithm run for every station of a manager.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum RateAlgorithm {
    /// Fixed data and control modes.
    ConstantRate,
    /// Collision-aware rate adaptation (consecutive success/failure counting with RTS probing).
    Cara,
    /// Robust rate adaptation (windowed loss ratio against per-rate thresholds).
    Rraa,
    /// Credit-based periodic adaptation.
    Onoe,
    /// Auto rate fallback with fixed thresholds.
    Arf,
    /// Adaptive auto rate fallback (thresholds grow on failed probes).
    #[default]
    Aarf,
}

impl RateAlgorithm {
    /// Returns the configuration name of this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            RateAlgorithm::ConstantRate => "constant",
            RateAlgorithm::Cara => "cara",
            RateAlgorithm::Rraa => "rraa",
            RateAlgorithm::Onoe => "onoe",
            RateAlgorithm::Arf => "arf",
            RateAlgorithm::Aarf => "aarf",
        }
    }
}

impl fmt::Display for RateAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RateAlgorithm {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "constant" | "constant-rate" | "constantrate" => Ok(RateAlgorithm::ConstantRate),
            "cara" => Ok(RateAlgorithm::Cara),
            "rraa" => Ok(RateAlgorithm::Rraa),
            "onoe" => Ok(RateAlgorithm::Onoe),
            "arf" => Ok(RateAlgorithm::Arf),
            "aarf" => Ok(RateAlgorithm::Aarf),
            _ => Err(InvalidArgumentKind::UnknownAlgorithm(s.to_owned()).into()),
        }
    }
}

/// Fixed modes for [`RateAlgorithm::ConstantRate`].
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct ConstantRateConfig {
    /// Catalog index used for every data frame.
    pub data_mode: RateIndex,
    /// Catalog index used for every control frame.
    pub control_mode: RateIndex,
}

/// Thresholds for [`RateAlgorithm::Cara`].
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct CaraConfig {
    /// Failures since the last rate change after which RTS protection is forced.
    pub probe_threshold: u32,
    /// Consecutive failures that trigger a rate decrease.
    pub failure_threshold: u32,
    /// Consecutive successes that trigger a rate increase.
    pub success_threshold: u32,
    /// Outcomes since the last rate change after which a success triggers an increase.
    pub timeout: u32,
}

impl Default for CaraConfig {
    fn default() -> Self {
        Self { probe_threshold: 1, failure_threshold: 2, success_threshold: 10, timeout: 15 }
    }
}

/// Loss-ratio sentinel no ratio can fall below: "never raise".
pub const NEVER_RAISE: f64 = 0.0;
/// Loss-ratio sentinel no ratio can exceed: "never fall back".
pub const NEVER_FALL_BACK: f64 = 1.0;

/// Per-rate RRAA thresholds.
///
/// `pori` is the loss ratio below which a sender one rate lower moves up to
/// this rate; it has no meaning for the lowest rate. `pmtl` is the loss ratio
/// above which a sender one rate higher falls back to this rate; it has no
/// meaning for the highest rate.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct RraaThreshold {
    /// Evaluation window length in frames while transmitting at this rate.
    pub ewnd: usize,
    /// Opportunistic-raise probability.
    pub pori: Option<f64>,
    /// Multiple-loss probability.
    pub pmtl: Option<f64>,
}

/// Immutable RRAA threshold table, one entry per catalog rate in ascending order.
#[derive(Clone, Debug, PartialEq)]
pub struct RraaThresholds {
    entries: Vec<RraaThreshold>,
}

impl RraaThresholds {
    /// Creates a table from explicit entries.
    pub fn new(entries: Vec<RraaThreshold>) -> Self {
        Self { entries }
    }

    /// Table for the eight OFDM rates (6 to 54 Mb/s).
    pub fn ofdm() -> Self {
        const EWND: [usize; 8] = [6, 10, 20, 20, 40, 40, 40, 40];
        const PORI: [Option<f64>; 8] = [
            None,
            Some(0.5),
            Some(0.1434),
            Some(0.1861),
            Some(0.1325),
            Some(0.1681),
            Some(0.115),
            Some(0.047),
        ];
        const PMTL: [Option<f64>; 8] = [
            Some(0.3564),
            Some(0.3552),
            Some(0.3116),
            Some(0.2653),
            Some(0.3352),
            Some(0.23),
            Some(0.094),
            None,
        ];
        Self::new(
            (0..8)
                .map(|i| RraaThreshold { ewnd: EWND[i], pori: PORI[i], pmtl: PMTL[i] })
                .collect(),
        )
    }

    /// Table with the same thresholds at every rate of a `supported`-rate catalog.
    pub fn uniform(supported: usize, ewnd: usize, pori: f64, pmtl: f64) -> Self {
        Self::new(
            (0..supported)
                .map(|i| RraaThreshold {
                    ewnd,
                    pori: (i > 0).then_some(pori),
                    pmtl: (i + 1 < supported).then_some(pmtl),
                })
                .collect(),
        )
    }

    /// Number of rates covered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table covers no rate.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluation window length at `rate`.
    pub fn ewnd(&self, rate: RateIndex) -> usize {
        self.entries.get(rate).map(|e| e.ewnd).unwrap_or(1).max(1)
    }

    /// Opportunistic-raise probability of `rate`; [`NEVER_RAISE`] at the lowest rate.
    pub fn pori(&self, rate: RateIndex) -> f64 {
        if rate == 0 {
            return NEVER_RAISE;
        }
        self.entries.get(rate).and_then(|e| e.pori).unwrap_or(NEVER_RAISE)
    }

    /// Multiple-loss probability of `rate`; [`NEVER_FALL_BACK`] at the highest rate.
    pub fn pmtl(&self, rate: RateIndex) -> f64 {
        if rate + 1 >= self.entries.len() {
            return NEVER_FALL_BACK;
        }
        self.entries.get(rate).and_then(|e| e.pmtl).unwrap_or(NEVER_FALL_BACK)
    }

    /// Checks the table against a catalog of `supported` rates.
    ///
    /// Evaluation windows must not shrink as the rate goes up. The loss
    /// thresholds are only range-checked: the measured OFDM table is not
    /// monotonic in `pori` or `pmtl`.
    pub fn validate(&self, supported: usize) -> Result<()> {
        if self.entries.len() != supported {
            return Err(InvalidArgumentKind::ThresholdTable {
                expected: supported,
                actual: self.entries.len(),
            }
            .into());
        }
        for entry in &self.entries {
            if entry.ewnd == 0 {
                return Err(InvalidArgumentKind::EvaluationWindow(entry.ewnd).into());
            }
            for p in [entry.pori, entry.pmtl].into_iter().flatten() {
                if !(0.0..=1.0).contains(&p) {
                    return Err(InvalidArgumentKind::Probability(p).into());
                }
            }
        }
        if let Some(rate) = self.entries.windows(2).position(|pair| pair[1].ewnd < pair[0].ewnd) {
            return Err(InvalidArgumentKind::EvaluationWindowOrder(rate + 1).into());
        }
        Ok(())
    }
}

impl Default for RraaThresholds {
    fn default() -> Self {
        Self::ofdm()
    }
}

/// Options for [`RateAlgorithm::Rraa`].
#[derive(Clone, Debug, PartialEq)]
pub struct RraaConfig {
    /// Run RRAA-BASIC: no adaptive RTS.
    pub basic: bool,
    /// Maximum age of an evaluation window before it is closed.
    pub timeout: Duration,
    /// Per-rate thresholds.
    pub thresholds: RraaThresholds,
}

impl Default for RraaConfig {
    fn default() -> Self {
        Self { basic: false, timeout: Duration::from_millis(50), thresholds: RraaThresholds::ofdm() }
    }
}

/// Options for [`RateAlgorithm::Onoe`].
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct OnoeConfig {
    /// Period between rate re-evaluations.
    pub update_period: Duration,
    /// Credits needed before the rate is raised.
    pub raise_threshold: u32,
    /// Retry percentage below which a clean period earns a credit.
    pub add_credit_threshold: u32,
}

impl Default for OnoeConfig {
    fn default() -> Self {
        Self { update_period: Duration::from_secs(1), raise_threshold: 10, add_credit_threshold: 10 }
    }
}

/// Options for [`RateAlgorithm::Aarf`] and [`RateAlgorithm::Arf`].
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct AarfConfig {
    /// Multiplier applied to the success threshold after a failed probe.
    pub success_k: f64,
    /// Multiplier applied to the timer threshold after a failed probe.
    pub timer_k: f64,
    /// Upper bound of the success threshold.
    pub max_success_threshold: u32,
    /// Initial and floor value of the success threshold.
    pub min_success_threshold: u32,
    /// Initial value of the timer threshold.
    pub min_timer_threshold: u32,
}

impl AarfConfig {
    /// Fixed thresholds: plain ARF behavior.
    pub fn arf() -> Self {
        Self {
            success_k: 1.0,
            timer_k: 1.0,
            max_success_threshold: 10,
            min_success_threshold: 10,
            min_timer_threshold: 15,
        }
    }
}

impl Default for AarfConfig {
    fn default() -> Self {
        Self {
            success_k: 2.0,
            timer_k: 2.0,
            max_success_threshold: 60,
            min_success_threshold: 10,
            min_timer_threshold: 15,
        }
    }
}

#[derive(Clone, Debug)]
/// Configuration options to tune rate adaptation and block-ack handling.
pub struct Config {
    /// Algorithm run for every station.
    pub algorithm: RateAlgorithm,
    /// Frames larger than this many bytes normally need RTS protection.
    pub rts_cts_threshold: u32,
    /// Options for the constant-rate algorithm.
    pub constant_rate: ConstantRateConfig,
    /// Options for CARA.
    pub cara: CaraConfig,
    /// Options for RRAA.
    pub rraa: RraaConfig,
    /// Options for Onoe.
    pub onoe: OnoeConfig,
    /// Options for AARF.
    pub aarf: AarfConfig,
}

impl Config {
    /// Default configuration running `algorithm`.
    pub fn with_algorithm(algorithm: RateAlgorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: RateAlgorithm::default(),
            rts_cts_threshold: DEFAULT_RTS_CTS_THRESHOLD,
            constant_rate: ConstantRateConfig::default(),
            cara: CaraConfig::default(),
            rraa: RraaConfig::default(),
            onoe: OnoeConfig::default(),
            aarf: AarfConfig::default(),
        }
    }
}
