#![warn(missing_docs)]

//! Airlink: a small public API facade for the workspace.
//!
//! This crate re-exports the types a MAC layer needs to pick transmission
//! rates and keep block-ack state for its peers:
//!
//! - Station manager and events (`StationManager`, `StationEvent`)
//! - Rate-adaptation algorithms (`RateControl`, `AnyRateControl`, ...)
//! - Block-ack window, bitmap and agreement records
//! - Fixed-size management records (`CapabilityInformation`, `StatusCode`, ...)
//! - Core configuration (`Config`, `RateAlgorithm`)
//!
//! Example
//! ```ignore
//! use std::time::Instant;
//! use airlink::{Config, MacAddress, RateAlgorithm, StaticRateCatalog, StationManager};
//!
//! let config = Config::with_algorithm(RateAlgorithm::Aarf);
//! let mut manager = StationManager::new(config, StaticRateCatalog::ofdm());
//! let peer = MacAddress::new([0x02, 0, 0, 0, 0, 1]);
//!
//! let now = Instant::now();
//! let mode = manager.data_mode(&peer, 1500, now).unwrap();
//! // ... transmit at `mode` ...
//! manager.report_data_ok(&peer, 20.0, now).unwrap();
//! manager.poll(now);
//! ```

// Core config, errors and rate catalog
pub use airlink_core::{
    catalog::{RateCatalog, RateIndex, StaticRateCatalog, WifiMode, OFDM_RATES},
    config::{
        AarfConfig, CaraConfig, Config, ConstantRateConfig, OnoeConfig, RateAlgorithm, RraaConfig,
        RraaThresholds,
    },
    error::{ErrorKind, Result},
    timer::Timer,
};
// Host: per-station state, agreements and events
pub use airlink_host::{StationEvent, StationManager};
// Protocol: block-ack state and wire records
pub use airlink_protocol::{
    AmsduSubframeHeader, BlockAckAgreement, BlockAckBitmap, BlockAckPolicy, BlockAckWindow,
    CapabilityFlag, CapabilityInformation, MacAddress, SequenceNumber, StatusCode, WireRecord,
};
// Rate adaptation
pub use airlink_rate::{Aarf, AnyRateControl, AnyStation, Cara, ConstantRate, Onoe, RateControl, Rraa};

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        BlockAckAgreement, BlockAckBitmap, Config, MacAddress, RateAlgorithm, RateCatalog,
        RateControl, StaticRateCatalog, StationEvent, StationManager, WifiMode, WireRecord,
    };
}
