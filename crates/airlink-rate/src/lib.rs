#![warn(missing_docs)]

//! airlink-rate: per-station rate-adaptation state machines.
//!
//! Every algorithm implements [`RateControl`]: it creates an opaque station
//! state, folds transmission outcomes into it and answers mode queries from
//! it. Algorithms never share state; the only common logic is the saturating
//! rate arithmetic in `airlink_core::catalog`.

/// ARF and AARF.
pub mod aarf;
/// Closed set of algorithms selected from configuration.
pub mod any;
/// CARA: consecutive-outcome counting with RTS probing.
pub mod cara;
/// Fixed data and control modes.
pub mod constant_rate;
/// Credit-based periodic adaptation.
pub mod onoe;
/// The contract every algorithm implements.
pub mod rate_control;
/// RRAA: windowed loss ratio with adaptive RTS.
pub mod rraa;

pub use aarf::{Aarf, AarfStation};
pub use any::{AnyRateControl, AnyStation};
pub use cara::{Cara, CaraStation};
pub use constant_rate::{ConstantRate, ConstantRateStation};
pub use onoe::{Onoe, OnoeStation};
pub use rate_control::RateControl;
pub use rraa::{Rraa, RraaStation};
