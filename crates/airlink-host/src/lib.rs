#![warn(missing_docs)]

//! airlink-host: station manager over the rate-adaptation and block-ack layers.

/// Events emitted by the station manager.
pub mod event_types;
/// Per-station state store, block-ack agreements and timer polling.
pub mod station_manager;

pub use event_types::StationEvent;
pub use station_manager::StationManager;
