//! Events pushed through the station manager's event receiver.

use airlink_core::catalog::RateIndex;

/// Something the station manager wants the MAC layer to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationEvent<P> {
    /// State was created for a station.
    Added(P),
    /// A station and its agreements were forgotten.
    Removed(P),
    /// The base rate of a station moved.
    RateChanged {
        /// Station whose rate moved.
        peer: P,
        /// Previous rate index.
        from: RateIndex,
        /// New rate index.
        to: RateIndex,
    },
    /// A block-ack agreement saw no traffic for its timeout and was torn down.
    AgreementTimedOut {
        /// Originator of the agreement.
        peer: P,
        /// Traffic identifier of the agreement.
        tid: u8,
    },
}
