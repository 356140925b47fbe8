//! Error types shared by every airlink crate.
//!
//! Contract violations by the caller (out-of-range sequence numbers, buffer
//! sizes that are not a window multiple, rate indices outside the catalog)
//! are reported as [`ErrorKind::InvalidArgument`]. Saturating a rate at the
//! edge of the catalog is normal operation and never an error.

use std::{io, result};

/// Convenience alias used throughout the workspace.
pub type Result<T> = result::Result<T, ErrorKind>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A caller supplied a value outside its documented domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentKind),

    /// A block-ack operation named a (peer, TID) pair with no agreement.
    #[error("no block-ack agreement for this peer and TID")]
    UnknownAgreement,

    /// Reading or writing a serialized record failed.
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
}

/// Details for [`ErrorKind::InvalidArgument`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidArgumentKind {
    /// Buffer size above 1024 or not a multiple of 16.
    #[error("block-ack buffer size {0} must be a multiple of 16 and at most 1024")]
    BufferSize(u16),

    /// Starting sequence number outside the 12-bit sequence space.
    #[error("starting sequence {0} is outside the 12-bit sequence space")]
    StartingSequence(u16),

    /// Received sequence number outside the 12-bit sequence space.
    #[error("sequence number {0} is outside the 12-bit sequence space")]
    SequenceNumber(u16),

    /// A configured rate index does not exist in the station's catalog.
    #[error("rate index {index} is outside a catalog of {supported} rates")]
    RateIndex {
        /// The offending index.
        index: usize,
        /// Number of rates the catalog holds.
        supported: usize,
    },

    /// The catalog for a station holds no rates at all.
    #[error("rate catalog is empty")]
    EmptyCatalog,

    /// A threshold table does not cover the catalog it is used with.
    #[error("threshold table has {actual} entries, catalog has {expected} rates")]
    ThresholdTable {
        /// Number of rates in the catalog.
        expected: usize,
        /// Number of entries in the table.
        actual: usize,
    },

    /// A probability outside `[0, 1]`.
    #[error("probability {0} is outside [0, 1]")]
    Probability(f64),

    /// An evaluation window of zero frames.
    #[error("evaluation window of {0} frames")]
    EvaluationWindow(usize),

    /// An evaluation window shorter than the one of the rate below it.
    #[error("evaluation window at rate {0} is shorter than at the rate below")]
    EvaluationWindowOrder(usize),

    /// Traffic identifier above 15.
    #[error("traffic identifier {0} is outside 0..16")]
    TrafficIdentifier(u8),

    /// A rate-adaptation algorithm name that is not recognized.
    #[error("unknown rate-adaptation algorithm {0:?}")]
    UnknownAlgorithm(String),
}

impl ErrorKind {
    /// Returns true if this is an [`ErrorKind::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ErrorKind::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_from_kind() {
        let err: ErrorKind = InvalidArgumentKind::BufferSize(17).into();
        assert!(err.is_invalid_argument());
        assert_eq!(
            err.to_string(),
            "invalid argument: block-ack buffer size 17 must be a multiple of 16 and at most 1024"
        );
    }

    #[test]
    fn test_io_error_is_not_invalid_argument() {
        let err: ErrorKind = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert!(!err.is_invalid_argument());
    }
}
