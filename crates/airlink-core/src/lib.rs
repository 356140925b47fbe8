#![warn(missing_docs)]

//! airlink-core: foundational types and utilities.
//!
//! This crate provides the minimal set of core utilities shared across all layers:
//! - Configuration types
//! - Error handling
//! - Protocol constants
//! - The rate catalog contract and rate-index arithmetic
//! - Owned, cancellable timers
//!
//! Protocol-specific logic lives in specialized crates:
//! - `airlink-protocol`: block-ack window, agreements and fixed-size frame records
//! - `airlink-rate`: rate-adaptation algorithms
//! - `airlink-host`: per-station management, timer polling and events

/// Protocol constants shared across layers.
pub mod constants {
    /// Number of distinct sequence numbers (12-bit sequence space).
    pub const SEQUENCE_SPACE: u16 = 4096;
    /// Half of the sequence space; distances at or beyond this are "behind".
    pub const SEQUENCE_HALF_SPACE: u16 = 2048;
    /// Largest block-ack buffer size an agreement may announce.
    pub const MAX_BUFFER_SIZE: u16 = 1024;
    /// Block-ack buffer sizes must be a multiple of this value.
    pub const BUFFER_SIZE_GRANULARITY: u16 = 16;
    /// Window size used for an agreement that announced a buffer size of 0.
    pub const DEFAULT_BLOCK_ACK_WINDOW: u16 = 64;
    /// Number of 16-bit groups in a block-ack bitmap.
    pub const BITMAP_GROUPS: usize = 64;
    /// Number of traffic identifiers.
    pub const TID_COUNT: u8 = 16;
    /// Length of a time unit (TU) in microseconds.
    pub const TIME_UNIT_MICROS: u64 = 1024;
    /// Default RTS/CTS threshold in bytes.
    ///
    /// Frames larger than this are normally protected by an RTS/CTS exchange.
    pub const DEFAULT_RTS_CTS_THRESHOLD: u32 = 2346;
}

/// Rate catalog contract and rate-index arithmetic.
pub mod catalog;
/// Configuration options for the rate-adaptation algorithms and the host.
pub mod config;
/// Error types and results.
pub mod error;
/// Owned deadline timers.
pub mod timer;
