#![warn(missing_docs)]

//! airlink-protocol: block-ack state and fixed-size frame records.

/// 6-byte hardware addresses.
pub mod address;
/// Block-ack agreement record.
pub mod agreement;
/// A-MSDU subframe header record.
pub mod amsdu;
/// Block-ack response bitmap.
pub mod block_ack_bitmap;
/// Sliding block-ack window tracker.
pub mod block_ack_window;
/// Capability information record.
pub mod capability;
/// Fixed-size record serialization.
pub mod record;
/// 12-bit sequence number arithmetic.
pub mod sequence;
/// Status code record.
pub mod status_code;

pub use address::MacAddress;
pub use agreement::{BlockAckAgreement, BlockAckPolicy};
pub use amsdu::AmsduSubframeHeader;
pub use block_ack_bitmap::BlockAckBitmap;
pub use block_ack_window::BlockAckWindow;
pub use capability::{CapabilityFlag, CapabilityInformation};
pub use record::WireRecord;
pub use sequence::SequenceNumber;
pub use status_code::StatusCode;
