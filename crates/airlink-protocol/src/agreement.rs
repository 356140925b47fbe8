//! Block-ack agreement record.
//!
//! One agreement exists per (peer, TID) pair. It carries the negotiated
//! parameters and the inactivity timer that tears the agreement down when no
//! traffic flows for `timeout` time units.

use std::time::{Duration, Instant};

use airlink_core::{
    constants::{BUFFER_SIZE_GRANULARITY, MAX_BUFFER_SIZE, SEQUENCE_SPACE, TID_COUNT, TIME_UNIT_MICROS},
    error::{InvalidArgumentKind, Result},
    timer::Timer,
};

use crate::sequence::SequenceNumber;

/// Acknowledgement policy negotiated for an agreement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BlockAckPolicy {
    /// The block-ack response follows the request immediately.
    #[default]
    Immediate,
    /// The block-ack response is sent later in its own exchange.
    Delayed,
}

/// Negotiated block-ack parameters for one peer and traffic identifier.
#[derive(Clone, Debug)]
pub struct BlockAckAgreement<P> {
    peer: P,
    tid: u8,
    buffer_size: u16,
    timeout: u16,
    starting_sequence: SequenceNumber,
    amsdu_supported: bool,
    policy: BlockAckPolicy,
    inactivity_timer: Timer,
}

impl<P> BlockAckAgreement<P> {
    /// Creates an agreement with `peer` for traffic identifier `tid`.
    ///
    /// Starts with buffer size 0, starting sequence 0, no inactivity timeout,
    /// immediate policy and no A-MSDU support.
    pub fn new(peer: P, tid: u8) -> Result<Self> {
        if tid >= TID_COUNT {
            return Err(InvalidArgumentKind::TrafficIdentifier(tid).into());
        }
        Ok(Self {
            peer,
            tid,
            buffer_size: 0,
            timeout: 0,
            starting_sequence: 0,
            amsdu_supported: false,
            policy: BlockAckPolicy::Immediate,
            inactivity_timer: Timer::new(),
        })
    }

    /// Peer the agreement was made with.
    pub fn peer(&self) -> &P {
        &self.peer
    }

    /// Traffic identifier.
    pub fn tid(&self) -> u8 {
        self.tid
    }

    /// Sets the buffer size. It must be a multiple of 16 and at most 1024; 0 is accepted.
    pub fn set_buffer_size(&mut self, buffer_size: u16) -> Result<()> {
        if buffer_size > MAX_BUFFER_SIZE || buffer_size % BUFFER_SIZE_GRANULARITY != 0 {
            return Err(InvalidArgumentKind::BufferSize(buffer_size).into());
        }
        self.buffer_size = buffer_size;
        Ok(())
    }

    /// Buffer size.
    pub fn buffer_size(&self) -> u16 {
        self.buffer_size
    }

    /// Sets the starting sequence number. It must lie in the 12-bit sequence space.
    pub fn set_starting_sequence(&mut self, seq: u16) -> Result<()> {
        if seq >= SEQUENCE_SPACE {
            return Err(InvalidArgumentKind::StartingSequence(seq).into());
        }
        self.starting_sequence = seq;
        Ok(())
    }

    /// Starting sequence number.
    pub fn starting_sequence(&self) -> SequenceNumber {
        self.starting_sequence
    }

    /// Starting sequence control field.
    ///
    /// Kept bit-exact with the historical packing, which ORs in `0xfff0`
    /// and therefore always yields `0xfff0`.
    pub fn starting_sequence_control(&self) -> u16 {
        (self.starting_sequence << 4) | 0xfff0
    }

    /// Sets the inactivity timeout in time units. 0 disables the timer.
    pub fn set_timeout(&mut self, timeout: u16) {
        self.timeout = timeout;
        if timeout == 0 {
            self.inactivity_timer.cancel();
        }
    }

    /// Inactivity timeout in time units.
    pub fn timeout(&self) -> u16 {
        self.timeout
    }

    /// Inactivity timeout as a duration, or `None` when disabled.
    pub fn timeout_duration(&self) -> Option<Duration> {
        match self.timeout {
            0 => None,
            tus => Some(Duration::from_micros(u64::from(tus) * TIME_UNIT_MICROS)),
        }
    }

    /// Selects the immediate acknowledgement policy.
    pub fn set_immediate_block_ack(&mut self) {
        self.policy = BlockAckPolicy::Immediate;
    }

    /// Selects the delayed acknowledgement policy.
    pub fn set_delayed_block_ack(&mut self) {
        self.policy = BlockAckPolicy::Delayed;
    }

    /// Returns whether the policy is immediate.
    pub fn is_immediate_block_ack(&self) -> bool {
        self.policy == BlockAckPolicy::Immediate
    }

    /// Acknowledgement policy.
    pub fn policy(&self) -> BlockAckPolicy {
        self.policy
    }

    /// Sets whether A-MSDUs may be carried under this agreement.
    pub fn set_amsdu_support(&mut self, supported: bool) {
        self.amsdu_supported = supported;
    }

    /// Returns whether A-MSDUs may be carried under this agreement.
    pub fn is_amsdu_supported(&self) -> bool {
        self.amsdu_supported
    }

    /// Re-arms the inactivity timer from `now`. Does nothing when the timeout is disabled.
    pub fn restart_inactivity_timer(&mut self, now: Instant) {
        if let Some(timeout) = self.timeout_duration() {
            self.inactivity_timer.schedule_in(now, timeout);
        }
    }

    /// Disarms the inactivity timer.
    pub fn cancel_inactivity_timer(&mut self) {
        self.inactivity_timer.cancel();
    }

    /// Returns whether the inactivity timer is armed and has run out at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.inactivity_timer.is_due(now)
    }

    /// Deadline of the inactivity timer, if armed.
    pub fn inactivity_deadline(&self) -> Option<Instant> {
        self.inactivity_timer.deadline()
    }
}
