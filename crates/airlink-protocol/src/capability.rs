//! Capability information field.
//!
//! Two bytes, little-endian, one bit per capability.

use std::io::{Read, Write};

use airlink_core::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::record::WireRecord;

/// Individual capability bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapabilityFlag {
    /// Infrastructure BSS.
    Ess = 0,
    /// Independent (ad hoc) BSS.
    Ibss = 1,
    /// CF-pollable.
    CfPollable = 2,
    /// CF-poll request.
    CfPollRequest = 3,
    /// Privacy required.
    Privacy = 4,
    /// Short preamble.
    ShortPreamble = 5,
    /// PBCC modulation.
    Pbcc = 6,
    /// Channel agility.
    ChannelAgility = 7,
    /// Spectrum management.
    SpectrumManagement = 8,
    /// QoS.
    Qos = 9,
    /// Short slot time.
    ShortSlotTime = 10,
    /// Automatic power-save delivery.
    Apsd = 11,
    /// Radio measurement.
    RadioMeasurement = 12,
    /// DSSS-OFDM.
    DsssOfdm = 13,
    /// Delayed block-ack.
    DelayedBlockAck = 14,
    /// Immediate block-ack.
    ImmediateBlockAck = 15,
}

impl CapabilityFlag {
    fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// Capability information record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CapabilityInformation {
    capability: u16,
}

impl CapabilityInformation {
    /// Creates a record with no capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from its raw 16-bit value.
    pub fn from_raw(capability: u16) -> Self {
        Self { capability }
    }

    /// Returns the raw 16-bit value.
    pub fn raw(&self) -> u16 {
        self.capability
    }

    /// Sets `flag`.
    pub fn set(&mut self, flag: CapabilityFlag) {
        self.capability |= flag.mask();
    }

    /// Clears `flag`.
    pub fn clear(&mut self, flag: CapabilityFlag) {
        self.capability &= !flag.mask();
    }

    /// Returns whether `flag` is set.
    pub fn is_set(&self, flag: CapabilityFlag) -> bool {
        self.capability & flag.mask() != 0
    }

    /// Marks the sender as part of an infrastructure BSS (clears IBSS).
    pub fn set_ess(&mut self) {
        self.set(CapabilityFlag::Ess);
        self.clear(CapabilityFlag::Ibss);
    }

    /// Marks the sender as part of an independent BSS (clears ESS).
    pub fn set_ibss(&mut self) {
        self.clear(CapabilityFlag::Ess);
        self.set(CapabilityFlag::Ibss);
    }

    /// Returns whether the ESS bit is set.
    pub fn is_ess(&self) -> bool {
        self.is_set(CapabilityFlag::Ess)
    }

    /// Returns whether the IBSS bit is set.
    pub fn is_ibss(&self) -> bool {
        self.is_set(CapabilityFlag::Ibss)
    }
}

impl WireRecord for CapabilityInformation {
    const SIZE: usize = 2;

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.capability)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self { capability: reader.read_u16::<LittleEndian>()? })
    }
}
