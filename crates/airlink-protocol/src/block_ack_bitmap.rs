//! Compressed block-ack response bitmap.
//!
//! One bit per sequence number starting at `starting_sequence`, packed
//! LSB-first into 64 little-endian 16-bit groups (1024 sequence numbers).

use std::io::{Read, Write};

use airlink_core::{constants::BITMAP_GROUPS, error::Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    record::WireRecord,
    sequence::{sequence_distance, wrap, SequenceNumber},
};

const BITS_PER_GROUP: u16 = 16;
const BITMAP_BITS: u16 = BITMAP_GROUPS as u16 * BITS_PER_GROUP;

/// Bitmap carried in a block-ack response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockAckBitmap {
    starting_sequence: SequenceNumber,
    groups: [u16; BITMAP_GROUPS],
}

impl Default for BlockAckBitmap {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BlockAckBitmap {
    /// Creates an empty bitmap starting at `starting_sequence`.
    pub fn new(starting_sequence: SequenceNumber) -> Self {
        Self { starting_sequence: wrap(starting_sequence), groups: [0; BITMAP_GROUPS] }
    }

    /// Clears every bit and moves the start to `starting_sequence`.
    pub fn reset(&mut self, starting_sequence: SequenceNumber) {
        self.starting_sequence = wrap(starting_sequence);
        self.groups = [0; BITMAP_GROUPS];
    }

    /// Returns the first sequence number covered by the bitmap.
    pub fn starting_sequence(&self) -> SequenceNumber {
        self.starting_sequence
    }

    /// Returns the 16-bit groups.
    pub fn groups(&self) -> &[u16; BITMAP_GROUPS] {
        &self.groups
    }

    /// Marks `seq` as received. Sequence numbers outside the bitmap's span are ignored.
    pub fn set_received(&mut self, seq: SequenceNumber) {
        if let Some((group, bit)) = self.position(seq) {
            self.groups[group] |= 1 << bit;
        }
    }

    /// Returns whether `seq` is marked as received.
    pub fn is_received(&self, seq: SequenceNumber) -> bool {
        match self.position(seq) {
            Some((group, bit)) => self.groups[group] & (1 << bit) != 0,
            None => false,
        }
    }

    /// Number of sequence numbers marked as received.
    pub fn received_count(&self) -> u32 {
        self.groups.iter().map(|g| g.count_ones()).sum()
    }

    fn position(&self, seq: SequenceNumber) -> Option<(usize, u16)> {
        let offset = sequence_distance(self.starting_sequence, wrap(seq));
        if offset < BITMAP_BITS {
            Some(((offset / BITS_PER_GROUP) as usize, offset % BITS_PER_GROUP))
        } else {
            None
        }
    }
}

impl WireRecord for BlockAckBitmap {
    /// Starting sequence control (2) followed by the bitmap (128).
    const SIZE: usize = 2 + BITMAP_GROUPS * 2;

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        // Fragment number field is zero in a compressed bitmap.
        writer.write_u16::<LittleEndian>(self.starting_sequence << 4)?;
        for group in &self.groups {
            writer.write_u16::<LittleEndian>(*group)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let starting_sequence = reader.read_u16::<LittleEndian>()? >> 4;
        let mut groups = [0u16; BITMAP_GROUPS];
        for group in groups.iter_mut() {
            *group = reader.read_u16::<LittleEndian>()?;
        }
        Ok(Self { starting_sequence, groups })
    }
}
