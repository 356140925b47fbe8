use std::io::{Read, Write};

use airlink_core::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{address::MacAddress, record::WireRecord};

/// Header preceding each MSDU inside an aggregate MSDU.
///
/// Layout: destination address (6), source address (6), length (2, little-endian).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AmsduSubframeHeader {
    /// Destination address of the subframe.
    pub destination: MacAddress,
    /// Source address of the subframe.
    pub source: MacAddress,
    /// Length of the subframe payload in bytes.
    pub length: u16,
}

impl AmsduSubframeHeader {
    /// Creates a header.
    pub fn new(destination: MacAddress, source: MacAddress, length: u16) -> Self {
        Self { destination, source, length }
    }
}

impl WireRecord for AmsduSubframeHeader {
    const SIZE: usize = 14;

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.destination.write_to(writer)?;
        self.source.write_to(writer)?;
        writer.write_u16::<LittleEndian>(self.length)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let destination = MacAddress::read_from(reader)?;
        let source = MacAddress::read_from(reader)?;
        let length = reader.read_u16::<LittleEndian>()?;
        Ok(Self { destination, source, length })
    }
}
