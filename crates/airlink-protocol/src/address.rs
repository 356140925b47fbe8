use std::{
    fmt,
    io::{Read, Write},
};

use airlink_core::error::Result;

use crate::record::WireRecord;

/// 48-bit hardware address identifying a station.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// The broadcast address `ff:ff:ff:ff:ff:ff`.
    pub const BROADCAST: MacAddress = MacAddress([0xff; 6]);

    /// Creates an address from its six octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Returns the six octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Returns true for group (multicast or broadcast) addresses.
    pub fn is_group(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", o[0], o[1], o[2], o[3], o[4], o[5])
    }
}

impl WireRecord for MacAddress {
    const SIZE: usize = 6;

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut octets = [0u8; 6];
        reader.read_exact(&mut octets)?;
        Ok(Self(octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_colon_hex() {
        let addr = MacAddress::new([0x00, 0x1b, 0x2c, 0x3d, 0x4e, 0xff]);
        assert_eq!(addr.to_string(), "00:1b:2c:3d:4e:ff");
    }

    #[test]
    fn test_group_bit() {
        assert!(MacAddress::BROADCAST.is_group());
        assert!(!MacAddress::new([0x02, 0, 0, 0, 0, 1]).is_group());
    }
}
