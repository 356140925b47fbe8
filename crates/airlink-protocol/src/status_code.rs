use std::{
    fmt,
    io::{Read, Write},
};

use airlink_core::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::record::WireRecord;

/// Status code carried in association and block-ack responses.
///
/// Zero means success; every other value is a failure.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusCode {
    code: u16,
}

impl StatusCode {
    /// Status code for an unspecified failure.
    pub const UNSPECIFIED_FAILURE: u16 = 1;

    /// A successful status.
    pub fn success() -> Self {
        Self { code: 0 }
    }

    /// An unspecified failure.
    pub fn failure() -> Self {
        Self { code: Self::UNSPECIFIED_FAILURE }
    }

    /// Creates a status from its raw value.
    pub fn from_code(code: u16) -> Self {
        Self { code }
    }

    /// Sets the status to success.
    pub fn set_success(&mut self) {
        self.code = 0;
    }

    /// Sets the status to an unspecified failure.
    pub fn set_failure(&mut self) {
        self.code = Self::UNSPECIFIED_FAILURE;
    }

    /// Returns whether the status is a success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Returns the raw value.
    pub fn code(&self) -> u16 {
        self.code
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            f.write_str("success")
        } else {
            write!(f, "failure ({})", self.code)
        }
    }
}

impl WireRecord for StatusCode {
    const SIZE: usize = 2;

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.code)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self { code: reader.read_u16::<LittleEndian>()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_failure() {
        let mut status = StatusCode::success();
        assert!(status.is_success());
        status.set_failure();
        assert!(!status.is_success());
        assert_eq!(status.to_string(), "failure (1)");
        status.set_success();
        assert_eq!(status.to_string(), "success");
    }

    #[test]
    fn test_round_trip() {
        for code in [0u16, 1, 37, 0xffff] {
            let status = StatusCode::from_code(code);
            let bytes = status.to_bytes().unwrap();
            assert_eq!(bytes, code.to_le_bytes().to_vec());
            assert_eq!(StatusCode::from_bytes(&bytes).unwrap(), status);
        }
    }
}
