//! Fixed-size record serialization.
//!
//! Management records exchanged with peers have a fixed wire size. Each one
//! implements [`WireRecord`]; the provided methods give byte-vector helpers
//! on top of the streaming `io::Read`/`io::Write` pair.

use std::io::{Cursor, Read, Write};

use airlink_core::error::Result;

/// A record with a fixed serialized size.
pub trait WireRecord: Sized {
    /// Serialized size in bytes.
    const SIZE: usize;

    /// Writes the record to `writer`.
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Reads a record from `reader`. Truncated input is an I/O error.
    fn read_from<R: Read>(reader: &mut R) -> Result<Self>;

    /// Serializes the record into a new vector of exactly [`Self::SIZE`] bytes.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(Self::SIZE);
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Deserializes a record from the front of `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Self::read_from(&mut cursor)
    }
}
