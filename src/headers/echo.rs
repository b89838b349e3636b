//! # Echo Header
//!
//! Body of an ICMP (RFC 792) or ICMPv6 (RFC 4443 section 4.1) echo request or
//! reply. It follows the 4-byte type/code/checksum header and precedes the
//! echo data.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           Identifier          |        Sequence Number        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Data ...
//! +-+-+-+-+-
//! ```

use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{HeaderCodec, HeaderKind};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EchoHeader {
    pub identifier: u16,
    pub sequence_number: u16,
}

impl EchoHeader {
    pub const LEN: usize = 4;

    pub fn new(identifier: u16, sequence_number: u16) -> Self {
        Self {
            identifier,
            sequence_number,
        }
    }
}

impl HeaderCodec for EchoHeader {
    const KIND: HeaderKind = HeaderKind::Echo;
    const MIN_LEN: usize = Self::LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            identifier: reader.read_u16()?,
            sequence_number: reader.read_u16()?,
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        writer.put_u16(self.identifier)?;
        writer.put_u16(self.sequence_number)
    }
}
