//! # TCP Header
//!
//! RFC 9293 segment header, 20 bytes plus up to 40 bytes of options.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          Source Port          |       Destination Port        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        Sequence Number                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Acknowledgment Number                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Data |     |N|C|E|U|A|P|R|S|F|                               |
//! | Offset| Rsv |S|W|C|R|C|S|S|Y|I|            Window             |
//! |       |     | |R|E|G|K|H|T|N|N|                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           Checksum            |         Urgent Pointer        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Options                    |    Padding    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The data offset is not stored; it is derived from the options length so a
//! header can never disagree with itself.

use crate::core::checksum::{checksum_of, pseudo_header_v4, pseudo_header_v6};
use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{ip_number, HeaderCodec, HeaderKind};
use crate::error::{constants, ProtocolError, Result};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::BitOr;

/// The nine TCP control bits, NS in bit 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TcpFlags(pub u16);

impl TcpFlags {
    pub const FIN: TcpFlags = TcpFlags(0x001);
    pub const SYN: TcpFlags = TcpFlags(0x002);
    pub const RST: TcpFlags = TcpFlags(0x004);
    pub const PSH: TcpFlags = TcpFlags(0x008);
    pub const ACK: TcpFlags = TcpFlags(0x010);
    pub const URG: TcpFlags = TcpFlags(0x020);
    pub const ECE: TcpFlags = TcpFlags(0x040);
    pub const CWR: TcpFlags = TcpFlags(0x080);
    pub const NS: TcpFlags = TcpFlags(0x100);

    pub const SYN_ACK: TcpFlags = TcpFlags(0x012);
    pub const ALL: TcpFlags = TcpFlags(0x1FF);

    pub fn contains(self, other: TcpFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TcpFlags {
    type Output = TcpFlags;

    fn bitor(self, rhs: TcpFlags) -> TcpFlags {
        TcpFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgment_number: u32,
    /// Three reserved bits between data offset and NS
    pub reserved: u8,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
    /// Raw option bytes, already padded to a 4-byte boundary
    pub options: Vec<u8>,
}

impl TcpHeader {
    pub const MIN_HEADER_LEN: usize = 20;
    pub const MAX_OPTIONS_LEN: usize = 40;
    pub const MAX_RESERVED: u8 = 0x07;

    pub fn new(
        source_port: u16,
        destination_port: u16,
        sequence_number: u32,
        acknowledgment_number: u32,
        flags: TcpFlags,
    ) -> Self {
        Self {
            source_port,
            destination_port,
            sequence_number,
            acknowledgment_number,
            flags,
            window: 65535,
            ..Default::default()
        }
    }

    /// Data offset in 32-bit words.
    pub fn data_offset(&self) -> u8 {
        (self.header_len() / 4) as u8
    }

    fn checksum_input(&self) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.header_len());
        TcpHeader {
            checksum: 0,
            ..self.clone()
        }
        .encode(&mut writer)?;
        Ok(writer.finish().to_vec())
    }

    pub fn fill_checksum_v4(
        &mut self,
        source: Ipv4Addr,
        destination: Ipv4Addr,
        payload: &[u8],
    ) -> Result<()> {
        let header = self.checksum_input()?;
        let length = u16::try_from(header.len() + payload.len()).map_err(|_| {
            ProtocolError::InvalidHeader {
                kind: HeaderKind::Tcp,
                reason: constants::ERR_LENGTH_OVERFLOW,
            }
        })?;
        let pseudo = pseudo_header_v4(source, destination, ip_number::TCP, length);
        self.checksum = checksum_of(&[&pseudo, &header, payload]);
        Ok(())
    }

    pub fn fill_checksum_v6(
        &mut self,
        source: Ipv6Addr,
        destination: Ipv6Addr,
        payload: &[u8],
    ) -> Result<()> {
        let header = self.checksum_input()?;
        let length = (header.len() + payload.len()) as u32;
        let pseudo = pseudo_header_v6(source, destination, ip_number::TCP, length);
        self.checksum = checksum_of(&[&pseudo, &header, payload]);
        Ok(())
    }
}

impl HeaderCodec for TcpHeader {
    const KIND: HeaderKind = HeaderKind::Tcp;
    const MIN_LEN: usize = Self::MIN_HEADER_LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let source_port = reader.read_u16()?;
        let destination_port = reader.read_u16()?;
        let sequence_number = reader.read_u32()?;
        let acknowledgment_number = reader.read_u32()?;
        let offset_byte = reader.read_u8()?;
        let flags_byte = reader.read_u8()?;
        let window = reader.read_u16()?;
        let checksum = reader.read_u16()?;
        let urgent_pointer = reader.read_u16()?;

        let header_len = usize::from(offset_byte >> 4) * 4;
        if header_len < Self::MIN_HEADER_LEN {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_TCP_DATA_OFFSET,
            });
        }
        let options = reader.read_slice(header_len - Self::MIN_HEADER_LEN)?.to_vec();

        Ok(Self {
            source_port,
            destination_port,
            sequence_number,
            acknowledgment_number,
            reserved: (offset_byte >> 1) & 0x07,
            flags: TcpFlags((u16::from(offset_byte & 0x01) << 8) | u16::from(flags_byte)),
            window,
            checksum,
            urgent_pointer,
            options,
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        if self.options.len() % 4 != 0 || self.options.len() > Self::MAX_OPTIONS_LEN {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_TCP_OPTIONS,
            });
        }
        if self.reserved > Self::MAX_RESERVED {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_TCP_RESERVED,
            });
        }
        if !TcpFlags::ALL.contains(self.flags) {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_TCP_FLAGS,
            });
        }
        writer.put_u16(self.source_port)?;
        writer.put_u16(self.destination_port)?;
        writer.put_u32(self.sequence_number)?;
        writer.put_u32(self.acknowledgment_number)?;
        let ns = ((self.flags.0 >> 8) & 0x01) as u8;
        writer.put_u8((self.data_offset() << 4) | (self.reserved << 1) | ns)?;
        writer.put_u8((self.flags.0 & 0xFF) as u8)?;
        writer.put_u16(self.window)?;
        writer.put_u16(self.checksum)?;
        writer.put_u16(self.urgent_pointer)?;
        writer.put_slice(&self.options)
    }

    fn header_len(&self) -> usize {
        Self::MIN_HEADER_LEN + self.options.len()
    }
}
