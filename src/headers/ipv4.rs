//! # IPv4 Header
//!
//! RFC 791 header, 20 bytes plus up to 40 bytes of options.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |Version|  IHL  |   DSCP    |ECN|          Total Length         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         Identification        |Flags|      Fragment Offset    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Time to Live |    Protocol   |         Header Checksum       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                       Source Address                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Destination Address                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Options                    |    Padding    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! IHL is derived from the options length. Total length is carried as given;
//! some platforms hand raw-socket reads over with it rewritten, so parsing
//! does not validate it against the buffer.

use crate::core::checksum::internet_checksum;
use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{HeaderCodec, HeaderKind, ProtocolId};
use crate::error::{constants, ProtocolError, Result};
use std::net::Ipv4Addr;

/// Reserved / DF / MF bits as they appear in the 3-bit flags field.
pub mod ipv4_flags {
    pub const RESERVED: u8 = 0b100;
    pub const DONT_FRAGMENT: u8 = 0b010;
    pub const MORE_FRAGMENTS: u8 = 0b001;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ipv4Header {
    pub dscp: u8,
    pub ecn: u8,
    pub total_length: u16,
    pub identification: u16,
    /// 3-bit flags field, see [`ipv4_flags`]
    pub flags: u8,
    /// 13-bit offset in 8-byte units
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub options: Vec<u8>,
}

impl Ipv4Header {
    pub const MIN_HEADER_LEN: usize = 20;
    pub const MAX_OPTIONS_LEN: usize = 40;
    pub const DEFAULT_TTL: u8 = 64;
    pub const MAX_DSCP: u8 = 0x3F;
    pub const MAX_ECN: u8 = 0x03;
    pub const MAX_FLAGS: u8 = 0x07;
    pub const MAX_FRAGMENT_OFFSET: u16 = 0x1FFF;

    /// Header for `payload_len` bytes of `protocol` data with TTL 64 and the
    /// total length filled in. The checksum is left at zero.
    pub fn new(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        protocol: u8,
        payload_len: usize,
    ) -> Result<Self> {
        let mut header = Self {
            dscp: 0,
            ecn: 0,
            total_length: 0,
            identification: 0,
            flags: ipv4_flags::DONT_FRAGMENT,
            fragment_offset: 0,
            ttl: Self::DEFAULT_TTL,
            protocol,
            checksum: 0,
            source,
            destination,
            options: Vec::new(),
        };
        header.set_payload_len(payload_len)?;
        Ok(header)
    }

    /// Recompute total length for `payload_len` bytes after this header.
    pub fn set_payload_len(&mut self, payload_len: usize) -> Result<()> {
        self.total_length = u16::try_from(self.header_len() + payload_len).map_err(|_| {
            ProtocolError::InvalidHeader {
                kind: HeaderKind::Ipv4,
                reason: constants::ERR_LENGTH_OVERFLOW,
            }
        })?;
        Ok(())
    }

    /// IHL in 32-bit words.
    pub fn ihl(&self) -> u8 {
        (self.header_len() / 4) as u8
    }

    pub fn dont_fragment(&self) -> bool {
        self.flags & ipv4_flags::DONT_FRAGMENT != 0
    }

    pub fn more_fragments(&self) -> bool {
        self.flags & ipv4_flags::MORE_FRAGMENTS != 0
    }

    /// Bytes of data following the header according to total length.
    pub fn payload_len(&self) -> usize {
        usize::from(self.total_length).saturating_sub(self.header_len())
    }

    /// First sub-byte field that does not fit its wire width.
    fn field_out_of_range(&self) -> Option<&'static str> {
        if self.dscp > Self::MAX_DSCP {
            Some(constants::ERR_IPV4_DSCP)
        } else if self.ecn > Self::MAX_ECN {
            Some(constants::ERR_IPV4_ECN)
        } else if self.flags > Self::MAX_FLAGS {
            Some(constants::ERR_IPV4_FLAGS)
        } else if self.fragment_offset > Self::MAX_FRAGMENT_OFFSET {
            Some(constants::ERR_FRAGMENT_OFFSET)
        } else {
            None
        }
    }

    fn encoded_with_checksum(&self, checksum: u16) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.header_len());
        Ipv4Header {
            checksum,
            ..self.clone()
        }
        .encode(&mut writer)?;
        Ok(writer.finish().to_vec())
    }

    /// Compute and store the header checksum.
    pub fn fill_checksum(&mut self) -> Result<()> {
        let bytes = self.encoded_with_checksum(0)?;
        self.checksum = internet_checksum(&bytes);
        Ok(())
    }

    pub fn checksum_valid(&self) -> bool {
        self.encoded_with_checksum(self.checksum)
            .map(|bytes| internet_checksum(&bytes) == 0)
            .unwrap_or(false)
    }
}

impl HeaderCodec for Ipv4Header {
    const KIND: HeaderKind = HeaderKind::Ipv4;
    const MIN_LEN: usize = Self::MIN_HEADER_LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let version_ihl = reader.read_u8()?;
        if version_ihl >> 4 != 4 {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_VERSION_MISMATCH,
            });
        }
        let header_len = usize::from(version_ihl & 0x0F) * 4;
        if header_len < Self::MIN_HEADER_LEN {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_IPV4_IHL,
            });
        }

        let tos = reader.read_u8()?;
        let total_length = reader.read_u16()?;
        let identification = reader.read_u16()?;
        let flags_fragment = reader.read_u16()?;
        let ttl = reader.read_u8()?;
        let protocol = reader.read_u8()?;
        let checksum = reader.read_u16()?;
        let source = Ipv4Addr::from(reader.read_array::<4>()?);
        let destination = Ipv4Addr::from(reader.read_array::<4>()?);
        let options = reader.read_slice(header_len - Self::MIN_HEADER_LEN)?.to_vec();

        Ok(Self {
            dscp: tos >> 2,
            ecn: tos & 0x03,
            total_length,
            identification,
            flags: (flags_fragment >> 13) as u8,
            fragment_offset: flags_fragment & 0x1FFF,
            ttl,
            protocol,
            checksum,
            source,
            destination,
            options,
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        if self.options.len() % 4 != 0 || self.options.len() > Self::MAX_OPTIONS_LEN {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_IPV4_OPTIONS,
            });
        }
        if let Some(reason) = self.field_out_of_range() {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason,
            });
        }
        writer.put_u8(0x40 | self.ihl())?;
        writer.put_u8((self.dscp << 2) | self.ecn)?;
        writer.put_u16(self.total_length)?;
        writer.put_u16(self.identification)?;
        writer.put_u16((u16::from(self.flags) << 13) | self.fragment_offset)?;
        writer.put_u8(self.ttl)?;
        writer.put_u8(self.protocol)?;
        writer.put_u16(self.checksum)?;
        writer.put_slice(&self.source.octets())?;
        writer.put_slice(&self.destination.octets())?;
        writer.put_slice(&self.options)
    }

    fn header_len(&self) -> usize {
        Self::MIN_HEADER_LEN + self.options.len()
    }

    /// Non-first fragments carry a slice of the upper-layer data, not its
    /// header, so they end the chain.
    fn next_protocol(&self) -> Option<ProtocolId> {
        if self.fragment_offset != 0 {
            return None;
        }
        Some(ProtocolId::IpNumber(self.protocol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::ip_number;

    fn sample() -> Ipv4Header {
        Ipv4Header::new(
            Ipv4Addr::new(192, 168, 0, 1),
            Ipv4Addr::new(192, 168, 0, 199),
            ip_number::UDP,
            95,
        )
        .unwrap()
    }

    #[test]
    fn test_known_header_checksum() {
        let mut header = sample();
        header.fill_checksum().unwrap();
        assert_eq!(header.total_length, 0x73);
        assert_eq!(header.checksum, 0xB861);
        assert!(header.checksum_valid());
    }

    #[test]
    fn test_field_packing() {
        let mut header = sample();
        header.dscp = 46;
        header.ecn = 1;
        header.flags = ipv4_flags::MORE_FRAGMENTS;
        header.fragment_offset = 0x0123;
        let bytes = header.serialize(&[]).unwrap();

        assert_eq!(bytes[0], 0x45);
        assert_eq!(bytes[1], (46 << 2) | 1);
        assert_eq!(&bytes[6..8], &[0x21, 0x23]);

        let (parsed, consumed) = Ipv4Header::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(consumed, 20);
        assert!(parsed.more_fragments());
        assert_eq!(parsed.next_protocol(), None);
    }

    #[test]
    fn test_options_extend_header() {
        let mut header = sample();
        header.options = vec![0x01, 0x01, 0x01, 0x00];
        header.set_payload_len(0).unwrap();

        let bytes = header.serialize(&[]).unwrap();
        assert_eq!(bytes[0], 0x46);
        assert_eq!(Ipv4Header::parse(&bytes).unwrap().1, 24);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut bytes = sample().serialize(&[]).unwrap().to_vec();
        bytes[0] = 0x65;
        assert!(matches!(
            Ipv4Header::parse(&bytes),
            Err(ProtocolError::InvalidHeader { reason, .. }) if reason == constants::ERR_VERSION_MISMATCH
        ));
    }

    #[test]
    fn test_rejects_short_ihl() {
        let mut bytes = sample().serialize(&[]).unwrap().to_vec();
        bytes[0] = 0x44;
        assert!(matches!(
            Ipv4Header::parse(&bytes),
            Err(ProtocolError::InvalidHeader { reason, .. }) if reason == constants::ERR_IPV4_IHL
        ));
    }

    #[test]
    fn test_oversized_bit_fields_rejected() {
        let cases: [(fn(&mut Ipv4Header), &str); 4] = [
            (|h| h.dscp = 0xFF, constants::ERR_IPV4_DSCP),
            (|h| h.ecn = 4, constants::ERR_IPV4_ECN),
            (|h| h.flags = 8, constants::ERR_IPV4_FLAGS),
            (|h| h.fragment_offset = 0x2001, constants::ERR_FRAGMENT_OFFSET),
        ];
        for (corrupt, expected) in cases {
            let mut header = sample();
            corrupt(&mut header);
            assert!(matches!(
                header.serialize(&[]),
                Err(ProtocolError::InvalidHeader { reason, .. }) if reason == expected
            ));
            assert!(header.fill_checksum().is_err());
            assert!(!header.checksum_valid());
        }
    }

    #[test]
    fn test_total_length_overflow() {
        assert!(Ipv4Header::new(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST, 17, 65_516).is_err());
    }
}
