//! # IPv6 Header
//!
//! RFC 8200 fixed header, always 40 bytes. Extension headers are separate
//! kinds (see [`ipv6_ext`](crate::headers::ipv6_ext)) chained through
//! `next_header`.
//!
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |Version| Traffic Class |           Flow Label                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         Payload Length        |  Next Header  |   Hop Limit   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Source Address (128)                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                  Destination Address (128)                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{ip_number, HeaderCodec, HeaderKind, ProtocolId};
use crate::error::{constants, ProtocolError, Result};
use std::net::Ipv6Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Header {
    pub traffic_class: u8,
    /// 20-bit flow label
    pub flow_label: u32,
    /// Length of everything after this fixed header
    pub payload_length: u16,
    pub next_header: u8,
    pub hop_limit: u8,
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
}

impl Ipv6Header {
    pub const LEN: usize = 40;
    pub const MAX_FLOW_LABEL: u32 = 0x000F_FFFF;
    pub const DEFAULT_HOP_LIMIT: u8 = 64;

    pub fn new(
        source: Ipv6Addr,
        destination: Ipv6Addr,
        next_header: u8,
        payload_len: usize,
    ) -> Result<Self> {
        let payload_length =
            u16::try_from(payload_len).map_err(|_| ProtocolError::InvalidHeader {
                kind: HeaderKind::Ipv6,
                reason: constants::ERR_LENGTH_OVERFLOW,
            })?;
        Ok(Self {
            traffic_class: 0,
            flow_label: 0,
            payload_length,
            next_header,
            hop_limit: Self::DEFAULT_HOP_LIMIT,
            source,
            destination,
        })
    }
}

impl HeaderCodec for Ipv6Header {
    const KIND: HeaderKind = HeaderKind::Ipv6;
    const MIN_LEN: usize = Self::LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let first = reader.read_u32()?;
        if first >> 28 != 6 {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_VERSION_MISMATCH,
            });
        }
        Ok(Self {
            traffic_class: ((first >> 20) & 0xFF) as u8,
            flow_label: first & Self::MAX_FLOW_LABEL,
            payload_length: reader.read_u16()?,
            next_header: reader.read_u8()?,
            hop_limit: reader.read_u8()?,
            source: Ipv6Addr::from(reader.read_array::<16>()?),
            destination: Ipv6Addr::from(reader.read_array::<16>()?),
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        if self.flow_label > Self::MAX_FLOW_LABEL {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_FLOW_LABEL,
            });
        }
        writer.put_u32((6 << 28) | (u32::from(self.traffic_class) << 20) | self.flow_label)?;
        writer.put_u16(self.payload_length)?;
        writer.put_u8(self.next_header)?;
        writer.put_u8(self.hop_limit)?;
        writer.put_slice(&self.source.octets())?;
        writer.put_slice(&self.destination.octets())
    }

    fn next_protocol(&self) -> Option<ProtocolId> {
        match self.next_header {
            ip_number::NO_NEXT_HEADER => None,
            n => Some(ProtocolId::IpNumber(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_word_packing() {
        let mut header = Ipv6Header::new(
            Ipv6Addr::LOCALHOST,
            "2001:db8::1".parse().unwrap(),
            ip_number::ICMPV6,
            8,
        )
        .unwrap();
        header.traffic_class = 0xAB;
        header.flow_label = 0x12345;

        let bytes = header.serialize(&[0u8; 8]).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[0..4], &[0x6A, 0xB1, 0x23, 0x45]);
        assert_eq!(&bytes[4..8], &[0x00, 0x08, 58, 64]);
        assert_eq!(&bytes[24..26], &[0x20, 0x01]);

        let (parsed, consumed) = Ipv6Header::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(consumed, 40);
    }

    #[test]
    fn test_flow_label_range() {
        let mut header = Ipv6Header::new(Ipv6Addr::UNSPECIFIED, Ipv6Addr::UNSPECIFIED, 59, 0).unwrap();
        header.flow_label = 0x10_0000;
        assert!(matches!(
            header.serialize(&[]),
            Err(ProtocolError::InvalidHeader { reason, .. }) if reason == constants::ERR_FLOW_LABEL
        ));
    }

    #[test]
    fn test_no_next_header_ends_chain() {
        let header = Ipv6Header::new(Ipv6Addr::UNSPECIFIED, Ipv6Addr::UNSPECIFIED, 59, 0).unwrap();
        assert_eq!(header.next_protocol(), None);
    }

    #[test]
    fn test_rejects_ipv4_bytes() {
        let mut bytes = [0u8; 40];
        bytes[0] = 0x45;
        assert!(matches!(
            Ipv6Header::parse(&bytes),
            Err(ProtocolError::InvalidHeader { kind: HeaderKind::Ipv6, .. })
        ));
    }
}
