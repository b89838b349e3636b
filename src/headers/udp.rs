//! # UDP Header
//!
//! RFC 768 datagram header.
//!
//! ```text
//!  0      7 8     15 16    23 24    31
//! +--------+--------+--------+--------+
//! |   Source Port   |  Dest. Port     |
//! +--------+--------+--------+--------+
//! |     Length      |    Checksum     |
//! +--------+--------+--------+--------+
//! ```

use crate::core::byte_order::to_network_order16;
use crate::core::checksum::{checksum_of, pseudo_header_v4, pseudo_header_v6};
use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{ip_number, HeaderCodec, HeaderKind};
use crate::error::{constants, ProtocolError, Result};
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    /// Header plus data, in bytes
    pub length: u16,
    pub checksum: u16,
}

impl UdpHeader {
    pub const LEN: usize = 8;

    /// Header with `length` set for `payload_len` bytes of data.
    pub fn for_payload(source_port: u16, destination_port: u16, payload_len: usize) -> Result<Self> {
        let length = u16::try_from(Self::LEN + payload_len).map_err(|_| {
            ProtocolError::InvalidHeader {
                kind: HeaderKind::Udp,
                reason: constants::ERR_LENGTH_OVERFLOW,
            }
        })?;
        Ok(Self {
            source_port,
            destination_port,
            length,
            checksum: 0,
        })
    }

    fn prefix(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0..2].copy_from_slice(&to_network_order16(self.source_port));
        out[2..4].copy_from_slice(&to_network_order16(self.destination_port));
        out[4..6].copy_from_slice(&to_network_order16(self.length));
        out
    }

    /// A computed checksum of zero is sent as all ones (zero means "none").
    fn finish(sum: u16) -> u16 {
        if sum == 0 {
            0xFFFF
        } else {
            sum
        }
    }

    pub fn fill_checksum_v4(&mut self, source: Ipv4Addr, destination: Ipv4Addr, payload: &[u8]) {
        let pseudo = pseudo_header_v4(source, destination, ip_number::UDP, self.length);
        self.checksum = Self::finish(checksum_of(&[&pseudo, &self.prefix(), payload]));
    }

    pub fn fill_checksum_v6(&mut self, source: Ipv6Addr, destination: Ipv6Addr, payload: &[u8]) {
        let pseudo = pseudo_header_v6(source, destination, ip_number::UDP, u32::from(self.length));
        self.checksum = Self::finish(checksum_of(&[&pseudo, &self.prefix(), payload]));
    }
}

impl HeaderCodec for UdpHeader {
    const KIND: HeaderKind = HeaderKind::Udp;
    const MIN_LEN: usize = Self::LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            source_port: reader.read_u16()?,
            destination_port: reader.read_u16()?,
            length: reader.read_u16()?,
            checksum: reader.read_u16()?,
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        writer.put_u16(self.source_port)?;
        writer.put_u16(self.destination_port)?;
        writer.put_u16(self.length)?;
        writer.put_u16(self.checksum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_layout() {
        let header = UdpHeader::for_payload(12345, 53, 4).unwrap();
        let bytes = header.serialize(&[1, 2, 3, 4]).unwrap();
        assert_eq!(&bytes[..8], &[0x30, 0x39, 0x00, 0x35, 0x00, 0x0C, 0x00, 0x00]);
        assert_eq!(&bytes[8..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_udp_length_overflow() {
        assert!(matches!(
            UdpHeader::for_payload(1, 2, 65_528),
            Err(ProtocolError::InvalidHeader { kind: HeaderKind::Udp, .. })
        ));
        assert!(UdpHeader::for_payload(1, 2, 65_527).is_ok());
    }

    #[test]
    fn test_udp_checksum_v4_verifies() {
        let src = Ipv4Addr::new(192, 168, 1, 1);
        let dst = Ipv4Addr::new(192, 168, 1, 2);
        let payload = b"hello";
        let mut header = UdpHeader::for_payload(5000, 6000, payload.len()).unwrap();
        header.fill_checksum_v4(src, dst, payload);

        let datagram = header.serialize(payload).unwrap();
        let pseudo = pseudo_header_v4(src, dst, ip_number::UDP, header.length);
        assert_eq!(checksum_of(&[&pseudo, &datagram]), 0);
    }

    #[test]
    fn test_udp_checksum_v6_nonzero() {
        let mut header = UdpHeader::for_payload(1, 1, 0).unwrap();
        header.fill_checksum_v6(Ipv6Addr::LOCALHOST, Ipv6Addr::LOCALHOST, &[]);
        assert_ne!(header.checksum, 0);
    }
}
