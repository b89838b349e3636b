//! # IGMP Header
//!
//! IGMPv1/v2 message (RFC 1112, RFC 2236). IGMPv3 queries share the first
//! eight bytes; their source list is left in the payload.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      Type     | Max Resp Time |           Checksum            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Group Address                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::core::checksum::checksum_of;
use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{HeaderCodec, HeaderKind};
use crate::error::Result;
use std::net::Ipv4Addr;

pub mod igmp_type {
    pub const MEMBERSHIP_QUERY: u8 = 0x11;
    pub const V1_MEMBERSHIP_REPORT: u8 = 0x12;
    pub const V2_MEMBERSHIP_REPORT: u8 = 0x16;
    pub const LEAVE_GROUP: u8 = 0x17;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IgmpHeader {
    pub igmp_type: u8,
    /// Tenths of a second; zero in v1 messages
    pub max_response_time: u8,
    pub checksum: u16,
    pub group_address: Ipv4Addr,
}

impl IgmpHeader {
    pub const LEN: usize = 8;

    pub fn new(igmp_type: u8, max_response_time: u8, group_address: Ipv4Addr) -> Self {
        Self {
            igmp_type,
            max_response_time,
            checksum: 0,
            group_address,
        }
    }

    pub fn report(group_address: Ipv4Addr) -> Self {
        Self::new(igmp_type::V2_MEMBERSHIP_REPORT, 0, group_address)
    }

    pub fn leave(group_address: Ipv4Addr) -> Self {
        Self::new(igmp_type::LEAVE_GROUP, 0, group_address)
    }

    /// Set the checksum over the whole IGMP message (`extra` is any trailing
    /// v3 data, usually empty).
    pub fn fill_checksum(&mut self, extra: &[u8]) {
        let mut head = [0u8; Self::LEN];
        head[0] = self.igmp_type;
        head[1] = self.max_response_time;
        head[4..8].copy_from_slice(&self.group_address.octets());
        self.checksum = checksum_of(&[&head, extra]);
    }
}

impl HeaderCodec for IgmpHeader {
    const KIND: HeaderKind = HeaderKind::Igmp;
    const MIN_LEN: usize = Self::LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            igmp_type: reader.read_u8()?,
            max_response_time: reader.read_u8()?,
            checksum: reader.read_u16()?,
            group_address: Ipv4Addr::from(reader.read_array::<4>()?),
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        writer.put_u8(self.igmp_type)?;
        writer.put_u8(self.max_response_time)?;
        writer.put_u16(self.checksum)?;
        writer.put_slice(&self.group_address.octets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checksum::is_valid;

    #[test]
    fn test_igmp_report_roundtrip() {
        let mut header = IgmpHeader::report(Ipv4Addr::new(239, 1, 2, 3));
        header.fill_checksum(&[]);

        let bytes = header.serialize(&[]).unwrap();
        assert_eq!(bytes[0], 0x16);
        assert_eq!(&bytes[4..], &[239, 1, 2, 3]);
        assert!(is_valid(&bytes));

        assert_eq!(IgmpHeader::parse(&bytes).unwrap(), (header, 8));
    }
}
