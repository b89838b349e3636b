//! # ICMP and ICMPv6 Headers
//!
//! The common 4-byte prefix of every ICMP (RFC 792) and ICMPv6 (RFC 4443)
//! message. The rest of the message body depends on the type; echo bodies
//! are decoded by [`EchoHeader`](crate::headers::EchoHeader), everything else
//! is left to the caller as payload.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |     Code      |          Checksum             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Message Body                          |
//! ```

use crate::core::checksum::{checksum_of, pseudo_header_v6};
use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{ip_number, HeaderCodec, HeaderKind, ProtocolId};
use crate::error::Result;
use std::net::Ipv6Addr;

/// ICMPv4 message types
pub mod icmp_type {
    pub const ECHO_REPLY: u8 = 0;
    pub const DESTINATION_UNREACHABLE: u8 = 3;
    pub const REDIRECT: u8 = 5;
    pub const ECHO_REQUEST: u8 = 8;
    pub const TIME_EXCEEDED: u8 = 11;
    pub const PARAMETER_PROBLEM: u8 = 12;
}

/// ICMPv6 message types
pub mod icmpv6_type {
    pub const DESTINATION_UNREACHABLE: u8 = 1;
    pub const PACKET_TOO_BIG: u8 = 2;
    pub const TIME_EXCEEDED: u8 = 3;
    pub const PARAMETER_PROBLEM: u8 = 4;
    pub const ECHO_REQUEST: u8 = 128;
    pub const ECHO_REPLY: u8 = 129;
    pub const ROUTER_SOLICITATION: u8 = 133;
    pub const ROUTER_ADVERTISEMENT: u8 = 134;
    pub const NEIGHBOR_SOLICITATION: u8 = 135;
    pub const NEIGHBOR_ADVERTISEMENT: u8 = 136;
}

fn decode_prefix(reader: &mut ByteReader<'_>) -> Result<(u8, u8, u16)> {
    Ok((reader.read_u8()?, reader.read_u8()?, reader.read_u16()?))
}

fn encode_prefix(writer: &mut ByteWriter, message_type: u8, code: u8, checksum: u16) -> Result<()> {
    writer.put_u8(message_type)?;
    writer.put_u8(code)?;
    writer.put_u16(checksum)
}

/// ICMP over IPv4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
}

impl IcmpHeader {
    pub const LEN: usize = 4;

    pub fn new(icmp_type: u8, code: u8) -> Self {
        Self {
            icmp_type,
            code,
            checksum: 0,
        }
    }

    pub fn echo_request() -> Self {
        Self::new(icmp_type::ECHO_REQUEST, 0)
    }

    pub fn echo_reply() -> Self {
        Self::new(icmp_type::ECHO_REPLY, 0)
    }

    /// Set the checksum over this header and the rest of the message.
    pub fn fill_checksum(&mut self, body: &[u8]) {
        self.checksum = 0;
        let prefix = [self.icmp_type, self.code, 0, 0];
        self.checksum = checksum_of(&[&prefix, body]);
    }
}

impl HeaderCodec for IcmpHeader {
    const KIND: HeaderKind = HeaderKind::Icmp;
    const MIN_LEN: usize = Self::LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let (icmp_type, code, checksum) = decode_prefix(reader)?;
        Ok(Self {
            icmp_type,
            code,
            checksum,
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        encode_prefix(writer, self.icmp_type, self.code, self.checksum)
    }

    fn next_protocol(&self) -> Option<ProtocolId> {
        match self.icmp_type {
            icmp_type::ECHO_REQUEST | icmp_type::ECHO_REPLY => {
                Some(ProtocolId::IcmpType(self.icmp_type))
            }
            _ => None,
        }
    }
}

/// ICMP over IPv6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Icmpv6Header {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
}

impl Icmpv6Header {
    pub const LEN: usize = 4;

    pub fn new(icmp_type: u8, code: u8) -> Self {
        Self {
            icmp_type,
            code,
            checksum: 0,
        }
    }

    pub fn echo_request() -> Self {
        Self::new(icmpv6_type::ECHO_REQUEST, 0)
    }

    pub fn echo_reply() -> Self {
        Self::new(icmpv6_type::ECHO_REPLY, 0)
    }

    /// Error messages have types 0-127, informational messages 128-255.
    pub fn is_error(&self) -> bool {
        self.icmp_type < 128
    }

    /// Set the checksum, which for ICMPv6 also covers the IPv6 pseudo-header.
    pub fn fill_checksum(&mut self, source: Ipv6Addr, destination: Ipv6Addr, body: &[u8]) {
        self.checksum = 0;
        let length = (Self::LEN + body.len()) as u32;
        let pseudo = pseudo_header_v6(source, destination, ip_number::ICMPV6, length);
        let prefix = [self.icmp_type, self.code, 0, 0];
        self.checksum = checksum_of(&[&pseudo, &prefix, body]);
    }
}

impl HeaderCodec for Icmpv6Header {
    const KIND: HeaderKind = HeaderKind::Icmpv6;
    const MIN_LEN: usize = Self::LEN;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let (icmp_type, code, checksum) = decode_prefix(reader)?;
        Ok(Self {
            icmp_type,
            code,
            checksum,
        })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        encode_prefix(writer, self.icmp_type, self.code, self.checksum)
    }

    fn next_protocol(&self) -> Option<ProtocolId> {
        match self.icmp_type {
            icmpv6_type::ECHO_REQUEST | icmpv6_type::ECHO_REPLY => {
                Some(ProtocolId::Icmpv6Type(self.icmp_type))
            }
            _ => None,
        }
    }
}
