//! # Header Contract
//!
//! The shared parse/serialize contract every protocol header implements, the
//! [`HeaderKind`] tag, the [`ProtocolId`] used to chain headers together, and
//! the [`Header`] sum type the registry and builder operate on.
//!
//! ## Contract
//! - `parse` reads exactly `header_len()` bytes from the front of a buffer and
//!   reports how many it consumed. A buffer shorter than the header fails with
//!   `TruncatedBuffer`; the input is never mutated.
//! - `serialize` writes the header in network order followed by the payload,
//!   unmodified, into a buffer of exactly `header_len() + payload.len()` bytes.
//! - Fields are host-order in memory. Only the serialized form is big-endian.

use crate::core::cursor::{ByteReader, ByteWriter};
use crate::error::{ProtocolError, Result};
use crate::headers::{
    DestinationOptionsHeader, EchoHeader, HopByHopHeader, IcmpHeader, Icmpv6Header, IgmpHeader,
    Ipv4Header, Ipv6Header, RoutingHeader, TcpHeader, UdpHeader,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// IP protocol / IPv6 next-header numbers (IANA "Assigned Internet Protocol Numbers").
pub mod ip_number {
    pub const HOP_BY_HOP: u8 = 0;
    pub const ICMP: u8 = 1;
    pub const IGMP: u8 = 2;
    pub const IPV4: u8 = 4;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const IPV6: u8 = 41;
    pub const ROUTING: u8 = 43;
    pub const ICMPV6: u8 = 58;
    pub const NO_NEXT_HEADER: u8 = 59;
    pub const DESTINATION_OPTIONS: u8 = 60;
}

/// One tag per supported header layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderKind {
    Ipv4,
    Ipv6,
    Ipv6HopByHop,
    Ipv6Routing,
    Ipv6DestinationOptions,
    Icmp,
    Icmpv6,
    /// ICMP / ICMPv6 echo request and reply body
    Echo,
    Tcp,
    Udp,
    Igmp,
}

impl HeaderKind {
    pub const ALL: [HeaderKind; 11] = [
        HeaderKind::Ipv4,
        HeaderKind::Ipv6,
        HeaderKind::Ipv6HopByHop,
        HeaderKind::Ipv6Routing,
        HeaderKind::Ipv6DestinationOptions,
        HeaderKind::Icmp,
        HeaderKind::Icmpv6,
        HeaderKind::Echo,
        HeaderKind::Tcp,
        HeaderKind::Udp,
        HeaderKind::Igmp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HeaderKind::Ipv4 => "IPv4",
            HeaderKind::Ipv6 => "IPv6",
            HeaderKind::Ipv6HopByHop => "IPv6 Hop-by-Hop",
            HeaderKind::Ipv6Routing => "IPv6 Routing",
            HeaderKind::Ipv6DestinationOptions => "IPv6 Destination Options",
            HeaderKind::Icmp => "ICMP",
            HeaderKind::Icmpv6 => "ICMPv6",
            HeaderKind::Echo => "Echo",
            HeaderKind::Tcp => "TCP",
            HeaderKind::Udp => "UDP",
            HeaderKind::Igmp => "IGMP",
        }
    }

    /// Parse `buf` as this kind.
    pub fn parse(self, buf: &[u8]) -> Result<(Header, usize)> {
        Header::parse_as(self, buf)
    }

    /// Identifiers this kind answers to in the standard registry.
    pub fn protocol_ids(self) -> &'static [ProtocolId] {
        use ip_number::*;
        match self {
            HeaderKind::Ipv4 => &[ProtocolId::IpVersion(4), ProtocolId::IpNumber(IPV4)],
            HeaderKind::Ipv6 => &[ProtocolId::IpVersion(6), ProtocolId::IpNumber(IPV6)],
            HeaderKind::Ipv6HopByHop => &[ProtocolId::IpNumber(HOP_BY_HOP)],
            HeaderKind::Ipv6Routing => &[ProtocolId::IpNumber(ROUTING)],
            HeaderKind::Ipv6DestinationOptions => &[ProtocolId::IpNumber(DESTINATION_OPTIONS)],
            HeaderKind::Icmp => &[ProtocolId::IpNumber(ICMP)],
            HeaderKind::Icmpv6 => &[ProtocolId::IpNumber(ICMPV6)],
            HeaderKind::Echo => &[
                ProtocolId::IcmpType(0),
                ProtocolId::IcmpType(8),
                ProtocolId::Icmpv6Type(128),
                ProtocolId::Icmpv6Type(129),
            ],
            HeaderKind::Tcp => &[ProtocolId::IpNumber(TCP)],
            HeaderKind::Udp => &[ProtocolId::IpNumber(UDP)],
            HeaderKind::Igmp => &[ProtocolId::IpNumber(IGMP)],
        }
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies which header comes next in a buffer.
///
/// The namespaces overlap numerically (ICMP type 8 is not IP protocol 8), so
/// each identifier carries the field it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolId {
    /// IP version, as seeded from a socket's address family
    IpVersion(u8),
    /// IPv4 protocol field / IPv6 next header field
    IpNumber(u8),
    /// ICMPv4 message type
    IcmpType(u8),
    /// ICMPv6 message type
    Icmpv6Type(u8),
}

impl ProtocolId {
    /// Seed identifier from the version nibble of an IP packet.
    pub fn from_ip_packet(buf: &[u8]) -> Result<Self> {
        let first = buf.first().ok_or(ProtocolError::TruncatedBuffer {
            kind: HeaderKind::Ipv4,
            needed: 1,
            available: 0,
        })?;
        Ok(ProtocolId::IpVersion(first >> 4))
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolId::IpVersion(v) => write!(f, "IP version {v}"),
            ProtocolId::IpNumber(n) => write!(f, "IP protocol {n}"),
            ProtocolId::IcmpType(t) => write!(f, "ICMP type {t}"),
            ProtocolId::Icmpv6Type(t) => write!(f, "ICMPv6 type {t}"),
        }
    }
}

/// Parse/serialize contract shared by every header kind.
pub trait HeaderCodec: Sized {
    /// Tag used in errors and dispatch.
    const KIND: HeaderKind;

    /// Smallest valid wire length. Fixed-size headers always consume exactly this.
    const MIN_LEN: usize;

    /// Read the header's fields from the cursor.
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self>;

    /// Write the header's fields in network order.
    fn encode(&self, writer: &mut ByteWriter) -> Result<()>;

    /// Wire length of this instance (differs from `MIN_LEN` only for headers
    /// with options or extension data).
    fn header_len(&self) -> usize {
        Self::MIN_LEN
    }

    /// Identifier of the header that follows, if this protocol carries one.
    fn next_protocol(&self) -> Option<ProtocolId> {
        None
    }

    /// Parse a header from the front of `buf`, returning it and the number of
    /// bytes consumed.
    fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < Self::MIN_LEN {
            return Err(ProtocolError::TruncatedBuffer {
                kind: Self::KIND,
                needed: Self::MIN_LEN,
                available: buf.len(),
            });
        }
        let mut reader = ByteReader::new(buf, Self::KIND);
        let header = Self::decode(&mut reader)?;
        Ok((header, reader.position()))
    }

    /// Header followed by `payload` in a single exactly-sized buffer.
    fn serialize(&self, payload: &[u8]) -> Result<Bytes> {
        let mut writer = ByteWriter::with_capacity(self.header_len() + payload.len());
        self.encode(&mut writer)?;
        writer.put_slice(payload)?;
        Ok(writer.finish())
    }
}

/// A parsed or to-be-built header of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    HopByHop(HopByHopHeader),
    Routing(RoutingHeader),
    DestinationOptions(DestinationOptionsHeader),
    Icmp(IcmpHeader),
    Icmpv6(Icmpv6Header),
    Echo(EchoHeader),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Igmp(IgmpHeader),
}

macro_rules! each_variant {
    ($value:expr, $h:ident => $body:expr) => {
        match $value {
            Header::Ipv4($h) => $body,
            Header::Ipv6($h) => $body,
            Header::HopByHop($h) => $body,
            Header::Routing($h) => $body,
            Header::DestinationOptions($h) => $body,
            Header::Icmp($h) => $body,
            Header::Icmpv6($h) => $body,
            Header::Echo($h) => $body,
            Header::Tcp($h) => $body,
            Header::Udp($h) => $body,
            Header::Igmp($h) => $body,
        }
    };
}

fn parse_into<H>(buf: &[u8]) -> Result<(Header, usize)>
where
    H: HeaderCodec + Into<Header>,
{
    H::parse(buf).map(|(header, consumed)| (header.into(), consumed))
}

impl Header {
    /// Parse `buf` as the given kind.
    pub fn parse_as(kind: HeaderKind, buf: &[u8]) -> Result<(Header, usize)> {
        match kind {
            HeaderKind::Ipv4 => parse_into::<Ipv4Header>(buf),
            HeaderKind::Ipv6 => parse_into::<Ipv6Header>(buf),
            HeaderKind::Ipv6HopByHop => parse_into::<HopByHopHeader>(buf),
            HeaderKind::Ipv6Routing => parse_into::<RoutingHeader>(buf),
            HeaderKind::Ipv6DestinationOptions => parse_into::<DestinationOptionsHeader>(buf),
            HeaderKind::Icmp => parse_into::<IcmpHeader>(buf),
            HeaderKind::Icmpv6 => parse_into::<Icmpv6Header>(buf),
            HeaderKind::Echo => parse_into::<EchoHeader>(buf),
            HeaderKind::Tcp => parse_into::<TcpHeader>(buf),
            HeaderKind::Udp => parse_into::<UdpHeader>(buf),
            HeaderKind::Igmp => parse_into::<IgmpHeader>(buf),
        }
    }

    pub fn kind(&self) -> HeaderKind {
        fn kind_of<H: HeaderCodec>(_: &H) -> HeaderKind {
            H::KIND
        }
        each_variant!(self, h => kind_of(h))
    }

    pub fn header_len(&self) -> usize {
        each_variant!(self, h => h.header_len())
    }

    pub fn next_protocol(&self) -> Option<ProtocolId> {
        each_variant!(self, h => h.next_protocol())
    }

    pub fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        each_variant!(self, h => h.encode(writer))
    }

    pub fn serialize(&self, payload: &[u8]) -> Result<Bytes> {
        each_variant!(self, h => h.serialize(payload))
    }
}

macro_rules! impl_from_header {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Header {
                fn from(header: $ty) -> Self {
                    Header::$variant(header)
                }
            }
        )*
    };
}

impl_from_header!(
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    HopByHop(HopByHopHeader),
    Routing(RoutingHeader),
    DestinationOptions(DestinationOptionsHeader),
    Icmp(IcmpHeader),
    Icmpv6(Icmpv6Header),
    Echo(EchoHeader),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Igmp(IgmpHeader),
);
