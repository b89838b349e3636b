//! # IPv6 Extension Headers
//!
//! Hop-by-Hop Options, Routing and Destination Options (RFC 8200 section 4)
//! share one length-prefixed layout, so one type parameterised by the
//! next-header number that announces it covers all three.
//!
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Next Header  |  Hdr Ext Len  |                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
//! |                 Options / routing data                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Header length is `(Hdr Ext Len + 1) * 8` bytes. The body is kept as raw
//! bytes; option TLVs are not interpreted.

use crate::core::cursor::{ByteReader, ByteWriter};
use crate::core::header::{ip_number, HeaderCodec, HeaderKind, ProtocolId};
use crate::error::{constants, ProtocolError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ipv6ExtensionHeader<const NUMBER: u8> {
    pub next_header: u8,
    /// Everything after the two-byte prefix
    pub data: Vec<u8>,
}

pub type HopByHopHeader = Ipv6ExtensionHeader<{ ip_number::HOP_BY_HOP }>;
pub type RoutingHeader = Ipv6ExtensionHeader<{ ip_number::ROUTING }>;
pub type DestinationOptionsHeader = Ipv6ExtensionHeader<{ ip_number::DESTINATION_OPTIONS }>;

const fn extension_kind(number: u8) -> HeaderKind {
    match number {
        ip_number::HOP_BY_HOP => HeaderKind::Ipv6HopByHop,
        ip_number::ROUTING => HeaderKind::Ipv6Routing,
        _ => HeaderKind::Ipv6DestinationOptions,
    }
}

impl<const NUMBER: u8> Ipv6ExtensionHeader<NUMBER> {
    pub const UNIT: usize = 8;
    pub const MAX_LEN: usize = 256 * Self::UNIT;

    pub fn new(next_header: u8, data: Vec<u8>) -> Self {
        Self { next_header, data }
    }

    /// Build an options header, appending Pad1/PadN so the total length is a
    /// multiple of eight.
    pub fn with_padding(next_header: u8, options: &[u8]) -> Self {
        let mut data = options.to_vec();
        let pad = (Self::UNIT - (2 + data.len()) % Self::UNIT) % Self::UNIT;
        match pad {
            0 => {}
            1 => data.push(0x00),
            n => {
                data.push(0x01);
                data.push((n - 2) as u8);
                data.resize(data.len() + n - 2, 0);
            }
        }
        Self { next_header, data }
    }

    /// The identifier the preceding header uses to announce this one.
    pub fn protocol_number(&self) -> u8 {
        NUMBER
    }
}

impl RoutingHeader {
    pub fn routing_type(&self) -> Option<u8> {
        self.data.first().copied()
    }

    pub fn segments_left(&self) -> Option<u8> {
        self.data.get(1).copied()
    }
}

impl<const NUMBER: u8> HeaderCodec for Ipv6ExtensionHeader<NUMBER> {
    const KIND: HeaderKind = extension_kind(NUMBER);
    const MIN_LEN: usize = Self::UNIT;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let next_header = reader.read_u8()?;
        let ext_len = usize::from(reader.read_u8()?);
        let total = (ext_len + 1) * Self::UNIT;
        let data = reader.read_slice(total - 2)?.to_vec();
        Ok(Self { next_header, data })
    }

    fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        let total = self.header_len();
        if total % Self::UNIT != 0 || total > Self::MAX_LEN {
            return Err(ProtocolError::InvalidHeader {
                kind: Self::KIND,
                reason: constants::ERR_EXT_DATA_LENGTH,
            });
        }
        writer.put_u8(self.next_header)?;
        writer.put_u8((total / Self::UNIT - 1) as u8)?;
        writer.put_slice(&self.data)
    }

    fn header_len(&self) -> usize {
        2 + self.data.len()
    }

    fn next_protocol(&self) -> Option<ProtocolId> {
        match self.next_header {
            ip_number::NO_NEXT_HEADER => None,
            n => Some(ProtocolId::IpNumber(n)),
        }
    }
}
