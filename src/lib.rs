//! # raw-headers
//!
//! Bounds-checked encoders and decoders for IP-layer protocol headers, a
//! registry-driven layered decoder, and a packet builder for raw sockets.
//!
//! ## Layout
//! - [`core`]: byte order, cursors, checksums and the [`HeaderCodec`] contract
//! - [`headers`]: IPv4, IPv6 and its extension headers, ICMP, ICMPv6, echo,
//!   TCP, UDP and IGMP
//! - [`protocol`]: [`HeaderRegistry`], [`LayeredDecoder`] and [`PacketBuilder`]
//! - [`transport`]: the raw socket boundary; nothing else performs I/O
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging and metrics
//!
//! ## Example
//! ```rust
//! use raw_headers::core::header::ip_number;
//! use raw_headers::headers::{EchoHeader, Icmpv6Header, Ipv6Header};
//! use raw_headers::{HeaderKind, LayeredDecoder, PacketBuilder};
//! use std::net::Ipv6Addr;
//!
//! let payload = [0xAA, 0xBB, 0xCC, 0xDD];
//! let localhost = Ipv6Addr::LOCALHOST;
//! let ip = Ipv6Header::new(localhost, localhost, ip_number::ICMPV6, 8 + payload.len())?;
//! let packet = PacketBuilder::new()
//!     .header(ip)
//!     .header(Icmpv6Header::echo_request())
//!     .header(EchoHeader::new(1, 42))
//!     .payload(&payload)
//!     .build()?;
//!
//! let decoded = LayeredDecoder::standard().decode_ip(packet.as_bytes())?;
//! assert_eq!(decoded.headers.len(), 3);
//! assert_eq!(decoded.last().map(|h| h.kind()), Some(HeaderKind::Echo));
//! assert_eq!(decoded.payload, &payload);
//! # Ok::<(), raw_headers::ProtocolError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod headers;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::config::{Config, DecoderConfig, UnknownProtocolPolicy};
pub use crate::core::header::{Header, HeaderCodec, HeaderKind, ProtocolId};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{
    build, BuiltPacket, DecodedPacket, HeaderRegistry, LayeredDecoder, PacketBuilder,
    PacketSegment,
};
pub use crate::transport::{LoopbackTransport, RawTransport};
#[cfg(unix)]
pub use crate::transport::{IpFamily, RawSocket};
