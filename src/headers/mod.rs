//! # Header Kinds
//!
//! One module per protocol layout. Each type implements
//! [`HeaderCodec`](crate::core::header::HeaderCodec) and converts into the
//! [`Header`](crate::core::header::Header) sum type.
//!
//! | Type | Standard | Wire length |
//! |------|----------|-------------|
//! | [`Ipv4Header`] | RFC 791 | 20-60 |
//! | [`Ipv6Header`] | RFC 8200 | 40 |
//! | [`HopByHopHeader`], [`RoutingHeader`], [`DestinationOptionsHeader`] | RFC 8200 | 8-2048 |
//! | [`IcmpHeader`] | RFC 792 | 4 |
//! | [`Icmpv6Header`] | RFC 4443 | 4 |
//! | [`EchoHeader`] | RFC 792 / RFC 4443 | 4 |
//! | [`TcpHeader`] | RFC 9293 | 20-60 |
//! | [`UdpHeader`] | RFC 768 | 8 |
//! | [`IgmpHeader`] | RFC 2236 | 8 |

pub mod echo;
pub mod icmp;
pub mod igmp;
pub mod ipv4;
pub mod ipv6;
pub mod ipv6_ext;
pub mod tcp;
pub mod udp;

pub use echo::EchoHeader;
pub use icmp::{IcmpHeader, Icmpv6Header};
pub use igmp::IgmpHeader;
pub use ipv4::Ipv4Header;
pub use ipv6::Ipv6Header;
pub use ipv6_ext::{DestinationOptionsHeader, HopByHopHeader, Ipv6ExtensionHeader, RoutingHeader};
pub use tcp::{TcpFlags, TcpHeader};
pub use udp::UdpHeader;
