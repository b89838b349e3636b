//! Internet checksum (RFC 1071) and the IPv4/IPv6 pseudo-headers used by
//! TCP, UDP and ICMPv6.
//!
//! Nothing here runs implicitly: parsers never verify checksums and
//! serializers write whatever value the header carries. Callers fill them in
//! through the per-header `fill_checksum*` helpers before building.

use crate::core::byte_order::{to_host_order16, to_network_order16, to_network_order32};
use std::net::{Ipv4Addr, Ipv6Addr};

/// One's-complement sum over several discontiguous slices, as if they were
/// a single buffer. Odd-length parts carry their last byte into the next part.
pub fn checksum_of(parts: &[&[u8]]) -> u16 {
    let mut sum: u64 = 0;
    let mut pending: Option<u8> = None;

    for part in parts {
        for &byte in part.iter() {
            match pending.take() {
                Some(high) => sum += u64::from(to_host_order16([high, byte])),
                None => pending = Some(byte),
            }
        }
    }

    // Trailing odd byte is padded with zero
    if let Some(high) = pending {
        sum += u64::from(high) << 8;
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !(sum as u16)
}

/// RFC 1071 checksum over one contiguous buffer.
pub fn internet_checksum(data: &[u8]) -> u16 {
    checksum_of(&[data])
}

/// A buffer whose embedded checksum is correct sums to zero.
pub fn is_valid(data: &[u8]) -> bool {
    internet_checksum(data) == 0
}

/// IPv4 pseudo-header: src, dst, zero, protocol, upper-layer length.
pub fn pseudo_header_v4(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, length: u16) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[0..4].copy_from_slice(&src.octets());
    out[4..8].copy_from_slice(&dst.octets());
    out[9] = protocol;
    out[10..12].copy_from_slice(&to_network_order16(length));
    out
}

/// IPv6 pseudo-header (RFC 8200 section 8.1): src, dst, 32-bit length,
/// three zero bytes, next header.
pub fn pseudo_header_v6(src: Ipv6Addr, dst: Ipv6Addr, next_header: u8, length: u32) -> [u8; 40] {
    let mut out = [0u8; 40];
    out[0..16].copy_from_slice(&src.octets());
    out[16..32].copy_from_slice(&dst.octets());
    out[32..36].copy_from_slice(&to_network_order32(length));
    out[39] = next_header;
    out
}
