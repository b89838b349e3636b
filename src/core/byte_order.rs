//! # Byte-Order Codec
//!
//! Host/network conversion for the 16- and 32-bit fields every header carries.
//!
//! Network order is big-endian. The conversions go through
//! `from_be_bytes`/`to_be_bytes`, which swap on little-endian hosts and are
//! the identity on big-endian hosts, so the result never depends on how the
//! host lays integers out in memory.

/// Decode a network-order 16-bit field into a host value.
#[inline]
pub const fn to_host_order16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Encode a host 16-bit value as network-order bytes.
#[inline]
pub const fn to_network_order16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Decode a network-order 32-bit field into a host value.
#[inline]
pub const fn to_host_order32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Encode a host 32-bit value as network-order bytes.
#[inline]
pub const fn to_network_order32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_order_is_big_endian() {
        assert_eq!(to_network_order16(0x0102), [0x01, 0x02]);
        assert_eq!(to_network_order32(0x0102_0304), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_host_order_decodes_big_endian() {
        assert_eq!(to_host_order16([0x00, 0x2A]), 42);
        assert_eq!(to_host_order32([0xDE, 0xAD, 0xBE, 0xEF]), 0xDEAD_BEEF);
    }

    #[test]
    fn test_conversions_are_inverse() {
        for value in [0u16, 1, 0x00FF, 0xFF00, 0x1234, u16::MAX] {
            assert_eq!(to_host_order16(to_network_order16(value)), value);
        }
        for value in [0u32, 1, 0x0000_FFFF, 0xFFFF_0000, 0x1234_5678, u32::MAX] {
            assert_eq!(to_host_order32(to_network_order32(value)), value);
        }
    }
}
