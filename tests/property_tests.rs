//! Property-based tests using proptest
//!
//! These tests validate codec invariants across randomly generated headers,
//! payloads and raw byte buffers.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::collection::vec;
use proptest::prelude::*;
use raw_headers::headers::{
    DestinationOptionsHeader, EchoHeader, HopByHopHeader, IcmpHeader, Icmpv6Header, IgmpHeader,
    Ipv4Header, Ipv6Header, RoutingHeader, TcpFlags, TcpHeader, UdpHeader,
};
use raw_headers::{build, Header, HeaderKind, LayeredDecoder, ProtocolError, ProtocolId};
use std::net::{Ipv4Addr, Ipv6Addr};

fn arb_ipv4_addr() -> impl Strategy<Value = Ipv4Addr> {
    any::<[u8; 4]>().prop_map(Ipv4Addr::from)
}

fn arb_ipv6_addr() -> impl Strategy<Value = Ipv6Addr> {
    any::<[u8; 16]>().prop_map(Ipv6Addr::from)
}

/// Option bytes in 32-bit words, at most 40 bytes.
fn arb_word_options() -> impl Strategy<Value = Vec<u8>> {
    (0usize..=10).prop_flat_map(|words| vec(any::<u8>(), words * 4))
}

/// Extension data that pads the header to a multiple of 8.
fn arb_ext_data() -> impl Strategy<Value = Vec<u8>> {
    (1usize..=8).prop_flat_map(|units| vec(any::<u8>(), units * 8 - 2))
}

fn arb_ipv4() -> impl Strategy<Value = Ipv4Header> {
    (
        (0u8..64, 0u8..4, any::<u16>(), any::<u16>(), 0u8..8, 0u16..0x2000),
        (any::<u8>(), any::<u8>(), any::<u16>()),
        (arb_ipv4_addr(), arb_ipv4_addr(), arb_word_options()),
    )
        .prop_map(
            |(
                (dscp, ecn, total_length, identification, flags, fragment_offset),
                (ttl, protocol, checksum),
                (source, destination, options),
            )| Ipv4Header {
                dscp,
                ecn,
                total_length,
                identification,
                flags,
                fragment_offset,
                ttl,
                protocol,
                checksum,
                source,
                destination,
                options,
            },
        )
}

fn arb_ipv6() -> impl Strategy<Value = Ipv6Header> {
    (
        any::<u8>(),
        0u32..=0xF_FFFF,
        any::<u16>(),
        any::<u8>(),
        any::<u8>(),
        arb_ipv6_addr(),
        arb_ipv6_addr(),
    )
        .prop_map(
            |(traffic_class, flow_label, payload_length, next_header, hop_limit, source, destination)| {
                Ipv6Header {
                    traffic_class,
                    flow_label,
                    payload_length,
                    next_header,
                    hop_limit,
                    source,
                    destination,
                }
            },
        )
}

fn arb_tcp() -> impl Strategy<Value = TcpHeader> {
    (
        (any::<u16>(), any::<u16>(), any::<u32>(), any::<u32>()),
        (0u8..8, 0u16..0x200, any::<u16>(), any::<u16>(), any::<u16>()),
        arb_word_options(),
    )
        .prop_map(
            |(
                (source_port, destination_port, sequence_number, acknowledgment_number),
                (reserved, flags, window, checksum, urgent_pointer),
                options,
            )| TcpHeader {
                source_port,
                destination_port,
                sequence_number,
                acknowledgment_number,
                reserved,
                flags: TcpFlags(flags),
                window,
                checksum,
                urgent_pointer,
                options,
            },
        )
}

fn arb_header() -> impl Strategy<Value = Header> {
    prop_oneof![arb_layered_header(), arb_leaf_header()]
}

fn arb_layered_header() -> impl Strategy<Value = Header> {
    prop_oneof![
        arb_ipv4().prop_map(Header::from),
        arb_ipv6().prop_map(Header::from),
        (any::<u8>(), arb_ext_data())
            .prop_map(|(next, data)| Header::from(HopByHopHeader::new(next, data))),
        (any::<u8>(), arb_ext_data())
            .prop_map(|(next, data)| Header::from(RoutingHeader::new(next, data))),
        (any::<u8>(), arb_ext_data())
            .prop_map(|(next, data)| Header::from(DestinationOptionsHeader::new(next, data))),
    ]
}

fn arb_leaf_header() -> impl Strategy<Value = Header> {
    prop_oneof![
        arb_tcp().prop_map(Header::from),
        (any::<u8>(), any::<u8>(), any::<u16>()).prop_map(|(icmp_type, code, checksum)| {
            Header::from(IcmpHeader {
                icmp_type,
                code,
                checksum,
            })
        }),
        (any::<u8>(), any::<u8>(), any::<u16>()).prop_map(|(icmp_type, code, checksum)| {
            Header::from(Icmpv6Header {
                icmp_type,
                code,
                checksum,
            })
        }),
        (any::<u16>(), any::<u16>())
            .prop_map(|(id, seq)| Header::from(EchoHeader::new(id, seq))),
        any::<[u16; 4]>().prop_map(|[source_port, destination_port, length, checksum]| {
            Header::from(UdpHeader {
                source_port,
                destination_port,
                length,
                checksum,
            })
        }),
        (any::<u8>(), any::<u8>(), any::<u16>(), arb_ipv4_addr()).prop_map(
            |(igmp_type, max_response_time, checksum, group_address)| {
                Header::from(IgmpHeader {
                    igmp_type,
                    max_response_time,
                    checksum,
                    group_address,
                })
            }
        ),
    ]
}

// Property: parse(serialize(header, payload)) yields the header, its length and the payload
proptest! {
    #[test]
    fn prop_header_roundtrip(header in arb_header(), payload in vec(any::<u8>(), 0..256)) {
        let bytes = header.serialize(&payload).expect("valid header serializes");
        prop_assert_eq!(bytes.len(), header.header_len() + payload.len());

        let (parsed, consumed) = header.kind().parse(&bytes).expect("own output parses");
        prop_assert_eq!(consumed, header.header_len());
        prop_assert_eq!(&bytes[consumed..], &payload[..]);
        prop_assert_eq!(parsed, header);
    }
}

// Property: building is deterministic and equals the concatenation of each serialized header
proptest! {
    #[test]
    fn prop_build_is_concatenation(
        headers in vec(arb_header(), 0..5),
        payload in vec(any::<u8>(), 0..128),
    ) {
        let first = build(&headers, &payload).unwrap();
        let second = build(&headers, &payload).unwrap();
        prop_assert_eq!(&first, &second);

        let mut expected = Vec::new();
        for header in &headers {
            expected.extend_from_slice(&header.serialize(&[]).unwrap());
        }
        expected.extend_from_slice(&payload);
        prop_assert_eq!(first.as_bytes(), &expected[..]);
    }
}

// Property: any strict prefix of a serialized header is reported as truncated
proptest! {
    #[test]
    fn prop_short_prefix_is_truncated(header in arb_header(), cut in any::<prop::sample::Index>()) {
        let bytes = header.serialize(&[]).unwrap();
        let len = cut.index(bytes.len());
        let is_truncated = matches!(
            header.kind().parse(&bytes[..len]),
            Err(ProtocolError::TruncatedBuffer { .. })
        );
        prop_assert!(is_truncated);
    }
}

// Property: the layered decoder never panics and never exceeds its cap on arbitrary bytes
proptest! {
    #[test]
    fn prop_decode_arbitrary_bytes(bytes in vec(any::<u8>(), 0..512), seed in any::<u8>()) {
        let decoder = LayeredDecoder::standard();
        for id in [ProtocolId::IpNumber(seed), ProtocolId::IcmpType(seed), ProtocolId::Icmpv6Type(seed)] {
            if let Ok(packet) = decoder.decode(&bytes, id) {
                prop_assert!(packet.headers.len() <= decoder.max_chain_depth());
                prop_assert_eq!(packet.header_bytes() + packet.payload.len(), bytes.len());
            }
        }
        let _ = decoder.decode_ip(&bytes);
    }
}

// Property: echo identifiers are written big-endian whatever the host order
proptest! {
    #[test]
    fn prop_echo_fields_big_endian(id in any::<u16>(), seq in any::<u16>()) {
        let header = Header::from(EchoHeader::new(id, seq));
        let bytes = header.serialize(&[]).unwrap();
        prop_assert_eq!(&bytes[..], &[id.to_be_bytes(), seq.to_be_bytes()].concat()[..]);
        prop_assert_eq!(header.kind(), HeaderKind::Echo);
    }
}
