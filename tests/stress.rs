use raw_headers::core::header::ip_number;
use raw_headers::headers::{HopByHopHeader, Ipv4Header, TcpFlags, TcpHeader, UdpHeader};
use raw_headers::{build, HeaderCodec, LayeredDecoder, ProtocolError, ProtocolId};
use std::net::Ipv4Addr;

#[test]
fn stress_build_decode_large_series() {
    // Heavy burst of packets across payload sizes; no panics, no drift
    let decoder = LayeredDecoder::standard();
    let src = Ipv4Addr::new(10, 1, 1, 1);
    let dst = Ipv4Addr::new(10, 1, 1, 2);

    for size in [0usize, 1, 64, 512, 1472, 65_507] {
        let payload = vec![0x5Au8; size];
        for i in 0..2_000u32 {
            let mut udp = UdpHeader::for_payload((i & 0xFFFF) as u16, 53, size).unwrap();
            udp.fill_checksum_v4(src, dst, &payload);
            let mut ip = Ipv4Header::new(src, dst, ip_number::UDP, udp.length as usize).unwrap();
            ip.identification = i as u16;
            ip.fill_checksum().unwrap();

            let packet = build(&[ip.into(), udp.into()], &payload).unwrap();
            let decoded = decoder.decode_ip(&packet).unwrap();
            assert_eq!(decoded.headers.len(), 2);
            assert_eq!(decoded.payload.len(), size);
        }
    }
}

#[test]
fn stress_tcp_with_options() {
    let decoder = LayeredDecoder::standard();
    for words in 0..=10usize {
        let mut tcp = TcpHeader::new(40000, 443, 1, 1, TcpFlags::SYN_ACK);
        tcp.options = vec![1; words * 4];
        let ip = Ipv4Header::new(
            Ipv4Addr::LOCALHOST,
            Ipv4Addr::LOCALHOST,
            ip_number::TCP,
            tcp.header_len(),
        )
        .unwrap();

        let packet = build(&[ip.into(), tcp.clone().into()], &[]).unwrap();
        let decoded = decoder.decode_ip(&packet).unwrap();
        assert_eq!(decoded.last(), Some(&tcp.into()));
        assert!(decoded.payload.is_empty());
    }
}

#[test]
fn stress_hostile_chain_is_bounded() {
    // Megabytes of self-referencing hop-by-hop headers still stop at the cap
    let hop = HopByHopHeader::with_padding(ip_number::HOP_BY_HOP, &[0; 2046 - 8]);
    let one = build(&[hop.into()], &[]).unwrap();
    let mut bytes = Vec::with_capacity(one.len() * 1024);
    for _ in 0..1024 {
        bytes.extend_from_slice(&one);
    }

    let decoder = LayeredDecoder::standard();
    for _ in 0..100 {
        assert!(matches!(
            decoder.decode(&bytes, ProtocolId::IpNumber(ip_number::HOP_BY_HOP)),
            Err(ProtocolError::ExcessiveHeaderChain(16))
        ));
    }
}
