use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use raw_headers::core::header::ip_number;
use raw_headers::headers::{EchoHeader, HopByHopHeader, Icmpv6Header, Ipv6Header};
use raw_headers::{LayeredDecoder, PacketBuilder};
use std::net::Ipv6Addr;

#[allow(clippy::unwrap_used)]
fn bench_build_and_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("ping6_build_decode");
    let decoder = LayeredDecoder::standard();
    let payload_sizes = [0usize, 56, 512, 1452];

    for &size in &payload_sizes {
        let payload = vec![0u8; size];
        let ip = Ipv6Header::new(
            Ipv6Addr::LOCALHOST,
            Ipv6Addr::LOCALHOST,
            ip_number::HOP_BY_HOP,
            8 + 8 + size,
        )
        .unwrap();
        let hop = HopByHopHeader::with_padding(ip_number::ICMPV6, &[]);

        group.throughput(Throughput::Bytes((56 + size) as u64));
        group.bench_function(format!("build_{size}b"), |b| {
            b.iter_batched(
                || {
                    PacketBuilder::new()
                        .header(ip.clone())
                        .header(hop.clone())
                        .header(Icmpv6Header::echo_request())
                        .header(EchoHeader::new(1, 1))
                        .payload(&payload)
                },
                |builder| builder.build().unwrap(),
                BatchSize::SmallInput,
            )
        });

        let packet = PacketBuilder::new()
            .header(ip)
            .header(hop)
            .header(Icmpv6Header::echo_request())
            .header(EchoHeader::new(1, 1))
            .payload(&payload)
            .build()
            .unwrap();
        group.bench_function(format!("decode_{size}b"), |b| {
            b.iter(|| {
                let decoded = decoder.decode_ip(&packet).unwrap();
                assert_eq!(decoded.headers.len(), 4);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_and_decode);
criterion_main!(benches);
