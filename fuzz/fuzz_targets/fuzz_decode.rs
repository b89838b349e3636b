#![no_main]

use libfuzzer_sys::fuzz_target;
use raw_headers::{LayeredDecoder, ProtocolId, UnknownProtocolPolicy};

fuzz_target!(|data: &[u8]| {
    // Layered decode of arbitrary bytes - test for panics, out-of-bounds reads, runaway chains
    let Some((&seed, rest)) = data.split_first() else {
        return;
    };
    let decoder = LayeredDecoder::standard();
    let _ = decoder.decode_ip(rest);
    let _ = decoder.decode(rest, ProtocolId::IpNumber(seed));

    let lenient = decoder.with_unknown_policy(UnknownProtocolPolicy::TreatAsPayload);
    if let Ok(packet) = lenient.decode(rest, ProtocolId::IpNumber(seed)) {
        assert!(packet.headers.len() <= lenient.max_chain_depth());
        assert_eq!(packet.header_bytes() + packet.payload.len(), rest.len());
    }
});
