#![no_main]

use libfuzzer_sys::fuzz_target;
use raw_headers::HeaderKind;

fuzz_target!(|data: &[u8]| {
    // Every parser on arbitrary input; whatever parses must re-serialize to the same bytes
    for kind in HeaderKind::ALL {
        if let Ok((header, consumed)) = kind.parse(data) {
            assert!(consumed <= data.len());
            let bytes = header
                .serialize(&data[consumed..])
                .expect("parsed header serializes");
            assert_eq!(&bytes[..consumed], &data[..consumed]);
        }
    }
});
