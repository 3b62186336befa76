#![no_main]

use libfuzzer_sys::fuzz_target;
use slidecarve::carving::carve;

fuzz_target!(|data: &[u8]| {
    let result = carve(data);
    for candidate in result.iter() {
        assert_eq!(candidate.bytes, &data[candidate.range()]);
        assert!(candidate.len() >= candidate.format.min_len());
    }
});
