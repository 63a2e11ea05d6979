#![no_main]

use libfuzzer_sys::fuzz_target;
use layer_obfuscator::pipeline::Pipeline;
use layer_obfuscator::transforms::{digits_to_hex_tags, hex_tags_to_digits, shift_chars};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    if input.is_empty() || input.len() > 100_000 {
        return;
    }

    let pipeline = Pipeline::default();

    // Arbitrary text must decode to a value or an error, never a panic
    let _ = pipeline.decode(&input);

    // Anything that encodes must come back unchanged
    if let Ok(encoded) = pipeline.encode(&input) {
        let decoded = pipeline.decode(&encoded).expect("encoded output must decode");
        assert_eq!(decoded, input.as_ref());
    }

    let _ = shift_chars(&input, -3);
    let _ = shift_chars(&input, 3);
    let _ = digits_to_hex_tags(&input);
    let _ = hex_tags_to_digits(&input);
});
