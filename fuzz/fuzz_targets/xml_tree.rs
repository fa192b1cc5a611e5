#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = dotxml::from_bytes(data) {
        let _ = root.to_string();
    }
});
