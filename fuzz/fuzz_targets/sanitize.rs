#![no_main]

use libfuzzer_sys::fuzz_target;

// The two invariants worth fuzzing: every input either sanitizes to strict
// JSON or overflows the depth limit, and sanitizing a second time changes
// nothing.
fuzz_target!(|data: &[u8]| {
    match jsonscrub::sanitize(data) {
        Ok(once) => {
            let again = jsonscrub::sanitize(&once).expect("second pass cannot exceed depth");
            assert_eq!(&*again, &*once, "sanitization must be idempotent");
            // Inputs with broken UTF-8 keep their broken bytes inside string
            // bodies; the parse oracle only applies when the output is text.
            if let Ok(text) = core::str::from_utf8(&once) {
                if let Err(err) = serde_json::from_str::<serde_json::Value>(text) {
                    panic!("output {text:?} is not strict JSON: {err}");
                }
            }
        }
        Err(jsonscrub::SanitizeError::DepthExceeded(_)) => {}
        Err(err) => panic!("unexpected sanitizer failure: {err}"),
    }
});
