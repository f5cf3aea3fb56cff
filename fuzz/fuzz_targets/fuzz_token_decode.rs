//! Fuzz target for continuation token decoding.
//!
//! Decoding arbitrary strings must never panic, and any token that does
//! decode must survive a re-encode.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_token_decode -- -max_total_time=600

#![no_main]

use conveyor_handler::ContinuationToken;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(token) = ContinuationToken::decode(input) {
        let reencoded = token.encode();
        let decoded = ContinuationToken::decode(&reencoded).expect("re-encoded token must decode");
        assert_eq!(decoded, token);

        let next = token.next("CREATING");
        assert!(next.retries_remaining <= token.retries_remaining);
    }
});
