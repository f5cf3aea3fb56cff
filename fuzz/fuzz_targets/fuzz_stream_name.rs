//! Fuzz target for stream name parsing and derivation.
//!
//! Derived names must always be valid, deterministic and within the
//! service's length limit, whatever the logical id and request token.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_stream_name -- -max_total_time=600

#![no_main]

use arbitrary::Arbitrary;
use conveyor_backend::ids::{StreamName, MAX_STREAM_NAME_LEN};
use conveyor_handler::naming::derive_stream_name;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct NameInput {
    raw: String,
    logical_id: String,
    request_token: String,
}

fuzz_target!(|input: NameInput| {
    // Skip very long strings to avoid memory issues
    if input.raw.len() > 1000 || input.logical_id.len() > 1000 || input.request_token.len() > 1000 {
        return;
    }

    if let Ok(name) = StreamName::parse(input.raw.clone()) {
        assert_eq!(name.as_str(), input.raw);
        assert!(name.as_str().len() <= MAX_STREAM_NAME_LEN);
    }

    let derived = derive_stream_name(&input.logical_id, &input.request_token)
        .expect("derived names are always valid");
    assert!(derived.as_str().len() <= MAX_STREAM_NAME_LEN);
    assert!(StreamName::parse(derived.as_str()).is_ok());

    let again = derive_stream_name(&input.logical_id, &input.request_token)
        .expect("derived names are always valid");
    assert_eq!(derived, again);
});
