//! Deterministic stream name derivation.
//!
//! When the desired model leaves the name unset, the engine generates one
//! from the caller's logical id and request token. The same inputs always
//! produce the same name, so a retried submission of one logical request
//! targets the same stream.

use sha2::{Digest, Sha256};

use conveyor_backend::ids::{is_name_char, NameError, StreamName, MAX_STREAM_NAME_LEN};

use crate::model::{NamingInputs, ResourceModel};

/// Hex characters of the digest appended to the prefix.
const SUFFIX_LEN: usize = 12;

/// Prefix used when the logical id has no usable characters.
const FALLBACK_PREFIX: &str = "stream";

/// Derive a stream name as `<prefix>-<suffix>`.
///
/// The suffix is the first 12 hex characters of
/// `SHA-256(logical_id ":" request_token)`. The prefix is the logical id with
/// characters outside `[A-Za-z0-9_.-]` dropped, truncated so the whole name
/// fits in 64 characters.
///
/// The result is still run through [`StreamName::parse`], so the returned
/// name is always one every backend accepts.
pub fn derive_stream_name(logical_id: &str, request_token: &str) -> Result<StreamName, NameError> {
    let mut hasher = Sha256::new();
    hasher.update(logical_id.as_bytes());
    hasher.update(b":");
    hasher.update(request_token.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let suffix = &digest[..SUFFIX_LEN];

    let max_prefix = MAX_STREAM_NAME_LEN - SUFFIX_LEN - 1;
    let mut prefix: String = logical_id
        .chars()
        .filter(|c| is_name_char(*c))
        .take(max_prefix)
        .collect();
    if prefix.is_empty() {
        prefix = FALLBACK_PREFIX.to_string();
    }

    StreamName::parse(format!("{prefix}-{suffix}"))
}

/// Name a create chain targets: the desired name if set, otherwise derived.
pub fn resolve_name(
    resource: &ResourceModel,
    naming: &NamingInputs,
) -> Result<StreamName, NameError> {
    match &resource.delivery_stream_name {
        Some(name) => Ok(name.clone()),
        None => derive_stream_name(&naming.logical_id, &naming.request_token),
    }
}
