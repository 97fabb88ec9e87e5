//! Request signing for authenticated uploads.
//!
//! The signature is the SHA-1 hex digest of the signed parameters sorted by
//! name, rendered as `name=value` joined with `&`, with the API secret
//! appended.

use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// Parameters that travel with the request but are never signed.
const UNSIGNED_PARAMS: &[&str] = &["file", "api_key", "resource_type", "cloud_name"];

pub(crate) fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .filter(|(key, value)| !UNSIGNED_PARAMS.contains(key) && !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
