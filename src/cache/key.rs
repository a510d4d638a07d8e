//! Cache key generation using SHA-256 hashes

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Derive the canonical cache key for a request.
///
/// The key is a SHA-256 hash over the method, path, sorted query parameters,
/// and serialized body, so logically identical requests map to the same
/// entry regardless of parameter order.
pub fn cache_key(
    method: &str,
    path: &str,
    params: &[(String, String)],
    body: Option<&Value>,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(method.as_bytes());
    hasher.update(b"|");
    hasher.update(path.as_bytes());
    hasher.update(b"|");

    // Sort params for a deterministic key
    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by(|a, b| a.0.cmp(&b.0));

    for (k, v) in sorted_params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    hasher.update(b"|");
    if let Some(body) = body {
        hasher.update(body.to_string().as_bytes());
    }

    // Return hex-encoded hash
    format!("{:x}", hasher.finalize())
}
