//! Cache Key Module
//!
//! Deterministic, collision-resistant key derivation from a namespace and
//! an ordered list of parts.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

// == Make Key ==
/// Derives a cache key of the form `<namespace>:<digest>`.
///
/// The parts are joined with `|`, hashed with SHA-256, and the digest is
/// encoded as URL-safe base64 without padding. Identical part sequences
/// always produce the same key; distinct sequences collide only with
/// cryptographic-hash odds.
pub fn make_key<S: AsRef<str>>(namespace: &str, parts: &[S]) -> String {
    let serialized = parts
        .iter()
        .map(|part| part.as_ref())
        .collect::<Vec<_>>()
        .join("|");
    let digest = Sha256::digest(serialized.as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    format!("{}:{}", namespace, encoded)
}
