//! E-mail confirmation codes
//!
//! Codes are 32 random bytes rendered as unpadded base64url. Only the
//! SHA-256 digest is persisted, so a leaked table cannot be replayed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const CODE_BYTES: usize = 32;

/// Generate a fresh confirmation code (shown to the user exactly once).
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Digest stored in place of the code
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Percent-encode a code for use in a query string.
pub fn encode_code(code: &str) -> String {
    url::form_urlencoded::byte_serialize(code.as_bytes()).collect()
}
