//! SHA256 + base36 identifiers for users and session tokens.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

/// Base36 alphabet (0-9, a-z).
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated user ids (without prefix).
pub const USER_ID_LEN: usize = 12;

/// Length of generated session tokens. 32 random bytes need at most 50 base36 digits.
pub const SESSION_TOKEN_LEN: usize = 50;

/// Converts a byte slice to a base36 string of exactly `length` characters.
///
/// Short results are zero-padded; long results keep the least significant digits.
pub fn encode_base36(data: &[u8], length: usize) -> String {
    let mut num = BigUint::from_bytes_be(data);
    let base = BigUint::from(36u32);

    // Least-significant digit first.
    let mut digits: Vec<char> = Vec::with_capacity(length);
    while !num.is_zero() {
        let rem = &num % &base;
        num /= &base;
        let idx = rem.to_u32_digits().first().copied().unwrap_or(0) as usize;
        digits.push(char::from(BASE36_ALPHABET[idx]));
    }
    while digits.len() < length {
        digits.push('0');
    }
    digits.truncate(length);
    digits.iter().rev().collect()
}

/// Creates a user id from the user's identity and creation time.
pub fn generate_user_id(name: &str, email: &str, timestamp: DateTime<Utc>, nonce: u32) -> String {
    let content = format!(
        "{}|{}|{}|{}",
        name,
        email,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        nonce
    );
    let hash = Sha256::digest(content.as_bytes());
    format!("u-{}", encode_base36(&hash[..8], USER_ID_LEN))
}

/// Creates a fresh random bearer token.
pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::random();
    encode_base36(&bytes, SESSION_TOKEN_LEN)
}

/// Hex SHA256 of a session token. Only the hash is persisted.
pub fn hash_session_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
