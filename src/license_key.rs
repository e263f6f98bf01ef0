//! License key generation and validation.
//!
//! Keys have the fixed format `HL-XXXX-XXXX-XXXX-XXXX`, where every `X` is an
//! uppercase hexadecimal digit. The 64 random bits behind a key come from the
//! thread-local CSPRNG, so a key says nothing about the keys issued before it.
//!
//! # Example
//!
//! ```
//! use central::license_key::{generate_license_key, validate_license_key_format};
//!
//! let key = generate_license_key();
//! assert!(validate_license_key_format(&key));
//! assert!(!validate_license_key_format("HL-1234"));
//! ```

use rand::Rng;

/// Prefix shared by every key.
pub const LICENSE_KEY_PREFIX: &str = "HL";

/// Number of hex segments after the prefix.
pub const LICENSE_KEY_SEGMENTS: usize = 4;

/// Hex digits per segment.
pub const LICENSE_KEY_SEGMENT_LENGTH: usize = 4;

/// Generate a fresh license key.
pub fn generate_license_key() -> String {
    let mut bytes = [0u8; LICENSE_KEY_SEGMENTS * LICENSE_KEY_SEGMENT_LENGTH / 2];
    rand::rng().fill(&mut bytes[..]);

    let segments: Vec<String> = bytes
        .chunks(LICENSE_KEY_SEGMENT_LENGTH / 2)
        .map(hex::encode_upper)
        .collect();

    format!("{}-{}", LICENSE_KEY_PREFIX, segments.join("-"))
}

/// Check that `key` has the exact `HL-XXXX-XXXX-XXXX-XXXX` shape.
///
/// Lowercase hex is rejected: generated keys are always uppercase.
pub fn validate_license_key_format(key: &str) -> bool {
    let mut parts = key.split('-');

    if parts.next() != Some(LICENSE_KEY_PREFIX) {
        return false;
    }

    let mut segments = 0;
    for segment in parts {
        segments += 1;
        if segment.len() != LICENSE_KEY_SEGMENT_LENGTH
            || !segment
                .chars()
                .all(|ch| ch.is_ascii_digit() || ('A'..='F').contains(&ch))
        {
            return false;
        }
    }

    segments == LICENSE_KEY_SEGMENTS
}
