//! SHA-512 truncation digest.
//!
//! A digest is the first N bytes of the raw SHA-512 output, base64url encoded
//! with `=` padding. With the default N = 24 this is the familiar
//! `sha512t24u` token of 32 characters, which never needs padding.

use std::fmt::Display;

use sha2::{Digest, Sha512};

use vmc_core::consts::{DEFAULT_DIGEST_LENGTH, MAX_DIGEST_LENGTH};
use vmc_core::{Result, VmcError};

/// Number of leading SHA-512 bytes kept before encoding. Always in `1..=64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigestLength(usize);

impl DigestLength {
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 || length > MAX_DIGEST_LENGTH {
            return Err(VmcError::InvalidDigestLength(length));
        }
        Ok(Self(length))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for DigestLength {
    fn default() -> Self {
        Self(DEFAULT_DIGEST_LENGTH)
    }
}

impl TryFrom<usize> for DigestLength {
    type Error = VmcError;

    fn try_from(length: usize) -> Result<Self> {
        Self::new(length)
    }
}

impl Display for DigestLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest `bytes` and keep `length` raw bytes of the hash, base64url encoded.
pub fn digest(bytes: &[u8], length: DigestLength) -> String {
    let mut hasher = Sha512::new();
    hasher.update(bytes);
    let hash = hasher.finalize();
    encode_padded(&hash[..length.get()])
}

/// URL-safe base64 with trailing `=` so the token is a multiple of 4 chars.
fn encode_padded(bytes: &[u8]) -> String {
    let mut token = base64_url::encode(bytes);
    match bytes.len() % 3 {
        1 => token.push_str("=="),
        2 => token.push('='),
        _ => {}
    }
    token
}

/// SHA-512 truncated to 24 bytes, base64url-encoded.
pub fn sha512t24u<T: AsRef<[u8]>>(input: T) -> String {
    digest(input.as_ref(), DigestLength::default())
}

/// Incremental form of [`digest`], for content that arrives in pieces.
///
/// Feeding the pieces of a byte string in order yields the same token as
/// digesting the concatenation at once.
#[derive(Clone, Default)]
pub struct StreamingDigest {
    hasher: Sha512,
    consumed: usize,
}

impl StreamingDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
        self.consumed += bytes.len();
    }

    /// Total bytes fed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn finish(self, length: DigestLength) -> String {
        let hash = self.hasher.finalize();
        encode_padded(&hash[..length.get()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("", "z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXc")]
    #[case("ACGT", "aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2")]
    #[case("TTGGGGAA", "iYtREV555dUFKg2_agSJW6suquUyPpMw")]
    fn test_sha512t24u_known_values(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sha512t24u(input), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(65)]
    #[case(1000)]
    fn test_digest_length_rejects_out_of_range(#[case] length: usize) {
        let err = DigestLength::new(length).unwrap_err();
        assert!(matches!(err, VmcError::InvalidDigestLength(n) if n == length));
    }

    #[rstest]
    #[case(1, 4, 2)]
    #[case(2, 4, 1)]
    #[case(3, 4, 0)]
    #[case(20, 28, 1)]
    #[case(24, 32, 0)]
    #[case(64, 88, 2)]
    fn test_token_length_follows_truncation(
        #[case] length: usize,
        #[case] chars: usize,
        #[case] padding: usize,
    ) {
        let token = digest(b"ACGT", DigestLength::new(length).unwrap());
        assert_eq!(token.len(), chars);
        assert_eq!(token.len() - token.trim_end_matches('=').len(), padding);
        assert!(!token.contains('+') && !token.contains('/'));
    }

    #[rstest]
    fn test_partial_group_is_padded() {
        let token = digest(b"ACGT", DigestLength::new(20).unwrap());
        assert_eq!(token, "aKF498dAxcJAqme6QYQ7EZ07-fg=");
    }

    #[rstest]
    fn test_streaming_pads_like_one_shot() {
        let length = DigestLength::new(13).unwrap();
        let mut stream = StreamingDigest::new();
        stream.update(b"AC");
        stream.update(b"GT");
        let token = stream.finish(length);
        assert!(token.ends_with("=="));
        assert_eq!(token, digest(b"ACGT", length));
    }

    #[rstest]
    fn test_truncation_is_prefix_of_full_hash() {
        // Shorter truncations keep a prefix of the raw hash, so whole 3-byte
        // groups encode identically.
        let short = digest(b"ACGT", DigestLength::new(12).unwrap());
        let long = sha512t24u("ACGT");
        assert!(long.starts_with(&short));
    }

    #[rstest]
    fn test_digest_is_deterministic() {
        let length = DigestLength::default();
        assert_eq!(digest(b"GATTACA", length), digest(b"GATTACA", length));
    }

    #[rstest]
    fn test_single_byte_changes_digest() {
        let base = b"ACGTACGTACGTACGTACGTACGTACGTACGT".to_vec();
        let reference = sha512t24u(&base);
        let mut seen = std::collections::HashSet::new();
        for i in 0..base.len() {
            for substitute in [b'A', b'C', b'G', b'T', b'N'] {
                if base[i] == substitute {
                    continue;
                }
                let mut mutated = base.clone();
                mutated[i] = substitute;
                let token = sha512t24u(&mutated);
                assert_ne!(token, reference);
                assert!(seen.insert(token), "collision at position {}", i);
            }
        }
    }

    #[rstest]
    fn test_streaming_matches_one_shot() {
        let content = b"ACGTNNNNacgtTTGGGGAA";
        let length = DigestLength::default();
        for split in 0..content.len() {
            let mut stream = StreamingDigest::new();
            stream.update(&content[..split]);
            stream.update(&content[split..]);
            assert_eq!(stream.consumed(), content.len());
            assert_eq!(stream.finish(length), digest(content, length));
        }
    }
}
