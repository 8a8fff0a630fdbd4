//! Stateless signing primitives.
//!
//! Pure functions over already-resolved secret material; no store access.
//! All outputs are lower-case hex.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// HMAC algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HmacAlgorithm {
    /// Canonical algorithm name as used by interoperating systems.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Md5 => "HmacMD5",
            Self::Sha1 => "HmacSHA1",
            Self::Sha256 => "HmacSHA256",
            Self::Sha512 => "HmacSHA512",
        }
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Digest algorithm selection for `hash(data ++ secret)` signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    /// Canonical algorithm name as used by interoperating systems.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA-256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Compute the HMAC of `data` keyed by `key`, as a lower-case hex digest.
pub fn hmac_hex(data: &str, key: &[u8], algorithm: HmacAlgorithm) -> String {
    match algorithm {
        HmacAlgorithm::Md5 => mac_hex::<Hmac<Md5>>(data, key),
        HmacAlgorithm::Sha1 => mac_hex::<Hmac<Sha1>>(data, key),
        HmacAlgorithm::Sha256 => mac_hex::<Hmac<Sha256>>(data, key),
        HmacAlgorithm::Sha512 => mac_hex::<Hmac<Sha512>>(data, key),
    }
}

/// Compute the lower-case hex hash of `data ++ secret`.
///
/// The secret is appended, not prepended; systems verifying the same
/// signature depend on this exact ordering.
pub fn digest_hex(data: &str, secret: &str, algorithm: DigestAlgorithm) -> String {
    match algorithm {
        DigestAlgorithm::Md5 => hash_hex::<Md5>(data, secret),
        DigestAlgorithm::Sha256 => hash_hex::<Sha256>(data, secret),
    }
}

fn mac_hex<M: Mac + KeyInit>(data: &str, key: &[u8]) -> String {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn hash_hex<D: Digest>(data: &str, secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(data.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 1.
    #[test]
    fn hmac_sha256_matches_reference_vector() {
        let key = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").unwrap();
        assert_eq!(
            hmac_hex("Hi There", &key, HmacAlgorithm::Sha256),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn hmac_sha512_matches_reference_vector() {
        let key = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").unwrap();
        assert_eq!(
            hmac_hex("Hi There", &key, HmacAlgorithm::Sha512),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    // RFC 2202-style "quick brown fox" vectors.
    #[test]
    fn hmac_md5_matches_reference_vector() {
        assert_eq!(
            hmac_hex(
                "The quick brown fox jumps over the lazy dog",
                b"key",
                HmacAlgorithm::Md5
            ),
            "80070713463e7749b90c2dc24911e275"
        );
    }

    #[test]
    fn hmac_sha1_matches_reference_vector() {
        assert_eq!(
            hmac_hex(
                "The quick brown fox jumps over the lazy dog",
                b"key",
                HmacAlgorithm::Sha1
            ),
            "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9"
        );
    }

    #[test]
    fn digest_appends_secret() {
        assert_eq!(
            digest_hex("invoiceId=123&amount=222", "Parolec1", DigestAlgorithm::Md5),
            "870196c774151da4a80b077c0cbcee51"
        );
        assert_eq!(
            digest_hex(
                "invoiceId=123&amount=222",
                "Parolec1",
                DigestAlgorithm::Sha256
            ),
            "4b26668c8b9b3d39a5ed0a12d8b5ee2f623ffe8787c04a68646f46fa44433343"
        );
    }

    #[test]
    fn output_is_lower_case_hex() {
        let sig = hmac_hex("payload", b"\x01\x02", HmacAlgorithm::Sha256);
        assert_eq!(sig.len(), 64);
        assert!(sig
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn canonical_names() {
        assert_eq!(HmacAlgorithm::Md5.canonical_name(), "HmacMD5");
        assert_eq!(HmacAlgorithm::Sha1.canonical_name(), "HmacSHA1");
        assert_eq!(HmacAlgorithm::Sha256.canonical_name(), "HmacSHA256");
        assert_eq!(HmacAlgorithm::Sha512.canonical_name(), "HmacSHA512");
        assert_eq!(DigestAlgorithm::Md5.canonical_name(), "MD5");
        assert_eq!(DigestAlgorithm::Sha256.canonical_name(), "SHA-256");
    }
}
