//! Message digest algorithms.

use std::fmt;

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use super::FieldType;
use crate::error::Rejection;

/// A message digest algorithm of the SHA-2 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// All supported algorithms.
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
    ];

    /// Standard name, e.g. `SHA-256`.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha224 => "SHA-224",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Length of a digest in bytes.
    pub fn length(&self) -> usize {
        match self {
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Digest `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Digest `data` and render it as lower-case hex.
    pub fn digest_hex(&self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest algorithms by standard name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestType;

impl FieldType for DigestType {
    type Value = DigestAlgorithm;

    fn type_name(&self) -> &'static str {
        "digest"
    }

    fn parse(&self, raw: &str) -> Result<DigestAlgorithm, Rejection> {
        DigestAlgorithm::ALL
            .into_iter()
            .find(|a| a.name() == raw)
            .ok_or_else(|| {
                let names: Vec<&str> = DigestAlgorithm::ALL.iter().map(|a| a.name()).collect();
                Rejection::new(format!(
                    "must specify a digest algorithm, one of [{}], but was '{}'",
                    names.join(", "),
                    raw
                ))
            })
    }

    fn render(&self, value: &DigestAlgorithm) -> String {
        value.name().to_string()
    }
}
