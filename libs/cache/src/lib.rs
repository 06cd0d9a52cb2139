//! A content-addressed cache for immutable, expensive-to-build values.
//!
//! Keys are arbitrary [`Serialize`] values. They are encoded with
//! [`flexbuffers`] and hashed with SHA-256, so two keys that serialize to the
//! same bytes address the same entry.
#![warn(missing_docs)]

use std::fmt::Display;
use std::ops::Deref;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod error;
pub mod mem;
#[cfg(test)]
pub(crate) mod tests;

pub use error::{Error, Result};

lazy_static! {
    /// A regex for matching valid namespaces.
    pub static ref NAMESPACE_REGEX: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*\.)*[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex");
}

/// A namespace used for addressing a set of cached items.
///
/// Must match the [`NAMESPACE_REGEX`](static@NAMESPACE_REGEX) regular expression.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Creates a new [`Namespace`], validating its format.
    ///
    /// ```
    /// use cache::Namespace;
    ///
    /// assert!(Namespace::new("photonix.bend_euler").is_ok());
    /// assert!(Namespace::new("1bad").is_err());
    /// ```
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        let namespace: String = namespace.into();
        if !Namespace::validate(&namespace) {
            return Err(Error::InvalidNamespace(namespace));
        }
        Ok(Self(namespace))
    }

    /// Returns `true` if the provided string is a valid namespace.
    pub fn validate(namespace: &str) -> bool {
        NAMESPACE_REGEX.is_match(namespace)
    }
}

impl Deref for Namespace {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The address of a cached value: a namespace plus the digest of a serialized key.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    namespace: Namespace,
    digest: Vec<u8>,
}

impl ContentKey {
    /// Hashes `key` into a content key within `namespace`.
    pub fn new<K: Serialize + ?Sized>(namespace: Namespace, key: &K) -> Result<Self> {
        let bytes = flexbuffers::to_vec(key)?;
        Ok(Self {
            namespace,
            digest: hash(&bytes),
        })
    }

    /// The namespace of this key.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The full SHA-256 digest, hex encoded.
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }

    /// The first `n` hex characters of the digest.
    ///
    /// Useful for deriving short, stable names from parameters.
    pub fn short_hex(&self, n: usize) -> String {
        let mut s = self.digest_hex();
        s.truncate(n);
        s
    }
}

impl Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.short_hex(12))
    }
}

pub(crate) fn hash(val: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(val);
    hasher.finalize()[..].into()
}
