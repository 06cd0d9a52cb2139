//! Cache error types.

/// The result type returned by cache key construction.
pub type Result<T> = std::result::Result<T, Error>;

/// A cache error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The namespace does not match [`NAMESPACE_REGEX`](static@crate::NAMESPACE_REGEX).
    #[error("invalid cache namespace `{0}`")]
    InvalidNamespace(String),
    /// The key could not be encoded for hashing.
    #[error("failed to serialize cache key: {0}")]
    Serialize(String),
}

impl From<flexbuffers::SerializationError> for Error {
    fn from(value: flexbuffers::SerializationError) -> Self {
        Self::Serialize(value.to_string())
    }
}
