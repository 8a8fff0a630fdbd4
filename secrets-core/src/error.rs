use crate::types::SecretRef;
use thiserror::Error;

/// Result alias for secret service operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Result alias for store backend operations.
pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Canonical error surface raised by [`crate::SecretService`].
///
/// "Not found", "empty" and "malformed" are distinct conditions and are never
/// conflated, with one deliberate exception: a versioned bulk read treats a
/// record whose values are all blank the same as a missing record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No record exists at the path for a plain bulk read.
    #[error("no secrets stored at path {path}")]
    PathNotFound { path: String },
    /// No record exists, or every stored value is blank, for a versioned bulk read.
    #[error("secrets missing or empty at path {path}")]
    SecretsNotFound { path: String },
    /// The path has no record or the requested key is absent from it.
    #[error("secret not found: {secret_ref}")]
    SecretNotFound { secret_ref: SecretRef },
    /// A secret expected to be hex-encoded failed to decode. The message
    /// names the reference only, never the stored value.
    #[error("secret must be hex-encoded: {secret_ref}")]
    HexDecode { secret_ref: SecretRef },
    /// A check-and-set write's expected version did not match the store.
    #[error("check-and-set version did not match the current version for path {path}")]
    AlreadyModified { path: String },
    /// Opaque store failure unrelated to versioning, passed through unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors reported by [`crate::SecretStore`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The write's version precondition failed at the store.
    #[error("version conflict writing path {path}")]
    VersionConflict { path: String },
    /// Transport or backend failure; the text carries whatever the store reported.
    #[error("secret store error: {0}")]
    Backend(String),
}
