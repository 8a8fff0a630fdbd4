//! Client-side access to a versioned key-value secret store for payment adapters.
//!
//! Adapters resolve per-terminal credentials by `(service, path, key)` and
//! derive message signatures from them without handling raw secret material
//! beyond the single call. The store itself is an external collaborator
//! reached through the [`SecretStore`] trait; this crate supplies the domain
//! types, the error taxonomy, the signing primitives, and the
//! [`SecretService`] client that ties them together.

pub mod error;
pub mod service;
pub mod sign;
pub mod store;
pub mod types;

pub use error::{Error, Result, StoreError, StoreResult};
pub use service::SecretService;
pub use sign::{DigestAlgorithm, HmacAlgorithm};
pub use store::{memory::MemoryStore, SecretStore, VersionedRecord};
pub use types::{SecretObj, SecretRef, SecretValue, VersionedSecret};
