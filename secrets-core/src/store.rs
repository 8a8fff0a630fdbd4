use crate::error::StoreResult;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod memory;

/// Full record stored at one path, together with its version counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub values: BTreeMap<String, String>,
    pub version: u64,
}

/// Versioned key-value store contract implemented by provider backends.
///
/// A `service` names the per-service partition of the store under which all
/// of that service's paths live. Version counters are sequential and
/// store-enforced: every successful write yields exactly the previous
/// version plus one.
pub trait SecretStore: Send + Sync {
    /// Read the full record at `path`, or `None` when no record exists.
    fn read(&self, service: &str, path: &str) -> StoreResult<Option<VersionedRecord>>;

    /// Replace the record at `path` and return the new version.
    ///
    /// When `expected_version` is set, the store must perform the comparison
    /// and the swap as one atomic operation and report a mismatch as
    /// [`StoreError::VersionConflict`](crate::StoreError::VersionConflict).
    /// Implementations must not emulate this with a read followed by a
    /// write.
    fn write(
        &self,
        service: &str,
        path: &str,
        values: &BTreeMap<String, String>,
        expected_version: Option<u64>,
    ) -> StoreResult<u64>;
}

impl<T> SecretStore for Box<T>
where
    T: SecretStore + ?Sized,
{
    fn read(&self, service: &str, path: &str) -> StoreResult<Option<VersionedRecord>> {
        (**self).read(service, path)
    }

    fn write(
        &self,
        service: &str,
        path: &str,
        values: &BTreeMap<String, String>,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        (**self).write(service, path, values, expected_version)
    }
}

impl<T> SecretStore for Arc<T>
where
    T: SecretStore + ?Sized,
{
    fn read(&self, service: &str, path: &str) -> StoreResult<Option<VersionedRecord>> {
        (**self).read(service, path)
    }

    fn write(
        &self,
        service: &str,
        path: &str,
        values: &BTreeMap<String, String>,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        (**self).write(service, path, values, expected_version)
    }
}
