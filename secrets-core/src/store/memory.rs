//! In-process reference store.
//!
//! Implements the full versioning and check-and-set contract without any
//! transport, for tests and local development. The comparison and swap
//! happen under one lock, so concurrent check-and-set writers observe the
//! same atomicity a real store provides.

use crate::error::{StoreError, StoreResult};
use crate::store::{SecretStore, VersionedRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<(String, String), VersionedRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn read(&self, service: &str, path: &str) -> StoreResult<Option<VersionedRecord>> {
        let guard = self.records.lock().unwrap();
        Ok(guard
            .get(&(service.to_string(), path.to_string()))
            .cloned())
    }

    fn write(
        &self,
        service: &str,
        path: &str,
        values: &BTreeMap<String, String>,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        let mut guard = self.records.lock().unwrap();
        let key = (service.to_string(), path.to_string());
        // A path with no record is at version 0, matching KV v2 `cas` rules:
        // expecting 0 creates version 1, anything else is a conflict.
        let current = guard.get(&key).map(|record| record.version).unwrap_or(0);
        if let Some(expected) = expected_version {
            if expected != current {
                return Err(StoreError::VersionConflict {
                    path: path.to_string(),
                });
            }
        }
        let version = current + 1;
        debug!(service, path, version, "memory store write");
        guard.insert(
            key,
            VersionedRecord {
                values: values.clone(),
                version,
            },
        );
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn versions_are_sequential() {
        let store = MemoryStore::new();
        assert_eq!(store.write("svc", "p", &values(&[("k", "1")]), None), Ok(1));
        assert_eq!(store.write("svc", "p", &values(&[("k", "2")]), None), Ok(2));
        let record = store.read("svc", "p").unwrap().unwrap();
        assert_eq!(record.version, 2);
        assert_eq!(record.values.get("k").map(String::as_str), Some("2"));
    }

    #[test]
    fn missing_record_reads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.read("svc", "absent"), Ok(None));
    }

    #[test]
    fn cas_accepts_matching_version_and_rejects_stale() {
        let store = MemoryStore::new();
        let version = store.write("svc", "p", &values(&[("k", "1")]), None).unwrap();
        assert_eq!(
            store.write("svc", "p", &values(&[("k", "2")]), Some(version)),
            Ok(version + 1)
        );
        assert_eq!(
            store.write("svc", "p", &values(&[("k", "3")]), Some(version)),
            Err(StoreError::VersionConflict {
                path: "p".to_string()
            })
        );
    }

    #[test]
    fn cas_against_missing_path_expects_version_zero() {
        let store = MemoryStore::new();
        assert_eq!(
            store.write("svc", "new", &values(&[("k", "1")]), Some(3)),
            Err(StoreError::VersionConflict {
                path: "new".to_string()
            })
        );
        assert_eq!(store.write("svc", "new", &values(&[("k", "1")]), Some(0)), Ok(1));
    }

    #[test]
    fn services_are_isolated() {
        let store = MemoryStore::new();
        store.write("svc-a", "p", &values(&[("k", "a")]), None).unwrap();
        assert_eq!(store.read("svc-b", "p"), Ok(None));
    }
}
