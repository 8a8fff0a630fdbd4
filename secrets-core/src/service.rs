use crate::error::{Error, Result, StoreError};
use crate::sign::{self, DigestAlgorithm, HmacAlgorithm};
use crate::store::SecretStore;
use crate::types::{SecretObj, SecretRef, SecretValue, VersionedSecret};
use std::collections::BTreeMap;
use tracing::debug;
use zeroize::Zeroizing;

/// Single entry point for reading and writing a service's secrets and for
/// deriving signatures from them.
///
/// The service holds only the store handle; every operation is one
/// synchronous round trip with no retries, caching or shared mutable state,
/// so one instance can be used from any number of threads.
pub struct SecretService<S> {
    store: S,
}

impl<S: SecretStore> SecretService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch the full current record at `path`.
    pub fn get_secrets(&self, service: &str, path: &str) -> Result<BTreeMap<String, SecretValue>> {
        let record = self.store.read(service, path)?.ok_or_else(|| Error::PathNotFound {
            path: path.to_string(),
        })?;
        Ok(wrap_values(record.values))
    }

    /// Fetch the full current record at `path` together with the store's
    /// version counter.
    ///
    /// A record whose values are all blank is treated the same as a missing
    /// record; a hollow secret record is never a usable result.
    pub fn get_versioned_secrets(&self, service: &str, path: &str) -> Result<VersionedSecret> {
        let record = self
            .store
            .read(service, path)?
            .filter(|record| record.values.values().any(|value| !value.trim().is_empty()))
            .ok_or_else(|| Error::SecretsNotFound {
                path: path.to_string(),
            })?;
        Ok(VersionedSecret {
            version: record.version,
            secrets: wrap_values(record.values),
        })
    }

    /// Fetch one secret by reference.
    pub fn get_secret(&self, service: &str, secret_ref: &SecretRef) -> Result<SecretValue> {
        self.secret_value(service, secret_ref)
    }

    /// HMAC-sign `data` with the secret at `secret_ref`.
    ///
    /// The stored secret must be a hex-encoded key; the digest is returned
    /// as lower-case hex.
    pub fn hmac(
        &self,
        service: &str,
        data: &str,
        secret_ref: &SecretRef,
        algorithm: HmacAlgorithm,
    ) -> Result<String> {
        let secret = self.secret_value(service, secret_ref)?;
        let key = Zeroizing::new(hex::decode(secret.expose()).map_err(|_| Error::HexDecode {
            secret_ref: secret_ref.clone(),
        })?);
        Ok(sign::hmac_hex(data, &key, algorithm))
    }

    /// Hash `data ++ secret` with the secret at `secret_ref` taken as plain
    /// text, returning lower-case hex.
    pub fn digest(
        &self,
        service: &str,
        data: &str,
        secret_ref: &SecretRef,
        algorithm: DigestAlgorithm,
    ) -> Result<String> {
        let secret = self.secret_value(service, secret_ref)?;
        Ok(sign::digest_hex(data, secret.expose(), algorithm))
    }

    /// Unconditionally replace the record at the payload's path.
    pub fn write_secret(&self, service: &str, secret_obj: &SecretObj) -> Result<()> {
        self.write_versioned_secret(service, secret_obj)?;
        Ok(())
    }

    /// Unconditionally replace the record at the payload's path and return
    /// the new version.
    pub fn write_versioned_secret(&self, service: &str, secret_obj: &SecretObj) -> Result<u64> {
        let version = self
            .store
            .write(service, secret_obj.path(), secret_obj.values(), None)?;
        debug!(service, path = secret_obj.path(), version, "stored secrets");
        Ok(version)
    }

    /// Replace the record only if the store's current version matches
    /// `expected_version`; returns the new version on success.
    ///
    /// The comparison and swap are a single store-side operation, so when
    /// two writers race with the same expectation exactly one succeeds.
    pub fn write_with_cas(
        &self,
        service: &str,
        secret_obj: &SecretObj,
        expected_version: u64,
    ) -> Result<u64> {
        match self.store.write(
            service,
            secret_obj.path(),
            secret_obj.values(),
            Some(expected_version),
        ) {
            Ok(version) => {
                debug!(
                    service,
                    path = secret_obj.path(),
                    version,
                    "stored secrets with check-and-set"
                );
                Ok(version)
            }
            Err(StoreError::VersionConflict { path }) => Err(Error::AlreadyModified { path }),
            Err(err) => Err(err.into()),
        }
    }

    fn secret_value(&self, service: &str, secret_ref: &SecretRef) -> Result<SecretValue> {
        self.store
            .read(service, secret_ref.path())?
            .and_then(|record| record.values.get(secret_ref.key()).cloned())
            .map(SecretValue::new)
            .ok_or_else(|| Error::SecretNotFound {
                secret_ref: secret_ref.clone(),
            })
    }
}

fn wrap_values(values: BTreeMap<String, String>) -> BTreeMap<String, SecretValue> {
    values
        .into_iter()
        .map(|(key, value)| (key, SecretValue::new(value)))
        .collect()
}
