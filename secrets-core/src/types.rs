use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Identifies one named secret within a service's secret namespace.
///
/// `path` groups the credentials of one terminal; `key` names a single
/// secret under that path. Carries no secret material, so it is safe to
/// render in errors and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretRef {
    path: String,
    key: String,
}

impl SecretRef {
    pub fn new(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.path, self.key)
    }
}

/// A resolved secret.
///
/// The wrapped string never appears in `Debug` output and the type has no
/// `Display` or serde impls, so accidental logging or serialization cannot
/// leak it. Memory is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    value: String,
}

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Borrow the raw secret. Callers are responsible for not logging it.
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue(<redacted>)")
    }
}

/// Full set of key/value pairs to persist under one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretObj {
    path: String,
    values: BTreeMap<String, String>,
}

impl SecretObj {
    pub fn new(path: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            path: path.into(),
            values,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Bulk read result carrying the store's version counter for the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSecret {
    pub secrets: BTreeMap<String, SecretValue>,
    pub version: u64,
}
