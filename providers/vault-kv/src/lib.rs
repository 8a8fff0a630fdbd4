//! HashiCorp Vault KV v2 implementation of the secret store contract.
//!
//! Each service namespace maps to a KV v2 mount, so a read for
//! `(service, path)` hits `v1/{service}/data/{path}`. Check-and-set writes
//! pass the expected version through the KV `options.cas` field; Vault
//! performs the comparison and swap atomically and reports a mismatch with a
//! recognizable error marker, which this crate translates into the
//! structured version-conflict outcome. Everything else non-2xx is passed
//! through as an opaque backend error.

use adapter_secrets::{SecretStore, StoreError, StoreResult, VersionedRecord};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;
use tracing::debug;

/// Marker Vault places in the error body of a failed check-and-set write.
const CAS_ERROR_MARKER: &str = "check-and-set parameter did not match the current version";

/// Secret store backed by the Vault KV v2 HTTP API.
#[derive(Clone)]
pub struct VaultKvStore {
    config: VaultConfig,
    client: Client,
}

impl VaultKvStore {
    pub fn new(config: VaultConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        Ok(Self { config, client })
    }

    /// Construct the store from `VAULT_*` environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(VaultConfig::from_env()?)
    }

    fn data_path(service: &str, path: &str) -> String {
        format!(
            "v1/{mount}/data/{path}",
            mount = service.trim_matches('/'),
            path = path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, body: Option<Value>) -> StoreResult<Response> {
        let url = format!(
            "{}/{}",
            self.config.addr.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut builder = self.client.request(method, url);
        builder = builder.header("X-Vault-Token", &self.config.token);
        if let Some(namespace) = &self.config.namespace {
            builder = builder.header("X-Vault-Namespace", namespace);
        }
        if let Some(payload) = body {
            builder = builder.json(&payload);
        }
        builder
            .send()
            .map_err(|err| StoreError::Backend(format!("vault request failed: {err}")))
    }
}

impl SecretStore for VaultKvStore {
    fn read(&self, service: &str, path: &str) -> StoreResult<Option<VersionedRecord>> {
        let response = self.request(Method::GET, &Self::data_path(service, path), None)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text().unwrap_or_default();
                let parsed: KvReadResponse = serde_json::from_str(&body).map_err(|err| {
                    StoreError::Backend(format!("failed to decode vault read response: {err}"))
                })?;
                let metadata = parsed.data.metadata;
                // Soft-deleted versions come back with null data and
                // deletion metadata; they read as absent.
                let deleted = metadata.destroyed || !metadata.deletion_time.is_empty();
                let values = match parsed.data.data {
                    Some(data) if !deleted => data,
                    _ => return Ok(None),
                };
                Ok(Some(VersionedRecord {
                    values: record_values(values),
                    version: metadata.version,
                }))
            }
            status => {
                let body = response.text().unwrap_or_default();
                Err(StoreError::Backend(format!(
                    "read secrets failed: {status} {body}"
                )))
            }
        }
    }

    fn write(
        &self,
        service: &str,
        path: &str,
        values: &BTreeMap<String, String>,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        let mut body = Map::new();
        body.insert("data".into(), json!(values));
        if let Some(version) = expected_version {
            body.insert("options".into(), json!({ "cas": version }));
        }
        let response = self.request(
            Method::POST,
            &Self::data_path(service, path),
            Some(Value::Object(body)),
        )?;
        let status = response.status();
        let text = response.text().unwrap_or_default();
        if !status.is_success() {
            if is_cas_failure(status, &text) {
                return Err(StoreError::VersionConflict {
                    path: path.to_string(),
                });
            }
            return Err(StoreError::Backend(format!(
                "write secrets failed: {status} {text}"
            )));
        }
        let parsed: KvWriteResponse = serde_json::from_str(&text).map_err(|err| {
            StoreError::Backend(format!("failed to decode vault write response: {err}"))
        })?;
        debug!(
            service,
            path,
            version = parsed.data.version,
            "vault kv stored secrets"
        );
        Ok(parsed.data.version)
    }
}

/// Connection settings for the Vault HTTP API.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub addr: String,
    pub token: String,
    pub namespace: Option<String>,
    pub timeout: Duration,
    pub ca_bundle: Option<Vec<u8>>,
    pub insecure_skip_tls: bool,
}

impl VaultConfig {
    pub fn from_env() -> Result<Self> {
        let addr = std::env::var("VAULT_ADDR").context("set VAULT_ADDR to the Vault server URL")?;
        let token =
            std::env::var("VAULT_TOKEN").context("set VAULT_TOKEN for Vault authentication")?;
        let namespace = std::env::var("VAULT_NAMESPACE").ok();
        let timeout = std::env::var("VAULT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(15));
        let ca_bundle = std::env::var("VAULT_CA_BUNDLE")
            .ok()
            .map(|path| fs::read(path).context("failed to read VAULT_CA_BUNDLE"))
            .transpose()?;
        let insecure_skip_tls = std::env::var("VAULT_INSECURE_SKIP_TLS")
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        Ok(Self {
            addr,
            token,
            namespace,
            timeout,
            ca_bundle,
            insecure_skip_tls,
        })
    }

    fn build_http_client(&self) -> Result<Client> {
        let mut builder = Client::builder().timeout(self.timeout);
        if let Some(ca) = self.ca_bundle.as_ref() {
            let cert = reqwest::Certificate::from_pem(ca)
                .or_else(|_| reqwest::Certificate::from_der(ca))
                .context("failed to parse VAULT_CA_BUNDLE")?;
            builder = builder.add_root_certificate(cert);
        }
        if self.insecure_skip_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder.build().context("failed to build Vault HTTP client")
    }
}

/// Convert Vault's loosely typed data map into stored values.
///
/// Null-valued keys are absent, not secrets, and are dropped here so that a
/// single-key lookup for them reports the secret as not found.
fn record_values(data: Map<String, Value>) -> BTreeMap<String, String> {
    data.into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key, value_text(value)))
        .collect()
}

/// Non-string values keep their JSON text.
fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn is_cas_failure(status: StatusCode, body: &str) -> bool {
    if status != StatusCode::BAD_REQUEST {
        return false;
    }
    serde_json::from_str::<VaultErrorBody>(body)
        .map(|parsed| {
            parsed
                .errors
                .iter()
                .any(|message| message.contains(CAS_ERROR_MARKER))
        })
        .unwrap_or(false)
}

#[derive(Deserialize)]
struct VaultErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Deserialize)]
struct KvReadResponse {
    data: KvDataEnvelope,
}

#[derive(Deserialize)]
struct KvDataEnvelope {
    #[serde(default)]
    data: Option<Map<String, Value>>,
    metadata: VersionMetadata,
}

#[derive(Deserialize)]
struct KvWriteResponse {
    data: VersionMetadata,
}

#[derive(Deserialize)]
struct VersionMetadata {
    version: u64,
    #[serde(default)]
    destroyed: bool,
    #[serde(default)]
    deletion_time: String,
}
