//! Remote storage network client.
//!
//! The app never talks to a global client: `main` (or `WasmApp`) builds one
//! [`HttpShelbyClient`] and hands `Arc`s of it to the poller, the preview
//! loaders and the upload orchestrator. Tests swap in in-memory fakes.

use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

#[cfg(not(target_arch = "wasm32"))]
use crate::platform::runtime::Duration;
use crate::platform::{WasmCompatSend, WasmCompatSync};
use crate::preview::{blob_url, encode_blob_path};
use crate::types::BlobRecord;

/// One file in an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobPayload {
    pub blob_name: String,
    pub blob_data: Vec<u8>,
}

/// Everything the network needs for one atomic upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub signer_account: String,
    pub blobs: Vec<BlobPayload>,
    pub expiration_micros: i64,
}

impl UploadRequest {
    /// On-chain registration payload: names, sizes and expiration (no data).
    pub fn registration_payload(&self) -> Value {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Entry<'a> {
            blob_name: &'a str,
            size: usize,
        }
        let entries: Vec<Entry> = self
            .blobs
            .iter()
            .map(|b| Entry {
                blob_name: &b.blob_name,
                size: b.blob_data.len(),
            })
            .collect();
        json!({
            "function": "register_blobs",
            "account": self.signer_account,
            "expirationMicros": self.expiration_micros,
            "blobs": entries,
        })
    }
}

/// Raw network response to an upload, kept whole for diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadReceipt {
    pub response: Value,
}

impl UploadReceipt {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    pub fn tx_hash(&self) -> Option<String> {
        extract_tx_hash(&self.response)
    }
}

/// Wallet capability: identity plus transaction signing. Supplied by the
/// wallet adapter; this crate never holds keys.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Signer: WasmCompatSend + WasmCompatSync {
    fn account(&self) -> String;

    /// Sign and submit a transaction payload; resolves with the network's
    /// response (which may carry a transaction hash).
    async fn sign_and_submit(&self, payload: Value) -> Result<Value>;
}

/// Blob list and upload operations of the storage network.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ShelbyApi: WasmCompatSend + WasmCompatSync {
    async fn list_blobs(&self, account: &str) -> Result<Vec<BlobRecord>>;

    async fn upload_blobs(
        &self,
        request: UploadRequest,
        signer: &dyn Signer,
    ) -> Result<UploadReceipt>;

    /// Public read URL for a blob of `account`.
    fn blob_url(&self, account: &str, suffix: &str) -> String;
}

/// Plain GET used by preview loaders.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MediaFetcher: WasmCompatSend + WasmCompatSync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> Result<&'static reqwest::Client> {
    if let Some(c) = HTTP.get() {
        return Ok(c);
    }

    #[cfg(not(target_arch = "wasm32"))]
    let built = reqwest::Client::builder()
        .pool_max_idle_per_host(8)
        .tcp_nodelay(true)
        .build();

    #[cfg(target_arch = "wasm32")]
    let built = reqwest::Client::builder().build();

    let client = built.context("failed to build HTTP client")?;
    Ok(HTTP.get_or_init(|| client))
}

/// reqwest-backed client for the Shelby REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpShelbyClient {
    api_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl HttpShelbyClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key,
            timeout_ms,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn with_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            req = req.bearer_auth(key);
        } else {
            log::debug!("[shelbyx][client] no API key configured");
        }
        self.with_timeout(req)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn with_timeout(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.timeout(Duration::from_millis(self.timeout_ms))
    }

    /// Browser fetch has no per-request timeout here.
    #[cfg(target_arch = "wasm32")]
    fn with_timeout(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req
    }

    async fn send(&self, req: reqwest::RequestBuilder, label: &str) -> Result<reqwest::Response> {
        #[cfg(feature = "native")]
        let res = crate::net::send_with_backoff(req, label, 2).await;
        #[cfg(not(feature = "native"))]
        let res = req.send().await;

        res.map_err(|e| {
            #[cfg(not(target_arch = "wasm32"))]
            let unreachable = e.is_connect() || e.is_request();
            #[cfg(target_arch = "wasm32")]
            let unreachable = e.is_request();

            if e.is_timeout() {
                anyhow!("{label}: request timeout")
            } else if unreachable {
                anyhow!("{label}: network error: {e}")
            } else {
                anyhow!("{label}: {e}")
            }
        })
    }
}

/// Turn a non-2xx response into an error whose message carries the status
/// (the upload error classifier keys off it).
async fn error_for_status(res: reqwest::Response, label: &str) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(anyhow!("{label} failed ({status}): {body}"))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ShelbyApi for HttpShelbyClient {
    async fn list_blobs(&self, account: &str) -> Result<Vec<BlobRecord>> {
        let url = format!(
            "{}/shelby/v1/accounts/{}/blobs",
            self.api_url,
            urlencoding::encode(account)
        );
        log::debug!("[shelbyx][client] GET {url}");
        let req = self.with_auth(http_client()?.get(&url));
        let res = self.send(req, "list blobs").await?;
        let res = error_for_status(res, "list blobs").await?;
        let blobs: Vec<BlobRecord> = res
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse blob list: {e}"))?;
        Ok(blobs)
    }

    async fn upload_blobs(
        &self,
        request: UploadRequest,
        signer: &dyn Signer,
    ) -> Result<UploadReceipt> {
        log::info!(
            "[shelbyx][client] registering {} blob(s) for {}",
            request.blobs.len(),
            request.signer_account
        );
        let tx = signer
            .sign_and_submit(request.registration_payload())
            .await
            .context("transaction rejected")?;

        for blob in &request.blobs {
            let url = format!(
                "{}/shelby/v1/blobs/{}/{}",
                self.api_url,
                request.signer_account,
                encode_blob_path(&blob.blob_name)
            );
            let req = self
                .with_auth(http_client()?.put(&url))
                .header("Content-Type", "application/octet-stream")
                .header("X-Expiration-Micros", request.expiration_micros.to_string())
                .body(blob.blob_data.clone());
            let label = format!("upload {}", blob.blob_name);
            let res = self.send(req, &label).await?;
            error_for_status(res, &label).await?;
            log::debug!("[shelbyx][client] stored {}", blob.blob_name);
        }

        Ok(UploadReceipt::new(tx))
    }

    fn blob_url(&self, account: &str, suffix: &str) -> String {
        blob_url(&self.api_url, account, suffix)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MediaFetcher for HttpShelbyClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        // Reads are public; no auth header and no client-side backoff here,
        // the preview loop owns retries.
        let req = self.with_timeout(http_client()?.get(url));
        let res = req
            .send()
            .await
            .map_err(|e| anyhow!("preview fetch: {e}"))?;
        let res = error_for_status(res, "preview fetch").await?;
        let bytes = res.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Pull a transaction hash out of an upload response. Wallets disagree on
/// where they put it.
pub fn extract_tx_hash(response: &Value) -> Option<String> {
    response
        .get("hash")
        .or_else(|| response.get("transaction").and_then(|t| t.get("hash")))
        .or_else(|| response.get("transactionHash"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_hash_is_found_under_any_known_key() {
        assert_eq!(extract_tx_hash(&json!({"hash": "0x1"})).as_deref(), Some("0x1"));
        assert_eq!(
            extract_tx_hash(&json!({"transaction": {"hash": "0x2"}})).as_deref(),
            Some("0x2")
        );
        assert_eq!(
            extract_tx_hash(&json!({"transactionHash": "0x3"})).as_deref(),
            Some("0x3")
        );
        assert_eq!(extract_tx_hash(&json!({"ok": true})), None);
        assert_eq!(extract_tx_hash(&Value::Null), None);
        assert_eq!(
            UploadReceipt::new(json!({"hash": ""})).tx_hash(),
            None,
            "empty hash is no hash"
        );
    }

    #[test]
    fn registration_payload_omits_data() {
        let req = UploadRequest {
            signer_account: "0xabc".into(),
            blobs: vec![BlobPayload {
                blob_name: "a.png".into(),
                blob_data: vec![1, 2, 3],
            }],
            expiration_micros: 42,
        };
        let p = req.registration_payload();
        assert_eq!(p["expirationMicros"], 42);
        assert_eq!(p["blobs"][0]["blobName"], "a.png");
        assert_eq!(p["blobs"][0]["size"], 3);
        assert!(p["blobs"][0].get("blobData").is_none());
    }

    #[test]
    fn client_builds_read_urls() {
        let c = HttpShelbyClient::new("https://api.shelbynet.shelby.xyz/", None, 1000);
        assert_eq!(c.api_url(), "https://api.shelbynet.shelby.xyz");
        assert_eq!(
            ShelbyApi::blob_url(&c, "0xabc", "x y.txt"),
            "https://api.shelbynet.shelby.xyz/shelby/v1/blobs/0xabc/x%20y.txt"
        );
    }
}
