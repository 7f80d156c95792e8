use serde::{Deserialize, Deserializer, Serialize};

use crate::client::UploadReceipt;

/// One blob as listed by the storage network for an account.
///
/// `name` is the fully-qualified storage name (account prefix included) and is
/// the record's identity; `blob_name_suffix` is the path shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    pub name: String,
    #[serde(default)]
    pub blob_name_suffix: String,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub size: u64,
    #[serde(
        default,
        deserialize_with = "de_opt_i64_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_micros: Option<i64>,
}

impl BlobRecord {
    /// Sort key used by the catalog: records without a timestamp count as 0.
    pub fn created_or_zero(&self) -> i64 {
        self.creation_micros.unwrap_or(0)
    }

    /// Display path; falls back to the last segment of `name` when the
    /// network omits the suffix.
    pub fn display_path(&self) -> &str {
        if !self.blob_name_suffix.is_empty() {
            return &self.blob_name_suffix;
        }
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Last path segment of the display path.
    pub fn file_name(&self) -> &str {
        let path = self.display_path();
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// The network serializes 64-bit integers as strings in some responses.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(i64),
    Float(f64),
    Str(String),
}

impl NumOrString {
    fn as_i64(&self) -> Option<i64> {
        match self {
            NumOrString::Num(n) => Some(*n),
            NumOrString::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            NumOrString::Float(_) => None,
            NumOrString::Str(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

fn de_u64_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = Option::<NumOrString>::deserialize(d)?;
    Ok(v.and_then(|v| v.as_i64()).map(|n| n.max(0) as u64).unwrap_or(0))
}

fn de_opt_i64_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let v = Option::<NumOrString>::deserialize(d)?;
    // 0 and missing are the same thing to the catalog.
    Ok(v.and_then(|v| v.as_i64()).filter(|n| *n != 0))
}

/// Explicit state for one async operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AsyncOp<T> {
    #[default]
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> AsyncOp<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncOp::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncOp::Succeeded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncOp::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Everything the background tasks report back to the UI loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A poll returned `account`'s blob list.
    BlobsLoaded { account: String, blobs: Vec<BlobRecord> },
    /// A poll for `account` failed; shown as "Error loading files: ...".
    BlobsFailed { account: String, message: String },
    /// A preview fetch finished successfully.
    PreviewLoaded { name: String, bytes: usize },
    /// A preview fetch failed and another attempt is scheduled.
    PreviewRetrying { name: String, retry: u8 },
    /// A preview fetch exhausted its retries.
    PreviewFailed { name: String },
    /// The upload submission resolved.
    UploadFinished(Result<UploadReceipt, String>),
    Quit,
}
