//! Upload orchestration: file selection, expiration, local validation,
//! submission and the interpretation of whatever the network says back.
//!
//! The form is plain state; the async part ([`submit`]) takes a
//! [`PreparedUpload`] by value so a front end can spawn it and report the
//! result through [`UploadForm::finish`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, Utc};

use crate::client::{BlobPayload, ShelbyApi, Signer, UploadReceipt, UploadRequest};
use crate::platform::runtime::Duration;
use crate::util_text::short_hash;

/// Block explorer for the shelbynet network.
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.shelby.xyz/shelbynet";

/// Quick expiration choices offered next to the date picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpirationPreset {
    OneDay,
    ThreeDays,
    #[default]
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl ExpirationPreset {
    pub const ALL: [ExpirationPreset; 5] = [
        ExpirationPreset::OneDay,
        ExpirationPreset::ThreeDays,
        ExpirationPreset::OneWeek,
        ExpirationPreset::TwoWeeks,
        ExpirationPreset::OneMonth,
    ];

    pub fn days(self) -> i64 {
        match self {
            ExpirationPreset::OneDay => 1,
            ExpirationPreset::ThreeDays => 3,
            ExpirationPreset::OneWeek => 7,
            ExpirationPreset::TwoWeeks => 14,
            ExpirationPreset::OneMonth => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpirationPreset::OneDay => "1d",
            ExpirationPreset::ThreeDays => "3d",
            ExpirationPreset::OneWeek => "7d",
            ExpirationPreset::TwoWeeks => "14d",
            ExpirationPreset::OneMonth => "1 Month",
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.days() == i64::from(days))
    }

    /// `now` plus the preset's day count.
    pub fn instant_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + ChronoDuration::days(self.days())
    }

    /// Cycle order used by the TUI's left/right keys.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// `floor(millis * 1000)` of the chosen instant.
pub fn expiration_micros(instant: Option<DateTime<Utc>>) -> Result<i64, UploadRejection> {
    instant
        .and_then(|dt| dt.timestamp_millis().checked_mul(1000))
        .ok_or(UploadRejection::InvalidDate)
}

/// Parse a custom expiration typed as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`
/// (UTC). Without a time the time of day of `keep_time` is kept. Days before
/// today are rejected.
pub fn parse_custom_expiration(
    input: &str,
    keep_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, UploadRejection> {
    let input = input.trim();
    let (date_part, time_part) = match input.split_once([' ', 'T']) {
        Some((d, t)) => (d, Some(t.trim())),
        None => (input, None),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| UploadRejection::InvalidDate)?;
    let time = match time_part {
        Some(t) => {
            NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| UploadRejection::InvalidDate)?
        }
        None => keep_time.time(),
    };
    let dt = date.and_time(time).and_utc();
    if dt.date_naive() < now.date_naive() {
        return Err(UploadRejection::InvalidDate);
    }
    Ok(dt)
}

/// Local refusals; none of these touch the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    WalletNotConnected,
    NoFiles,
    InvalidDate,
    AlreadyPending,
}

impl UploadRejection {
    pub fn title(self) -> &'static str {
        match self {
            UploadRejection::WalletNotConnected => "Wallet Not Connected",
            UploadRejection::NoFiles => "No Files Selected",
            UploadRejection::InvalidDate => "Invalid Date",
            UploadRejection::AlreadyPending => "Upload In Progress",
        }
    }
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            UploadRejection::WalletNotConnected => "Please connect your wallet first",
            UploadRejection::NoFiles => "Please select at least one file",
            UploadRejection::InvalidDate => "Please select a valid expiration date",
            UploadRejection::AlreadyPending => "Please wait for the current upload to finish",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for UploadRejection {}

/// What a failed submission most likely means for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailure {
    /// Gateway dropped the confirmation; the upload may well have landed.
    MaybeSucceeded,
    AccessDenied,
    TooLarge,
    Network,
    Timeout,
    Generic,
}

impl UploadFailure {
    pub fn title(self) -> &'static str {
        match self {
            UploadFailure::MaybeSucceeded => "Upload Status Uncertain",
            _ => "Upload Failed",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            UploadFailure::MaybeSucceeded => {
                "Upload may have completed successfully, but we couldn't confirm it. \
                 Please refresh the page to check if your files appear in the list below."
            }
            UploadFailure::AccessDenied => {
                "Access denied. Please check your API key configuration."
            }
            UploadFailure::TooLarge => {
                "Your files are too large. Please try uploading smaller files."
            }
            UploadFailure::Network => {
                "Network error. Please check your internet connection and try again."
            }
            UploadFailure::Timeout => {
                "Upload timed out. Please try again with a better connection."
            }
            UploadFailure::Generic => "Something went wrong while uploading your files.",
        }
    }

    /// Delay before re-fetching the list to see whether the files arrived.
    pub fn refresh_after(self) -> Option<Duration> {
        match self {
            UploadFailure::MaybeSucceeded => Some(Duration::from_secs(3)),
            _ => None,
        }
    }
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Map an error message to a failure class. First match wins, in this order.
///
/// This is substring matching on free text; a network error code would be a
/// better key once the API exposes one.
pub fn classify_failure(message: &str) -> UploadFailure {
    let has = |needle: &str| message.contains(needle);
    if has("502") || has("Bad Gateway") {
        UploadFailure::MaybeSucceeded
    } else if has("403") || has("Forbidden") {
        UploadFailure::AccessDenied
    } else if has("413") || has("too large") {
        UploadFailure::TooLarge
    } else if has("network") || has("Network") {
        UploadFailure::Network
    } else if has("timeout") {
        UploadFailure::Timeout
    } else {
        UploadFailure::Generic
    }
}

/// Where a selected file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read at submission time (native picker / CLI).
    Path(PathBuf),
    /// Already in memory (browser picker, drag and drop, tests).
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub source: FileSource,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// Name is the path's final component, as a browser picker would report.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("not a file path: {}", path.display()))?
            .to_string();
        Ok(Self {
            name,
            source: FileSource::Path(path),
        })
    }

    /// Known size without reading a path-backed file.
    pub fn known_size(&self) -> Option<u64> {
        match &self.source {
            FileSource::Bytes(b) => Some(b.len() as u64),
            FileSource::Path(_) => None,
        }
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Bytes(b) => Ok(b.clone()),
            #[cfg(feature = "native")]
            FileSource::Path(p) => tokio::fs::read(p)
                .await
                .with_context(|| format!("failed to read {}", p.display())),
            #[cfg(not(feature = "native"))]
            FileSource::Path(p) => Err(anyhow!(
                "reading {} needs the native feature",
                p.display()
            )),
        }
    }
}

/// The connected wallet, if any.
#[derive(Clone, Default)]
pub struct WalletSession {
    signer: Option<Arc<dyn Signer>>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    pub fn account(&self) -> Option<String> {
        self.signer.as_ref().map(|s| s.account())
    }

    pub fn signer(&self) -> Option<Arc<dyn Signer>> {
        self.signer.clone()
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("account", &self.account())
            .finish()
    }
}

/// A validated batch, ready for [`submit`].
pub struct PreparedUpload {
    pub signer: Arc<dyn Signer>,
    pub files: Vec<SelectedFile>,
    pub expiration_micros: i64,
}

impl fmt::Debug for PreparedUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedUpload")
            .field("account", &self.signer.account())
            .field("files", &self.files.len())
            .field("expiration_micros", &self.expiration_micros)
            .finish()
    }
}

/// Read every file into memory and hand the batch to the network.
pub async fn submit(api: &dyn ShelbyApi, prepared: PreparedUpload) -> Result<UploadReceipt> {
    let mut blobs = Vec::with_capacity(prepared.files.len());
    for file in &prepared.files {
        blobs.push(BlobPayload {
            blob_name: file.name.clone(),
            blob_data: file.read().await?,
        });
    }
    let request = UploadRequest {
        signer_account: prepared.signer.account(),
        blobs,
        expiration_micros: prepared.expiration_micros,
    };
    api.upload_blobs(request, prepared.signer.as_ref()).await
}

/// Result of a finished submission, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Succeeded {
        tx_hash: Option<String>,
        explorer_link: Option<String>,
    },
    Failed {
        failure: UploadFailure,
        detail: String,
    },
}

impl UploadOutcome {
    pub fn title(&self) -> &'static str {
        match self {
            UploadOutcome::Succeeded { .. } => "Files uploaded successfully!",
            UploadOutcome::Failed { failure, .. } => failure.title(),
        }
    }

    /// Second toast line: tx link text, or the failure explanation.
    pub fn description(&self) -> Option<String> {
        match self {
            UploadOutcome::Succeeded {
                tx_hash: Some(hash),
                ..
            } => Some(format!("View transaction: {}", short_hash(hash))),
            UploadOutcome::Succeeded { tx_hash: None, .. } => None,
            UploadOutcome::Failed { failure, .. } => Some(failure.message().to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded { .. })
    }
}

pub fn explorer_tx_url(explorer_base: &str, hash: &str) -> String {
    format!("{}/txn/{}", explorer_base.trim_end_matches('/'), hash)
}

/// Upload dialog state.
#[derive(Debug, Clone)]
pub struct UploadForm {
    files: Vec<SelectedFile>,
    preset: Option<ExpirationPreset>,
    expiration: Option<DateTime<Utc>>,
    open: bool,
    pending: bool,
    last_error: Option<String>,
}

impl UploadForm {
    pub fn new(default_preset: ExpirationPreset, now: DateTime<Utc>) -> Self {
        Self {
            files: Vec::new(),
            preset: Some(default_preset),
            expiration: Some(default_preset.instant_from(now)),
            open: false,
            pending: false,
            last_error: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing keeps the selection; only a successful upload clears it.
    pub fn close(&mut self) {
        if !self.pending {
            self.open = false;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn add_file(&mut self, file: SelectedFile) {
        self.files.push(file);
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = SelectedFile>) {
        self.files.extend(files);
    }

    pub fn remove_file(&mut self, index: usize) -> Option<SelectedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn preset(&self) -> Option<ExpirationPreset> {
        self.preset
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// Error text of the last failed submission, shown inside the dialog.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The instant is computed now, not at submission.
    pub fn select_preset(&mut self, preset: ExpirationPreset, now: DateTime<Utc>) {
        self.preset = Some(preset);
        self.expiration = Some(preset.instant_from(now));
    }

    pub fn set_custom_expiration(
        &mut self,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), UploadRejection> {
        if at.date_naive() < now.date_naive() {
            return Err(UploadRejection::InvalidDate);
        }
        self.preset = None;
        self.expiration = Some(at);
        Ok(())
    }

    /// Drop the chosen instant (a cleared date field).
    pub fn clear_expiration(&mut self) {
        self.preset = None;
        self.expiration = None;
    }

    /// Run the local checks in order and, when they pass, mark the form
    /// pending and hand back the batch to submit.
    pub fn begin(&mut self, wallet: &WalletSession) -> Result<PreparedUpload, UploadRejection> {
        if self.pending {
            return Err(UploadRejection::AlreadyPending);
        }
        let signer = wallet.signer().ok_or(UploadRejection::WalletNotConnected)?;
        if self.files.is_empty() {
            return Err(UploadRejection::NoFiles);
        }
        let expiration_micros = expiration_micros(self.expiration)?;

        self.pending = true;
        self.last_error = None;
        log::info!(
            "[shelbyx][upload] submitting {} file(s), expiration_micros={}",
            self.files.len(),
            expiration_micros
        );
        Ok(PreparedUpload {
            signer,
            files: self.files.clone(),
            expiration_micros,
        })
    }

    /// Apply the submission result. Success clears the selection and closes
    /// the dialog; failure keeps both so the user can retry.
    pub fn finish(
        &mut self,
        result: Result<UploadReceipt, String>,
        explorer_base: &str,
    ) -> UploadOutcome {
        self.pending = false;
        match result {
            Ok(receipt) => {
                let tx_hash = receipt.tx_hash();
                log::info!("[shelbyx][upload] done tx={tx_hash:?}");
                self.files.clear();
                self.open = false;
                UploadOutcome::Succeeded {
                    explorer_link: tx_hash.as_deref().map(|h| explorer_tx_url(explorer_base, h)),
                    tx_hash,
                }
            }
            Err(detail) => {
                let failure = classify_failure(&detail);
                if failure == UploadFailure::Generic {
                    log::warn!("[shelbyx][upload] unclassified failure: {detail}");
                } else {
                    log::info!("[shelbyx][upload] failed ({failure:?}): {detail}");
                }
                self.last_error = Some(detail.clone());
                UploadOutcome::Failed { failure, detail }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    struct NullSigner;

    #[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
    #[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
    impl Signer for NullSigner {
        fn account(&self) -> String {
            "0xabc".into()
        }
        async fn sign_and_submit(&self, _payload: serde_json::Value) -> Result<serde_json::Value> {
            Ok(json!({}))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 0).unwrap()
    }

    #[test]
    fn presets_add_days_and_label() {
        let labels: Vec<_> = ExpirationPreset::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, ["1d", "3d", "7d", "14d", "1 Month"]);
        assert_eq!(ExpirationPreset::default().days(), 7);
        assert_eq!(
            ExpirationPreset::OneMonth.instant_from(now()),
            Utc.with_ymd_and_hms(2024, 6, 9, 12, 30, 0).unwrap()
        );
        assert_eq!(ExpirationPreset::from_days(14), Some(ExpirationPreset::TwoWeeks));
        assert_eq!(ExpirationPreset::from_days(2), None);
        assert_eq!(ExpirationPreset::OneMonth.next(), ExpirationPreset::OneDay);
        assert_eq!(ExpirationPreset::OneDay.prev(), ExpirationPreset::OneMonth);
    }

    #[test]
    fn micros_are_millis_times_thousand() {
        let dt = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(expiration_micros(Some(dt)), Ok(1_700_000_000_123_000));
        assert_eq!(expiration_micros(None), Err(UploadRejection::InvalidDate));
    }

    #[test]
    fn custom_dates_before_today_are_rejected() {
        let keep = now();
        assert_eq!(
            parse_custom_expiration("2024-05-09", keep, now()),
            Err(UploadRejection::InvalidDate)
        );
        assert_eq!(
            parse_custom_expiration("2024-05-10", keep, now()),
            Ok(Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 0).unwrap())
        );
        assert_eq!(
            parse_custom_expiration("2024-06-01 08:15", keep, now()),
            Ok(Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap())
        );
        assert!(parse_custom_expiration("06/01/2024", keep, now()).is_err());

        let mut form = UploadForm::new(ExpirationPreset::OneWeek, now());
        let yesterday = now() - ChronoDuration::days(1);
        assert_eq!(
            form.set_custom_expiration(yesterday, now()),
            Err(UploadRejection::InvalidDate)
        );
        assert_eq!(form.preset(), Some(ExpirationPreset::OneWeek));
    }

    #[test]
    fn classification_priority() {
        assert_eq!(classify_failure("HTTP 502 Bad Gateway"), UploadFailure::MaybeSucceeded);
        // 502 wins over network wording
        assert_eq!(
            classify_failure("network error: 502"),
            UploadFailure::MaybeSucceeded
        );
        assert_eq!(classify_failure("403 Forbidden"), UploadFailure::AccessDenied);
        assert_eq!(classify_failure("payload too large"), UploadFailure::TooLarge);
        assert_eq!(classify_failure("upload: network error"), UploadFailure::Network);
        assert_eq!(classify_failure("Network unreachable"), UploadFailure::Network);
        assert_eq!(classify_failure("request timeout"), UploadFailure::Timeout);
        assert_eq!(classify_failure("Timeout"), UploadFailure::Generic);
        assert_eq!(classify_failure("boom"), UploadFailure::Generic);
        assert_eq!(
            UploadFailure::MaybeSucceeded.refresh_after(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(UploadFailure::Timeout.refresh_after(), None);
    }

    #[test]
    fn rejections_come_in_order() {
        let mut form = UploadForm::new(ExpirationPreset::OneWeek, now());
        let none = WalletSession::disconnected();
        let wallet = WalletSession::connected(Arc::new(NullSigner));

        assert_eq!(form.begin(&none).unwrap_err(), UploadRejection::WalletNotConnected);
        assert_eq!(form.begin(&wallet).unwrap_err(), UploadRejection::NoFiles);

        form.add_file(SelectedFile::from_bytes("a.txt", b"hi".to_vec()));
        form.clear_expiration();
        assert_eq!(form.begin(&wallet).unwrap_err(), UploadRejection::InvalidDate);
        assert!(!form.is_pending());

        form.select_preset(ExpirationPreset::OneDay, now());
        let prepared = form.begin(&wallet).unwrap();
        assert_eq!(prepared.files.len(), 1);
        assert!(form.is_pending());
        assert_eq!(form.begin(&wallet).unwrap_err(), UploadRejection::AlreadyPending);
    }

    #[test]
    fn finish_clears_on_success_and_keeps_on_failure() {
        let wallet = WalletSession::connected(Arc::new(NullSigner));
        let mut form = UploadForm::new(ExpirationPreset::OneWeek, now());
        form.open();
        form.add_file(SelectedFile::from_bytes("a.txt", vec![1]));

        form.begin(&wallet).unwrap();
        let out = form.finish(Err("upload a.txt failed (413 Payload Too Large)".into()), DEFAULT_EXPLORER_URL);
        assert_eq!(
            out,
            UploadOutcome::Failed {
                failure: UploadFailure::TooLarge,
                detail: "upload a.txt failed (413 Payload Too Large)".into()
            }
        );
        assert!(form.is_open());
        assert_eq!(form.files().len(), 1);
        assert!(form.last_error().is_some());

        form.begin(&wallet).unwrap();
        let hash = "0x1234567890abcdef1234567890abcdef";
        let out = form.finish(Ok(UploadReceipt::new(json!({ "hash": hash }))), DEFAULT_EXPLORER_URL);
        assert_eq!(
            out,
            UploadOutcome::Succeeded {
                tx_hash: Some(hash.into()),
                explorer_link: Some(format!(
                    "https://explorer.shelby.xyz/shelbynet/txn/{hash}"
                )),
            }
        );
        assert_eq!(out.description().as_deref(), Some("View transaction: 0x123456...abcdef"));
        assert!(!form.is_open());
        assert!(form.files().is_empty());
        assert!(!form.is_pending());
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut form = UploadForm::new(ExpirationPreset::OneWeek, now());
        form.add_files([
            SelectedFile::from_bytes("a", vec![]),
            SelectedFile::from_bytes("a", vec![]),
        ]);
        assert!(form.remove_file(5).is_none());
        assert_eq!(form.remove_file(0).map(|f| f.name), Some("a".to_string()));
        assert_eq!(form.files().len(), 1);
    }
}
