//! Upload orchestration end to end: dialog state, local rejections, the
//! effect runner, and how results come back as toasts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc::unbounded_channel;

use shelbyx::app::{App, Effect, ToastKind};
use shelbyx::client::{MediaFetcher, ShelbyApi, Signer, UploadReceipt, UploadRequest};
use shelbyx::config::Config;
use shelbyx::effects::EffectRunner;
use shelbyx::source_poll::refresh_channel;
use shelbyx::types::{AppEvent, BlobRecord};
use shelbyx::upload::{SelectedFile, WalletSession};

struct FakeSigner;

#[async_trait]
impl Signer for FakeSigner {
    fn account(&self) -> String {
        "0xabc".into()
    }

    async fn sign_and_submit(&self, _payload: Value) -> Result<Value> {
        Ok(json!({ "hash": "0x1234567890abcdef1234567890" }))
    }
}

/// Records every upload; fails with `error` when set.
#[derive(Default)]
struct FakeApi {
    uploads: Mutex<Vec<UploadRequest>>,
    error: Option<String>,
}

#[async_trait]
impl ShelbyApi for FakeApi {
    async fn list_blobs(&self, _account: &str) -> Result<Vec<BlobRecord>> {
        Ok(vec![])
    }

    async fn upload_blobs(
        &self,
        request: UploadRequest,
        signer: &dyn Signer,
    ) -> Result<UploadReceipt> {
        self.uploads.lock().unwrap().push(request.clone());
        if let Some(e) = &self.error {
            anyhow::bail!("{e}");
        }
        let tx = signer.sign_and_submit(request.registration_payload()).await?;
        Ok(UploadReceipt::new(tx))
    }

    fn blob_url(&self, account: &str, suffix: &str) -> String {
        format!("https://blobs.test/{account}/{suffix}")
    }
}

#[derive(Default)]
struct NoFetch {
    calls: AtomicUsize,
}

#[async_trait]
impl MediaFetcher for NoFetch {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    }
}

fn connected_app() -> App {
    let wallet = WalletSession::connected(Arc::new(FakeSigner));
    let mut app = App::new(&Config::for_web("0xabc"), wallet);
    app.on_event(AppEvent::BlobsLoaded {
        account: "0xabc".into(),
        blobs: vec![],
    });
    app.take_effects();
    app
}

fn runner(api: Arc<FakeApi>) -> (EffectRunner, tokio::sync::mpsc::UnboundedReceiver<AppEvent>) {
    let (tx, rx) = unbounded_channel();
    let (refresh, _refresh_rx) = refresh_channel();
    let runner = EffectRunner::new(api, Arc::new(NoFetch::default()), tx, refresh);
    (runner, rx)
}

#[tokio::test]
async fn empty_selection_never_reaches_the_network() {
    let api = Arc::new(FakeApi::default());
    let (mut runner, _rx) = runner(api.clone());
    let mut app = connected_app();

    app.open_upload();
    app.submit_upload();
    runner.run(&mut app);

    let toast = app.toast().expect("rejection toast");
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.title, "No Files Selected");
    assert_eq!(toast.description.as_deref(), Some("Please select at least one file"));
    assert!(!app.upload().is_pending());
    assert!(api.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_upload_clears_dialog_and_links_explorer() {
    let api = Arc::new(FakeApi::default());
    let (mut runner, mut rx) = runner(api.clone());
    let mut app = connected_app();

    app.open_upload();
    app.add_upload_file(SelectedFile::from_bytes("cat.png", vec![1, 2, 3]));
    app.submit_upload();
    assert!(app.upload().is_pending());

    // a second submit while pending is refused locally
    app.submit_upload();
    assert_eq!(app.toast().unwrap().title, "Upload In Progress");

    runner.run(&mut app);
    let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("upload finished in time")
        .expect("event");
    assert!(matches!(ev, AppEvent::UploadFinished(Ok(_))));
    app.on_event(ev);

    let uploads = api.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].blobs[0].blob_name, "cat.png");
    assert_eq!(uploads[0].blobs[0].blob_data, vec![1, 2, 3]);
    assert!(uploads[0].expiration_micros > 0);
    assert_eq!(uploads[0].expiration_micros % 1000, 0);

    let toast = app.toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.title, "Files uploaded successfully!");
    assert_eq!(
        toast.link.as_deref(),
        Some("https://explorer.shelby.xyz/shelbynet/txn/0x1234567890abcdef1234567890")
    );
    assert!(!app.upload().is_open());
    assert!(app.upload().files().is_empty());
    assert!(app
        .take_effects()
        .iter()
        .any(|e| matches!(e, Effect::RefreshNow)));
}

#[tokio::test]
async fn access_denied_keeps_selection_for_retry() {
    let api = Arc::new(FakeApi {
        error: Some("upload cat.png failed (403 Forbidden): bad key".into()),
        ..FakeApi::default()
    });
    let (mut runner, mut rx) = runner(api);
    let mut app = connected_app();

    app.open_upload();
    app.add_upload_file(SelectedFile::from_bytes("cat.png", vec![1]));
    app.submit_upload();
    runner.run(&mut app);

    let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    app.on_event(ev);

    let toast = app.toast().unwrap();
    assert_eq!(toast.title, "Upload Failed");
    assert_eq!(
        toast.description.as_deref(),
        Some("Access denied. Please check your API key configuration.")
    );
    assert!(app.upload().is_open());
    assert_eq!(app.upload().files().len(), 1);
    assert!(!app.upload().is_pending());
    assert!(app.upload().last_error().unwrap().contains("403"));
}
