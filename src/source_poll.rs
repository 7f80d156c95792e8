use std::pin::pin;
use std::sync::Arc;

use anyhow::Result;
use futures::future::{select, Either};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::client::ShelbyApi;
use crate::platform::runtime::{self, Duration};
use crate::types::AppEvent;

/// Wakes the poller ahead of its next tick.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: UnboundedSender<()>,
}

impl RefreshHandle {
    pub fn request(&self) {
        let _ = self.tx.send(());
    }

    /// Request a refresh once `delay` has passed.
    pub fn request_after(&self, delay: Duration) {
        let tx = self.tx.clone();
        runtime::spawn(async move {
            runtime::sleep(delay).await;
            let _ = tx.send(());
        });
    }
}

pub fn refresh_channel() -> (RefreshHandle, UnboundedReceiver<()>) {
    let (tx, rx) = unbounded_channel();
    (RefreshHandle { tx }, rx)
}

/// One list fetch, reported as an event. Returns `false` once nobody listens.
pub async fn fetch_once(api: &dyn ShelbyApi, account: &str, tx: &UnboundedSender<AppEvent>) -> bool {
    let event = match api.list_blobs(account).await {
        Ok(blobs) => {
            log::debug!("[shelbyx][poll] {} blob(s) for {account}", blobs.len());
            AppEvent::BlobsLoaded {
                account: account.to_string(),
                blobs,
            }
        }
        Err(e) => {
            log::error!("[shelbyx][poll] list failed: {e:#}");
            AppEvent::BlobsFailed {
                account: account.to_string(),
                message: format!("{e:#}"),
            }
        }
    };
    tx.send(event).is_ok()
}

/// Poll the account's blob list forever: fetch, then wait for either the
/// interval or a refresh request. Fetches never overlap.
pub async fn run_poller(
    api: Arc<dyn ShelbyApi>,
    account: String,
    interval: Duration,
    tx: UnboundedSender<AppEvent>,
    mut refresh_rx: UnboundedReceiver<()>,
) -> Result<()> {
    log::info!(
        "🚀 [shelbyx][poll] started for {account}, every {}ms",
        interval.as_millis()
    );
    let mut refresh_open = true;

    loop {
        if !fetch_once(api.as_ref(), &account, &tx).await {
            log::info!("[shelbyx][poll] event channel closed, stopping");
            return Ok(());
        }

        if refresh_open {
            let woken = {
                let tick = pin!(runtime::sleep(interval));
                let wake = pin!(refresh_rx.recv());
                match select(tick, wake).await {
                    Either::Left(_) => None,
                    Either::Right((msg, _)) => Some(msg.is_some()),
                }
            };
            match woken {
                Some(true) => log::debug!("[shelbyx][poll] refresh requested"),
                Some(false) => refresh_open = false,
                None => {}
            }
            // Coalesce a burst of requests into the fetch that follows.
            while refresh_rx.try_recv().is_ok() {}
        } else {
            runtime::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Signer, UploadReceipt, UploadRequest};
    use crate::types::BlobRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ShelbyApi for CountingApi {
        async fn list_blobs(&self, _account: &str) -> Result<Vec<BlobRecord>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                anyhow::bail!("list blobs failed (500 Internal Server Error): oops");
            }
            Ok(vec![])
        }

        async fn upload_blobs(&self, _r: UploadRequest, _s: &dyn Signer) -> Result<UploadReceipt> {
            unreachable!("poller never uploads")
        }

        fn blob_url(&self, _account: &str, _suffix: &str) -> String {
            String::new()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_request_skips_the_wait() {
        let api = Arc::new(CountingApi::default());
        let (tx, mut rx) = unbounded_channel();
        let (refresh, refresh_rx) = refresh_channel();

        let task = tokio::spawn(run_poller(
            api.clone(),
            "0xabc".into(),
            Duration::from_secs(3600),
            tx,
            refresh_rx,
        ));

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::BlobsLoaded { account, .. }) if account == "0xabc"
        ));
        refresh.request();
        match rx.recv().await {
            Some(AppEvent::BlobsFailed { message, .. }) => assert!(message.contains("500")),
            other => panic!("expected failure event, got {other:?}"),
        }
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);

        drop(rx);
        refresh.request();
        let _ = task.await;
    }
}
