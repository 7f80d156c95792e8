//! Runs the [`Effect`]s the app queues: spawning uploads and preview loaders,
//! waking the poller, and the clipboard/browser side of modal actions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::app::{App, Effect};
use crate::client::{MediaFetcher, ShelbyApi};
use crate::platform::{copy_to_clipboard, runtime};
use crate::preview::{PreviewTask, RetryPolicy};
use crate::source_poll::RefreshHandle;
use crate::types::AppEvent;
use crate::upload;

pub struct EffectRunner {
    api: Arc<dyn ShelbyApi>,
    fetcher: Arc<dyn MediaFetcher>,
    events: UnboundedSender<AppEvent>,
    refresh: RefreshHandle,
    retry: RetryPolicy,
    previews: HashMap<String, PreviewTask>,
}

impl EffectRunner {
    pub fn new(
        api: Arc<dyn ShelbyApi>,
        fetcher: Arc<dyn MediaFetcher>,
        events: UnboundedSender<AppEvent>,
        refresh: RefreshHandle,
    ) -> Self {
        Self {
            api,
            fetcher,
            events,
            refresh,
            retry: RetryPolicy::default(),
            previews: HashMap::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point refresh requests at a new poller (account switch).
    pub fn set_refresh(&mut self, refresh: RefreshHandle) {
        self.refresh = refresh;
    }

    /// Loaders currently alive (started and not cancelled).
    pub fn active_previews(&self) -> usize {
        self.previews.len()
    }

    /// Drain and execute everything `app` queued since the last call.
    pub fn run(&mut self, app: &mut App) {
        for effect in app.take_effects() {
            self.execute(effect, app);
        }
    }

    fn execute(&mut self, effect: Effect, app: &mut App) {
        match effect {
            Effect::SubmitUpload(prepared) => {
                let api = self.api.clone();
                let events = self.events.clone();
                runtime::spawn(async move {
                    let result = upload::submit(api.as_ref(), prepared)
                        .await
                        .map_err(|e| format!("{e:#}"));
                    let _ = events.send(AppEvent::UploadFinished(result));
                });
            }
            Effect::RefreshNow => self.refresh.request(),
            Effect::RefreshAfter(delay) => self.refresh.request_after(delay),
            Effect::LoadPreview { name, url } => {
                log::debug!("[shelbyx][preview] load {name}");
                let task = PreviewTask::spawn(
                    self.fetcher.clone(),
                    name.clone(),
                    url,
                    self.retry,
                    self.events.clone(),
                );
                // replacing an older task drops (and aborts) it
                self.previews.insert(name, task);
            }
            Effect::CancelPreview { name } => {
                if self.previews.remove(&name).is_some() {
                    log::debug!("[shelbyx][preview] cancel {name}");
                }
            }
            Effect::CopyToClipboard(text) => {
                if copy_to_clipboard(&text) {
                    app.show_toast("Copied URL");
                } else {
                    app.show_toast("Copy failed");
                }
            }
            Effect::OpenExternal(url) => self.open_external(&url, app),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn open_external(&mut self, url: &str, _app: &mut App) {
        crate::webshim::open_external(url);
    }

    /// A terminal cannot open tabs; hand the URL over via the clipboard.
    #[cfg(not(target_arch = "wasm32"))]
    fn open_external(&mut self, url: &str, app: &mut App) {
        if copy_to_clipboard(url) {
            app.show_toast("URL copied, open it in your browser");
        } else {
            app.show_toast(url.to_string());
        }
    }
}
