#![cfg_attr(target_arch = "wasm32", no_main)]

// DOM-based Web frontend for shelbyx.
//
// JS side:
//   import init, { WasmApp } from "./shelbyx-web-dom.js";
//   const app = new WasmApp(null);            // account from window.shelbyxWallet
//   const snap = JSON.parse(app.snapshot_json());
//   const snap2 = JSON.parse(app.handle_action_json(JSON.stringify({ type: "OpenBlob", index: 0 })));
//   window.addEventListener("hashchange", () => app.handle_action_json(
//     JSON.stringify({ type: "Navigate", hash: location.hash })));

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::sync::Arc;

    use futures::future::{AbortHandle, Abortable};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::window;

    use tokio::sync::mpsc::{error::TryRecvError, unbounded_channel, UnboundedReceiver, UnboundedSender};

    use shelbyx::client::{HttpShelbyClient, MediaFetcher, ShelbyApi};
    use shelbyx::effects::EffectRunner;
    use shelbyx::source_poll::{refresh_channel, run_poller};
    use shelbyx::ui_snapshot::{apply_action, UiAction, UiSnapshot};
    use shelbyx::upload::WalletSession;
    use shelbyx::webshim::{wallet_account, JsWalletSigner};
    use shelbyx::{App, AppEvent, Config};

    /// Inject theme CSS variables and logging once the module loads.
    #[wasm_bindgen(start)]
    pub fn wasm_start() {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());

        if let Some(win) = window() {
            if let Some(doc) = win.document() {
                if let Some(root) = doc.document_element() {
                    if let Some(html_root) = root.dyn_ref::<web_sys::HtmlElement>() {
                        let scheme = shelbyx::theme::Theme::default().colors();
                        for (name, value) in scheme.css_vars() {
                            if let Err(e) = html_root.style().set_property(name, &value) {
                                log::warn!("[theme] Failed to set CSS var {}: {:?}", name, e);
                            }
                        }
                        log::info!("[theme] CSS variables injected");
                    }
                }
            }
        }
    }

    fn wallet_session() -> WalletSession {
        match JsWalletSigner::detect() {
            Some(signer) => WalletSession::connected(Arc::new(signer)),
            None => WalletSession::disconnected(),
        }
    }

    /// Wasm-exposed app wrapper.
    ///
    /// Holds the core App, the effect runner and the poller's abort handle.
    #[wasm_bindgen]
    pub struct WasmApp {
        app: App,
        runner: EffectRunner,
        api: Arc<dyn ShelbyApi>,
        event_tx: UnboundedSender<AppEvent>,
        event_rx: UnboundedReceiver<AppEvent>,
        poller: Option<AbortHandle>,
        cfg: Config,
    }

    #[wasm_bindgen]
    impl WasmApp {
        /// `account` overrides the wallet's account (read-only browsing).
        #[wasm_bindgen(constructor)]
        pub fn new(account: Option<String>) -> WasmApp {
            let account = account
                .filter(|a| !a.trim().is_empty())
                .or_else(wallet_account)
                .unwrap_or_default();
            let cfg = Config::for_web(account);

            let client = Arc::new(HttpShelbyClient::new(
                cfg.api_url.clone(),
                None,
                cfg.request_timeout_ms,
            ));
            let api: Arc<dyn ShelbyApi> = client.clone();
            let fetcher: Arc<dyn MediaFetcher> = client;

            let (event_tx, event_rx) = unbounded_channel::<AppEvent>();
            let (refresh, refresh_rx) = refresh_channel();
            let runner = EffectRunner::new(api.clone(), fetcher, event_tx.clone(), refresh);

            let mut app = App::new(&cfg, wallet_session());
            let hash = window()
                .and_then(|w| w.location().hash().ok())
                .unwrap_or_default();
            if let Some(route) = shelbyx::router::parse(&hash) {
                app.apply_route(&route);
            }

            let mut me = WasmApp {
                app,
                runner,
                api,
                event_tx,
                event_rx,
                poller: None,
                cfg,
            };
            me.start_poller(refresh_rx);
            me
        }

        /// Get a fresh snapshot as JSON (drains pending events first).
        #[wasm_bindgen]
        pub fn snapshot_json(&mut self) -> String {
            self.drain_events();
            self.runner.run(&mut self.app);
            self.snapshot()
        }

        /// Apply an action (JSON-encoded UiAction) and return an updated snapshot.
        #[wasm_bindgen]
        pub fn handle_action_json(&mut self, action_json: String) -> String {
            self.drain_events();

            match serde_json::from_str::<UiAction>(&action_json) {
                Ok(action) => apply_action(&mut self.app, action),
                Err(e) => {
                    log::warn!("Failed to deserialize UiAction ({e}): {action_json:?}");
                }
            }

            self.runner.run(&mut self.app);
            self.snapshot()
        }

        /// Call after the page connects or switches wallets.
        #[wasm_bindgen]
        pub fn wallet_changed(&mut self) -> String {
            let session = wallet_session();
            let previous = self.app.account().to_string();
            self.app.set_wallet(session);
            if self.app.account() != previous {
                self.cfg.account = self.app.account().to_string();
                let (refresh, refresh_rx) = refresh_channel();
                self.runner.set_refresh(refresh);
                self.start_poller(refresh_rx);
            }
            self.runner.run(&mut self.app);
            self.snapshot()
        }
    }

    impl WasmApp {
        fn start_poller(&mut self, refresh_rx: UnboundedReceiver<()>) {
            if let Some(old) = self.poller.take() {
                old.abort();
            }
            if self.cfg.account.is_empty() {
                log::info!("[WasmApp] no account, poller stopped");
                return;
            }

            let (abort, registration) = AbortHandle::new_pair();
            let api = self.api.clone();
            let account = self.cfg.account.clone();
            let interval = self.cfg.poll_interval();
            let tx = self.event_tx.clone();
            spawn_local(async move {
                log::info!("🚀 [WasmApp] Starting blob poller for {account}");
                let fut = run_poller(api, account, interval, tx, refresh_rx);
                match Abortable::new(fut, registration).await {
                    Ok(Ok(())) => log::info!("[WasmApp] poller completed"),
                    Ok(Err(e)) => log::error!("[WasmApp] poller error: {e:#}"),
                    Err(_) => log::debug!("[WasmApp] poller replaced"),
                }
            });
            self.poller = Some(abort);
        }

        fn drain_events(&mut self) {
            loop {
                match self.event_rx.try_recv() {
                    Ok(ev) => self.app.on_event(ev),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::warn!("[WasmApp] Event channel disconnected");
                        break;
                    }
                }
            }
        }

        fn snapshot(&self) -> String {
            let snap = UiSnapshot::from_app(&self.app);
            serde_json::to_string(&snap).unwrap_or_else(|e| {
                log::error!("Failed to serialize UiSnapshot: {e}");
                "{}".to_string()
            })
        }
    }
}

// Native builds: just provide a stub main so `cargo build --all-features` doesn't explode.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("shelbyx-web-dom is only supported on wasm32 (browser) target.");
}
