//! Browser bridges: opening links and the JS wallet adapter.
//!
//! The page is expected to expose `window.shelbyxWallet` once a wallet is
//! connected:
//!
//! ```js
//! window.shelbyxWallet = {
//!   account: "0x…",                          // or a function returning it
//!   signAndSubmitTransaction: async (payload) => ({ hash: "0x…" }),
//! };
//! ```

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;

#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Promise, Reflect};

#[cfg(target_arch = "wasm32")]
use web_sys::window;

// ----------------------- EXTERNAL BROWSER OPENER ----------------------------

/// Open URL in a new tab.
#[cfg(target_arch = "wasm32")]
#[inline]
pub fn open_external(url: &str) {
    if let Some(win) = window() {
        if win.open_with_url_and_target(url, "_blank").is_err() {
            log::warn!("[shelbyx][webshim] window.open failed for {url}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_external(_url: &str) {}

// ----------------------- WALLET JS BRIDGE (wasm32) ----------------------------

#[cfg(target_arch = "wasm32")]
fn wallet_object() -> Option<JsValue> {
    let win = window()?;
    let obj = Reflect::get(&JsValue::from(win), &JsValue::from_str("shelbyxWallet")).ok()?;
    (!obj.is_undefined() && !obj.is_null()).then_some(obj)
}

/// Currently connected account, if the page reports one.
#[cfg(target_arch = "wasm32")]
pub fn wallet_account() -> Option<String> {
    let obj = wallet_object()?;
    let account = Reflect::get(&obj, &JsValue::from_str("account")).ok()?;
    let account = if account.is_function() {
        Function::from(account).call0(&obj).ok()?
    } else {
        account
    };
    account.as_string().filter(|s| !s.is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn wallet_account() -> Option<String> {
    None
}

/// [`Signer`](crate::client::Signer) backed by `window.shelbyxWallet`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct JsWalletSigner {
    account: String,
}

#[cfg(target_arch = "wasm32")]
impl JsWalletSigner {
    /// `None` until the page has connected a wallet.
    pub fn detect() -> Option<Self> {
        wallet_account().map(|account| Self { account })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_err(v: JsValue) -> anyhow::Error {
    let msg = v
        .as_string()
        .or_else(|| {
            Reflect::get(&v, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{v:?}"));
    anyhow::anyhow!(msg)
}

#[cfg(target_arch = "wasm32")]
#[async_trait::async_trait(?Send)]
impl crate::client::Signer for JsWalletSigner {
    fn account(&self) -> String {
        self.account.clone()
    }

    async fn sign_and_submit(&self, payload: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let obj = wallet_object().ok_or_else(|| anyhow::anyhow!("wallet disconnected"))?;
        let f = Reflect::get(&obj, &JsValue::from_str("signAndSubmitTransaction"))
            .map_err(js_err)?;
        if !f.is_function() {
            anyhow::bail!("wallet does not support signAndSubmitTransaction");
        }
        let arg = js_sys::JSON::parse(&payload.to_string()).map_err(js_err)?;
        let promise = Function::from(f).call1(&obj, &arg).map_err(js_err)?;
        let out = JsFuture::from(Promise::from(promise)).await.map_err(js_err)?;
        if out.is_undefined() || out.is_null() {
            return Ok(serde_json::Value::Null);
        }
        let text: String = js_sys::JSON::stringify(&out)
            .map_err(js_err)?
            .into();
        Ok(serde_json::from_str(&text)?)
    }
}
