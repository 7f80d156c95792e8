use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    // Page-provided bridge (wallet extension / embedding shell).
    // `catch` prevents a panic when the function is missing.
    #[wasm_bindgen(js_namespace = window, js_name = __shelbyx_copy_text, catch)]
    fn copy_text_bridge(s: &str) -> Result<js_sys::Promise, JsValue>;
}

pub fn copy_to_clipboard(s: &str) -> bool {
    if let Ok(promise) = copy_text_bridge(s) {
        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(promise).await;
        });
        return true;
    }

    // Plain web clipboard (secure contexts only).
    let Some(win) = web_sys::window() else {
        return false;
    };
    match win.navigator().clipboard() {
        Some(clip) => {
            let p = clip.write_text(s);
            wasm_bindgen_futures::spawn_local(async move {
                let _ = JsFuture::from(p).await;
            });
            true
        }
        None => false,
    }
}
