use std::future::Future;

pub use web_time::{Duration, Instant};

/// setTimeout-backed sleep; the browser has no tokio timer driver.
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Spawn a detached task on the browser microtask queue.
pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(fut);
}
