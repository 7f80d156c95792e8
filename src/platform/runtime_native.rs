use std::future::Future;
use std::time::{Duration as StdDuration, Instant as StdInstant};

use super::WasmCompatSend;

pub type Duration = StdDuration;
pub type Instant = StdInstant;

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Spawn a detached task on the ambient tokio runtime.
pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + WasmCompatSend + 'static,
{
    tokio::spawn(fut);
}
