//! Rate-limit friendly sending for native targets.
//! Wasm builds call `send` directly; the browser fetch owns retries there.

use rand::{thread_rng, Rng};
use std::time::Duration;

/// Send `req`, retrying on 429 and on transport errors (timeouts excluded)
/// with jittered backoff. Requests with a streaming body go out once.
pub async fn send_with_backoff(
    req: reqwest::RequestBuilder,
    label: &str,
    max_retries: u8,
) -> Result<reqwest::Response, reqwest::Error> {
    for attempt in 1..=max_retries {
        let Some(this_try) = req.try_clone() else {
            break;
        };
        let reason = match this_try.send().await {
            Ok(res) if res.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                "429".to_string()
            }
            Ok(res) => return Ok(res),
            Err(e) if e.is_timeout() => return Err(e),
            Err(e) => format!("err {e}"),
        };
        let wait = backoff_delay(attempt);
        log::warn!(
            "[shelbyx][net] {label}: {reason}; retry={attempt} backoff={}ms",
            wait.as_millis()
        );
        tokio::time::sleep(wait).await;
    }
    req.send().await
}

/// 300ms doubling per attempt (capped at 4.8s) plus up to 250ms of jitter.
fn backoff_delay(attempt: u8) -> Duration {
    let base = 300u64 << (attempt.clamp(1, 5) - 1);
    let jitter: u64 = thread_rng().gen_range(0..=250);
    Duration::from_millis(base + jitter)
}
