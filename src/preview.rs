//! Preview resolution: media kind, retrieval URL, and the retry loop that
//! loads a preview while the network is rate-limiting us.
//!
//! The loop is an ordinary async function so both front ends drive it the
//! same way; a [`PreviewTask`] owns the spawned loop and aborts it (including
//! any pending backoff sleep) when dropped.

use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::extension_of;
use crate::client::MediaFetcher;
use crate::platform::runtime::{self, Duration};
use crate::types::AppEvent;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "m4v", "mkv", "ogv"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];
pub const DOC_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "md", "rtf", "odt", "xlsx", "xls", "ppt", "pptx", "csv",
];

/// Default network host serving blob reads.
pub const DEFAULT_API_URL: &str = "https://api.shelbynet.shelby.xyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Document,
    Unknown,
}

impl FileKind {
    /// Kinds that get an inline preview (and therefore a loader).
    pub fn is_previewable(self) -> bool {
        matches!(self, FileKind::Image | FileKind::Video)
    }
}

pub fn file_kind(name: &str) -> FileKind {
    let ext = extension_of(name);
    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        FileKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        FileKind::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        FileKind::Audio
    } else if DOC_EXTENSIONS.contains(&ext) {
        FileKind::Document
    } else {
        FileKind::Unknown
    }
}

/// Static stand-in shown when there is no preview (or it failed for good).
pub fn fallback_icon(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Image => "🖼",
        FileKind::Video => "🎞",
        FileKind::Audio => "♪",
        FileKind::Document => "📄",
        FileKind::Unknown => "📁",
    }
}

/// Percent-encode every `/`-separated segment on its own; separators survive.
pub fn encode_blob_path(suffix: &str) -> String {
    suffix
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `<base>/shelby/v1/blobs/<account>/<encoded path>`
pub fn blob_url(base: &str, account: &str, suffix: &str) -> String {
    format!(
        "{}/shelby/v1/blobs/{}/{}",
        base.trim_end_matches('/'),
        account,
        encode_blob_path(suffix)
    )
}

/// Same URL with a cache-busting `retry=<n>` parameter.
pub fn retry_url(url: &str, retry: u8) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}retry={retry}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u8,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// `2^attempt * base`: 1s, 2s, 4s with the defaults.
    pub fn delay_for(&self, attempt: u8) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << u32::from(attempt.min(16)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { retry: u8, delay: Duration },
    GiveUp,
}

/// Per-item preview state; lives as long as the item is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct PreviewState {
    pub loaded: bool,
    pub errored: bool,
    pub retry_count: u8,
}

impl PreviewState {
    pub fn on_loaded(&mut self) {
        self.loaded = true;
        self.errored = false;
    }

    /// Record a failed load and decide whether another attempt is due.
    ///
    /// The attempt that fails while `retry_count == max_retries` is final:
    /// the state becomes permanently errored.
    pub fn on_failed(&mut self, policy: &RetryPolicy) -> RetryDecision {
        if self.retry_count < policy.max_retries {
            let delay = policy.delay_for(self.retry_count);
            self.retry_count += 1;
            RetryDecision::Retry {
                retry: self.retry_count,
                delay,
            }
        } else {
            self.errored = true;
            RetryDecision::GiveUp
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded && !self.errored
    }

    /// Icon fallback once retries are exhausted.
    pub fn shows_fallback(&self) -> bool {
        self.errored
    }
}

/// Progress reported by [`load_with_retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewProgress {
    Loaded { bytes: usize, url: String },
    Retrying { retry: u8, delay: Duration },
    Failed,
}

/// Fetch `url`, retrying with exponential backoff and a cache-busting query
/// parameter. Returns the final state.
pub async fn load_with_retry<F>(
    fetcher: &dyn MediaFetcher,
    url: &str,
    policy: RetryPolicy,
    mut on_progress: F,
) -> PreviewState
where
    F: FnMut(PreviewProgress),
{
    let mut state = PreviewState::default();
    let mut current = url.to_string();
    loop {
        match fetcher.fetch(&current).await {
            Ok(bytes) => {
                state.on_loaded();
                on_progress(PreviewProgress::Loaded {
                    bytes: bytes.len(),
                    url: current,
                });
                return state;
            }
            Err(e) => match state.on_failed(&policy) {
                RetryDecision::Retry { retry, delay } => {
                    log::debug!(
                        "[shelbyx][preview] {url} failed ({e}); retry={retry} backoff={}ms",
                        delay.as_millis()
                    );
                    on_progress(PreviewProgress::Retrying { retry, delay });
                    runtime::sleep(delay).await;
                    current = retry_url(url, retry);
                }
                RetryDecision::GiveUp => {
                    log::warn!(
                        "[shelbyx][preview] giving up on {url} after {} retries: {e}",
                        state.retry_count
                    );
                    on_progress(PreviewProgress::Failed);
                    return state;
                }
            },
        }
    }
}

/// Handle to a spawned preview loader; dropping it cancels the loader.
#[derive(Debug)]
pub struct PreviewTask {
    abort: AbortHandle,
}

impl PreviewTask {
    /// Spawn the retry loop for one blob and forward progress as [`AppEvent`]s.
    pub fn spawn(
        fetcher: Arc<dyn MediaFetcher>,
        name: String,
        url: String,
        policy: RetryPolicy,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let (abort, registration) = AbortHandle::new_pair();
        let fut = async move {
            load_with_retry(fetcher.as_ref(), &url, policy, |p| {
                let ev = match p {
                    PreviewProgress::Loaded { bytes, .. } => AppEvent::PreviewLoaded {
                        name: name.clone(),
                        bytes,
                    },
                    PreviewProgress::Retrying { retry, .. } => AppEvent::PreviewRetrying {
                        name: name.clone(),
                        retry,
                    },
                    PreviewProgress::Failed => AppEvent::PreviewFailed { name: name.clone() },
                };
                let _ = events.send(ev);
            })
            .await;
        };
        runtime::spawn(async move {
            let _ = Abortable::new(fut, registration).await;
        });
        Self { abort }
    }
}

impl Drop for PreviewTask {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_case_insensitive() {
        assert_eq!(file_kind("a.PNG"), FileKind::Image);
        assert_eq!(file_kind("a.png"), FileKind::Image);
        assert_eq!(file_kind("clip.MkV"), FileKind::Video);
        assert_eq!(file_kind("song.Ogg"), FileKind::Audio);
        assert_eq!(file_kind("notes.MD"), FileKind::Document);
        assert_eq!(file_kind("archive.zip"), FileKind::Unknown);
        assert_eq!(file_kind("Makefile"), FileKind::Unknown);
    }

    #[test]
    fn path_segments_are_encoded_independently() {
        assert_eq!(encode_blob_path("b c.png"), "b%20c.png");
        assert_eq!(encode_blob_path("dir one/b c#1.png"), "dir%20one/b%20c%231.png");
        assert_eq!(
            blob_url("https://api.shelbynet.shelby.xyz/", "0xabc", "a/b c.png"),
            "https://api.shelbynet.shelby.xyz/shelby/v1/blobs/0xabc/a/b%20c.png"
        );
    }

    #[test]
    fn retry_url_appends_cache_buster() {
        assert_eq!(retry_url("https://x/y.png", 2), "https://x/y.png?retry=2");
        assert_eq!(retry_url("https://x/y.png?a=1", 1), "https://x/y.png?a=1&retry=1");
    }

    #[test]
    fn backoff_doubles_from_one_second() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(0), Duration::from_millis(1000));
        assert_eq!(p.delay_for(1), Duration::from_millis(2000));
        assert_eq!(p.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn state_gives_up_after_three_retries() {
        let p = RetryPolicy::default();
        let mut s = PreviewState::default();
        for expected in 1..=3u8 {
            match s.on_failed(&p) {
                RetryDecision::Retry { retry, .. } => assert_eq!(retry, expected),
                RetryDecision::GiveUp => panic!("gave up too early"),
            }
        }
        assert_eq!(s.on_failed(&p), RetryDecision::GiveUp);
        assert!(s.shows_fallback());
        assert_eq!(s.retry_count, 3);
        // stays put
        assert_eq!(s.on_failed(&p), RetryDecision::GiveUp);
        assert_eq!(s.retry_count, 3);
    }
}
