use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::Utc;

use crate::catalog::{categorize, CatalogView, ViewCategory};
use crate::config::Config;
use crate::modal::{ModalController, ModalInput, DELETE_COMING_SOON, DELETE_COMING_SOON_DETAIL};
use crate::paginate::Paginator;
use crate::platform::runtime::{Duration, Instant};
use crate::preview::{blob_url, file_kind, PreviewState};
use crate::router::{Route, RouteV1};
use crate::theme::ColorScheme;
use crate::types::{AppEvent, AsyncOp, BlobRecord};
use crate::upload::{
    parse_custom_expiration, ExpirationPreset, PreparedUpload, SelectedFile, UploadForm,
    UploadOutcome, WalletSession,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Upload dialog has focus
    Upload,
    /// Typing a path to add to the upload batch
    AddPath,
    /// Typing a custom expiration date
    CustomDate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    shown_at: Instant,
    ttl: Duration,
}

impl Toast {
    fn new(kind: ToastKind, title: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            link: None,
            shown_at: Instant::now(),
            ttl,
        }
    }

    fn with_description(mut self, d: Option<String>) -> Self {
        self.description = d;
        self
    }

    fn with_link(mut self, l: Option<String>) -> Self {
        self.link = l;
        self
    }

    pub fn is_live(&self) -> bool {
        self.shown_at.elapsed() < self.ttl
    }
}

/// Side effects requested by the state machine. Front ends drain them with
/// [`App::take_effects`] and run them (see `effects::EffectRunner`).
#[derive(Debug)]
pub enum Effect {
    SubmitUpload(PreparedUpload),
    RefreshNow,
    RefreshAfter(Duration),
    /// Start loading the preview of blob `name` from `url`.
    LoadPreview { name: String, url: String },
    /// Drop the loader of blob `name` (it left the window).
    CancelPreview { name: String },
    CopyToClipboard(String),
    OpenExternal(String),
}

/// List placeholder while no account is known.
pub const CONNECT_WALLET_TO_VIEW: &str = "Connect your wallet to view your files";

const TOAST_SHORT: Duration = Duration::from_secs(4);
const TOAST_INFO: Duration = Duration::from_secs(5);
const TOAST_LINK: Duration = Duration::from_secs(10);

pub struct App {
    quit: bool,
    fps: u32,
    theme: ColorScheme,
    account: String,
    api_url: String,
    explorer_url: String,

    catalog: AsyncOp<CatalogView>,
    /// Last poll error while an older list is still on screen.
    refresh_error: Option<String>,

    active: ViewCategory,
    media_pager: Paginator,
    docs_pager: Paginator,
    /// Cursor inside the visible window
    cursor: usize,

    modal: ModalController,
    upload: UploadForm,
    upload_cursor: usize,
    wallet: WalletSession,

    previews: HashMap<String, PreviewState>,
    eager_previews: bool,

    /// Blob route waiting for the catalog to contain it.
    pending_blob_route: Option<String>,

    input_mode: InputMode,
    input_buffer: String,
    toast: Option<Toast>,
    effects: Vec<Effect>,
}

impl App {
    pub fn new(cfg: &Config, wallet: WalletSession) -> Self {
        let mut upload = UploadForm::new(cfg.default_expiration, Utc::now());
        for path in &cfg.initial_files {
            match SelectedFile::from_path(path.clone()) {
                Ok(f) => upload.add_file(f),
                Err(e) => log::warn!("[shelbyx][app] skipping {}: {e}", path.display()),
            }
        }
        Self {
            quit: false,
            fps: cfg.render_fps,
            theme: cfg.theme.colors(),
            account: cfg.account.clone(),
            api_url: cfg.api_url.clone(),
            explorer_url: cfg.explorer_url.clone(),
            catalog: if cfg.account.is_empty() {
                AsyncOp::Failed(CONNECT_WALLET_TO_VIEW.to_string())
            } else {
                AsyncOp::Pending
            },
            refresh_error: None,
            active: ViewCategory::Media,
            media_pager: Paginator::from_policy(cfg.media_paging, cfg.page_size, cfg.reveal_batch),
            docs_pager: Paginator::from_policy(
                cfg.documents_paging,
                cfg.page_size,
                cfg.reveal_batch,
            ),
            cursor: 0,
            modal: ModalController::default(),
            upload,
            upload_cursor: 0,
            wallet,
            previews: HashMap::new(),
            eager_previews: cfg.eager_previews,
            pending_blob_route: None,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            toast: None,
            effects: Vec::new(),
        }
    }

    pub fn fps(&self) -> u32 { self.fps }
    pub fn quit_flag(&self) -> bool { self.quit }
    pub fn theme(&self) -> &ColorScheme { &self.theme }
    pub fn account(&self) -> &str { &self.account }
    pub fn catalog(&self) -> &AsyncOp<CatalogView> { &self.catalog }
    pub fn refresh_error(&self) -> Option<&str> { self.refresh_error.as_deref() }
    pub fn active(&self) -> ViewCategory { self.active }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn modal(&self) -> &ModalController { &self.modal }
    pub fn upload(&self) -> &UploadForm { &self.upload }
    pub fn upload_cursor(&self) -> usize { self.upload_cursor }
    pub fn wallet(&self) -> &WalletSession { &self.wallet }
    pub fn input_mode(&self) -> InputMode { self.input_mode }
    pub fn input_buffer(&self) -> &str { &self.input_buffer }
    pub fn explorer_url(&self) -> &str { &self.explorer_url }

    /// Swap the wallet session. A new account replaces the listed one; losing
    /// the wallet that owned the listed account hides the list.
    pub fn set_wallet(&mut self, wallet: WalletSession) {
        let owned_listing = self.wallet.account().is_some_and(|a| a == self.account);
        match wallet.account() {
            Some(account) if account != self.account => {
                log::info!("[shelbyx][app] account changed to {account}");
                self.switch_account(account, AsyncOp::Pending);
                self.push_effect(Effect::RefreshNow);
            }
            None if owned_listing => {
                log::info!("[shelbyx][app] wallet disconnected, hiding {}", self.account);
                self.switch_account(
                    String::new(),
                    AsyncOp::Failed(CONNECT_WALLET_TO_VIEW.to_string()),
                );
            }
            _ => {}
        }
        self.wallet = wallet;
    }

    fn switch_account(&mut self, account: String, catalog: AsyncOp<CatalogView>) {
        self.account = account;
        self.catalog = catalog;
        self.refresh_error = None;
        self.media_pager.reset();
        self.docs_pager.reset();
        self.cursor = 0;
        self.modal.close();
        self.pending_blob_route = None;
        for name in std::mem::take(&mut self.previews).into_keys() {
            self.push_effect(Effect::CancelPreview { name });
        }
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn push_effect(&mut self, e: Effect) {
        self.effects.push(e);
    }

    /// Re-fetch the list now instead of waiting for the next poll.
    pub fn request_refresh(&mut self) {
        self.push_effect(Effect::RefreshNow);
    }

    // ----- toasts -----

    fn show(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    pub fn show_toast(&mut self, msg: impl Into<String>) {
        self.show(Toast::new(ToastKind::Info, msg, TOAST_SHORT));
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_live())
    }

    // ----- lists -----

    fn pager(&self, view: ViewCategory) -> &Paginator {
        match view {
            ViewCategory::Media => &self.media_pager,
            ViewCategory::Documents => &self.docs_pager,
        }
    }

    fn pager_mut(&mut self, view: ViewCategory) -> &mut Paginator {
        match view {
            ViewCategory::Media => &mut self.media_pager,
            ViewCategory::Documents => &mut self.docs_pager,
        }
    }

    /// Whole sorted list of the active tab (empty while loading).
    pub fn active_list(&self) -> &[BlobRecord] {
        self.catalog
            .data()
            .map(|c| c.list(self.active))
            .unwrap_or(&[])
    }

    /// The window currently rendered for the active tab.
    pub fn visible(&self) -> &[BlobRecord] {
        self.pager(self.active).slice(self.active_list())
    }

    pub fn total(&self) -> usize {
        self.catalog.data().map(|c| c.total()).unwrap_or(0)
    }

    pub fn count(&self, view: ViewCategory) -> usize {
        self.catalog.data().map(|c| c.list(view).len()).unwrap_or(0)
    }

    pub fn paging_status(&self) -> String {
        self.pager(self.active).status(self.active_list().len())
    }

    pub fn active_pager(&self) -> &Paginator {
        self.pager(self.active)
    }

    pub fn can_advance(&self) -> bool {
        self.pager(self.active).can_advance(self.active_list().len())
    }

    pub fn selected(&self) -> Option<&BlobRecord> {
        self.visible().get(self.cursor)
    }

    pub fn blob_url(&self, record: &BlobRecord) -> String {
        blob_url(&self.api_url, &self.account, record.display_path())
    }

    pub fn preview_state(&self, name: &str) -> Option<&PreviewState> {
        self.previews.get(name)
    }

    pub fn switch_category(&mut self, view: ViewCategory) {
        if view == self.active {
            return;
        }
        self.active = view;
        self.pager_mut(view).reset();
        self.cursor = 0;
        self.sync_previews();
    }

    pub fn toggle_category(&mut self) {
        self.switch_category(self.active.toggled());
    }

    pub fn next_page(&mut self) {
        let total = self.active_list().len();
        let view = self.active;
        let paged = matches!(self.pager(view), Paginator::Pages(_));
        if self.pager_mut(view).advance(total) {
            if paged {
                self.cursor = 0;
            }
            self.sync_previews();
        }
    }

    pub fn prev_page(&mut self) {
        let total = self.active_list().len();
        let view = self.active;
        if self.pager_mut(view).retreat(total) {
            self.cursor = 0;
            self.sync_previews();
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moving past the last revealed item reveals the next batch.
    pub fn down(&mut self) {
        let len = self.visible().len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        } else if matches!(self.pager(self.active), Paginator::Reveal(_)) && self.can_advance() {
            self.next_page();
            if self.cursor + 1 < self.visible().len() {
                self.cursor += 1;
            }
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.visible().len().saturating_sub(1);
    }

    pub fn select_row(&mut self, idx: usize) {
        if idx < self.visible().len() {
            self.cursor = idx;
        }
    }

    /// Keep `previews` equal to the set of previewable items that should be
    /// loading: the visible window (or everything when eager), plus the open
    /// modal's blob.
    fn sync_previews(&mut self) {
        let Some(catalog) = self.catalog.data() else {
            return;
        };
        let mut wanted: Vec<&BlobRecord> = if self.eager_previews {
            catalog.media.iter().chain(catalog.documents.iter()).collect()
        } else {
            self.visible().iter().collect()
        };
        if let Some(b) = self.modal.open_name().and_then(|n| {
            catalog
                .media
                .iter()
                .chain(catalog.documents.iter())
                .find(|b| b.name == n)
        }) {
            wanted.push(b);
        }

        let wanted: Vec<(String, String)> = wanted
            .into_iter()
            .filter(|b| file_kind(&b.name).is_previewable())
            .map(|b| (b.name.clone(), self.blob_url(b)))
            .collect();
        let keep: HashSet<&str> = wanted.iter().map(|(n, _)| n.as_str()).collect();

        let stale: Vec<String> = self
            .previews
            .keys()
            .filter(|n| !keep.contains(n.as_str()))
            .cloned()
            .collect();
        for name in stale {
            self.previews.remove(&name);
            self.effects.push(Effect::CancelPreview { name });
        }
        for (name, url) in wanted {
            if !self.previews.contains_key(&name) {
                self.previews.insert(name.clone(), PreviewState::default());
                self.effects.push(Effect::LoadPreview { name, url });
            }
        }
    }

    // ----- modal -----

    pub fn open_selected(&mut self) {
        if let Some(name) = self.selected().map(|b| b.name.clone()) {
            self.open_blob(name);
        }
    }

    pub fn open_blob(&mut self, name: String) {
        self.modal.open(name);
        self.sync_previews();
    }

    pub fn modal_record(&self) -> Option<&BlobRecord> {
        let name = self.modal.open_name()?;
        self.modal
            .current(self.visible())
            .or_else(|| {
                self.catalog.data().and_then(|c| {
                    c.media
                        .iter()
                        .chain(c.documents.iter())
                        .find(|b| b.name == name)
                })
            })
    }

    /// Escape / arrows / backdrop while the modal is open.
    pub fn modal_input(&mut self, input: ModalInput) -> bool {
        let visible = self.pager(self.active).slice(self.active_list()).to_vec();
        let changed = self.modal.handle(input, &visible);
        if changed {
            if let Some((i, _)) = self.modal.position(&visible) {
                self.cursor = i;
            }
            self.sync_previews();
        }
        changed
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
        self.sync_previews();
    }

    /// "Open in New Tab" / "Download": the front end decides what opening means.
    pub fn modal_open_external(&mut self) {
        if let Some(url) = self.modal_record().map(|b| self.blob_url(b)) {
            self.push_effect(Effect::OpenExternal(url));
        }
    }

    pub fn modal_copy_url(&mut self) {
        if let Some(url) = self.modal_record().map(|b| self.blob_url(b)) {
            self.push_effect(Effect::CopyToClipboard(url));
        }
    }

    pub fn modal_delete(&mut self) {
        self.show(
            Toast::new(ToastKind::Info, DELETE_COMING_SOON, TOAST_SHORT)
                .with_description(Some(DELETE_COMING_SOON_DETAIL.to_string())),
        );
    }

    // ----- upload -----

    pub fn open_upload(&mut self) {
        self.upload.open();
        self.upload_cursor = 0;
        self.input_mode = InputMode::Upload;
    }

    pub fn close_upload(&mut self) {
        self.upload.close();
        if !self.upload.is_open() {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn select_preset(&mut self, preset: ExpirationPreset) {
        self.upload.select_preset(preset, Utc::now());
    }

    pub fn cycle_preset(&mut self, forward: bool) {
        let current = self.upload.preset().unwrap_or_default();
        let next = if forward { current.next() } else { current.prev() };
        self.select_preset(next);
    }

    pub fn add_upload_file(&mut self, file: SelectedFile) {
        self.upload.add_file(file);
    }

    pub fn add_upload_path(&mut self, path: impl Into<PathBuf>) {
        match SelectedFile::from_path(path) {
            Ok(f) => self.upload.add_file(f),
            Err(e) => self.show(Toast::new(ToastKind::Error, e.to_string(), TOAST_SHORT)),
        }
    }

    pub fn remove_upload_file(&mut self, index: usize) {
        if self.upload.remove_file(index).is_some() {
            let len = self.upload.files().len();
            self.upload_cursor = self.upload_cursor.min(len.saturating_sub(1));
        }
    }

    pub fn upload_cursor_up(&mut self) {
        self.upload_cursor = self.upload_cursor.saturating_sub(1);
    }

    pub fn upload_cursor_down(&mut self) {
        if self.upload_cursor + 1 < self.upload.files().len() {
            self.upload_cursor += 1;
        }
    }

    pub fn set_custom_expiration(&mut self, input: &str) {
        let now = Utc::now();
        let keep = self.upload.expiration().unwrap_or(now);
        let result = parse_custom_expiration(input, keep, now)
            .and_then(|at| self.upload.set_custom_expiration(at, now));
        if let Err(rejection) = result {
            self.show(
                Toast::new(ToastKind::Error, rejection.title(), TOAST_SHORT)
                    .with_description(Some(rejection.to_string())),
            );
        }
    }

    /// Validate and, if accepted, queue the submission.
    pub fn submit_upload(&mut self) {
        match self.upload.begin(&self.wallet) {
            Ok(prepared) => self.push_effect(Effect::SubmitUpload(prepared)),
            Err(rejection) => self.show(
                Toast::new(ToastKind::Error, rejection.title(), TOAST_SHORT)
                    .with_description(Some(rejection.to_string())),
            ),
        }
    }

    fn on_upload_finished(&mut self, result: Result<crate::client::UploadReceipt, String>) {
        let outcome = self.upload.finish(result, &self.explorer_url);
        match &outcome {
            UploadOutcome::Succeeded { explorer_link, .. } => {
                let ttl = if explorer_link.is_some() { TOAST_LINK } else { TOAST_SHORT };
                self.show(
                    Toast::new(ToastKind::Success, outcome.title(), ttl)
                        .with_description(outcome.description())
                        .with_link(explorer_link.clone()),
                );
                self.upload_cursor = 0;
                if self.input_mode != InputMode::Normal {
                    self.input_mode = InputMode::Normal;
                }
                self.push_effect(Effect::RefreshNow);
            }
            UploadOutcome::Failed { failure, .. } => {
                let (kind, ttl) = match failure.refresh_after() {
                    Some(_) => (ToastKind::Info, TOAST_INFO),
                    None => (ToastKind::Error, TOAST_SHORT),
                };
                self.show(Toast::new(kind, outcome.title(), ttl).with_description(outcome.description()));
                if let Some(delay) = failure.refresh_after() {
                    self.push_effect(Effect::RefreshAfter(delay));
                }
            }
        }
    }

    // ----- text input -----

    pub fn start_add_path(&mut self) {
        self.input_buffer.clear();
        self.input_mode = InputMode::AddPath;
    }

    pub fn start_custom_date(&mut self) {
        self.input_buffer = self
            .upload
            .expiration()
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        self.input_mode = InputMode::CustomDate;
    }

    pub fn input_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn input_backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn input_cancel(&mut self) {
        self.input_buffer.clear();
        self.input_mode = InputMode::Upload;
    }

    pub fn input_commit(&mut self) {
        let text = std::mem::take(&mut self.input_buffer);
        let text = text.trim();
        match self.input_mode {
            InputMode::AddPath if !text.is_empty() => self.add_upload_path(text),
            InputMode::CustomDate if !text.is_empty() => self.set_custom_expiration(text),
            _ => {}
        }
        self.input_mode = InputMode::Upload;
    }

    // ----- routes -----

    pub fn apply_route(&mut self, route: &Route) {
        match route {
            Route::V1(RouteV1::Home) => {
                self.modal.close();
                self.switch_category(ViewCategory::Media);
            }
            Route::V1(RouteV1::Documents) => {
                self.modal.close();
                self.switch_category(ViewCategory::Documents);
            }
            Route::V1(RouteV1::Upload) => self.open_upload(),
            Route::V1(RouteV1::Blob { suffix }) => {
                self.pending_blob_route = Some(suffix.clone());
                self.resolve_blob_route();
            }
        }
    }

    /// Route describing what is on screen, for `location.hash`.
    pub fn current_route(&self) -> Route {
        if let Some(b) = self.modal_record() {
            return Route::V1(RouteV1::Blob {
                suffix: b.display_path().to_string(),
            });
        }
        if self.upload.is_open() {
            return Route::V1(RouteV1::Upload);
        }
        match self.active {
            ViewCategory::Media => Route::V1(RouteV1::Home),
            ViewCategory::Documents => Route::V1(RouteV1::Documents),
        }
    }

    fn resolve_blob_route(&mut self) {
        let Some(suffix) = self.pending_blob_route.clone() else {
            return;
        };
        let Some((view, name)) = self
            .catalog
            .data()
            .and_then(|c| c.find_by_suffix(&suffix))
            .map(|(v, b)| (v, b.name.clone()))
        else {
            return;
        };
        self.pending_blob_route = None;
        self.switch_category(view);
        self.open_blob(name);
    }

    // ----- events -----

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Quit => self.quit = true,
            AppEvent::BlobsLoaded { account, .. } | AppEvent::BlobsFailed { account, .. }
                if account != self.account =>
            {
                log::debug!("[shelbyx][app] dropping stale list for {account}");
            }
            AppEvent::BlobsLoaded { blobs, .. } => {
                let view = categorize(&blobs);
                let (media, docs) = (view.media.len(), view.documents.len());
                self.catalog = AsyncOp::Succeeded(view);
                self.refresh_error = None;
                self.media_pager.clamp(media);
                self.docs_pager.clamp(docs);
                let len = self.visible().len();
                self.cursor = self.cursor.min(len.saturating_sub(1));
                self.resolve_blob_route();
                self.sync_previews();
            }
            AppEvent::BlobsFailed { message, .. } => {
                if self.catalog.data().is_some() {
                    self.refresh_error = Some(message);
                } else {
                    self.catalog = AsyncOp::Failed(message);
                }
            }
            AppEvent::PreviewLoaded { name, .. } => {
                if let Some(s) = self.previews.get_mut(&name) {
                    s.on_loaded();
                }
            }
            AppEvent::PreviewRetrying { name, retry } => {
                if let Some(s) = self.previews.get_mut(&name) {
                    s.retry_count = retry;
                }
            }
            AppEvent::PreviewFailed { name } => {
                if let Some(s) = self.previews.get_mut(&name) {
                    s.errored = true;
                }
            }
            AppEvent::UploadFinished(result) => self.on_upload_finished(result),
        }
    }
}
