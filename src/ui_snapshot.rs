//! UI snapshot and action types for DOM-based rendering
//!
//! This module provides a clean boundary between the headless App core
//! and the DOM frontend, enabling the wasm façade to serialize state as JSON.

use serde::{Deserialize, Serialize};

use crate::app::{App, ToastKind};
use crate::catalog::{empty_state, summary_line, ViewCategory};
use crate::modal::ModalInput;
use crate::paginate::Paginator;
use crate::preview::{fallback_icon, file_kind, FileKind, PreviewState};
use crate::router;
use crate::types::{AsyncOp, BlobRecord};
use crate::upload::{ExpirationPreset, SelectedFile};
use crate::util_text::{format_date, format_datetime, format_size, short_hash};

/// Snapshot of App state for DOM rendering (one-way data flow: Rust → JS)
#[derive(Debug, Clone, Serialize)]
pub struct UiSnapshot {
    /// "media" or "documents"
    pub active: &'static str,
    pub media_count: usize,
    pub documents_count: usize,
    /// "3 items stored on Shelby Network"
    pub summary: String,
    pub account: String,
    pub account_short: String,
    pub wallet_connected: bool,

    pub list: ListPane,
    pub modal: Option<ModalPane>,
    pub upload: UploadPane,
    pub toast: Option<ToastView>,

    /// Hash route for the current screen (`#/v1/...`)
    pub route: String,
    pub fps: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListPane {
    /// "loading", "error" or "ready"
    pub status: &'static str,
    pub error: Option<String>,
    /// Poll failure while an older list is still shown
    pub refresh_error: Option<String>,
    pub rows: Vec<BlobRow>,
    pub selected_index: Option<usize>,
    /// "reveal" or "pages"
    pub paging: &'static str,
    /// "Page 2/5" or "12 of 40"
    pub paging_status: String,
    pub can_advance: bool,
    pub empty_title: Option<String>,
    pub empty_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlobRow {
    pub index: usize,
    pub name: String,
    pub file_name: String,
    pub path: String,
    pub url: String,
    pub size: String,
    pub date: String,
    pub kind: FileKind,
    pub icon: &'static str,
    /// Present only for previewable kinds that have a loader
    pub preview: Option<PreviewState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalPane {
    pub row: BlobRow,
    /// 1-based position in the visible window, when it is still listed
    pub position: Option<usize>,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadPane {
    pub open: bool,
    pub pending: bool,
    pub files: Vec<UploadFileRow>,
    pub presets: Vec<PresetChip>,
    /// "Oct 26, 2026 14:05 UTC"; absent when no date is chosen
    pub expires: Option<String>,
    /// `YYYY-MM-DDTHH:MM` for a datetime-local input
    pub expires_input: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadFileRow {
    pub index: usize,
    pub name: String,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetChip {
    pub days: i64,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToastView {
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
}

fn view_name(view: ViewCategory) -> &'static str {
    match view {
        ViewCategory::Media => "media",
        ViewCategory::Documents => "documents",
    }
}

fn row(app: &App, index: usize, b: &BlobRecord) -> BlobRow {
    let kind = file_kind(&b.name);
    BlobRow {
        index,
        name: b.name.clone(),
        file_name: b.file_name().to_string(),
        path: b.display_path().to_string(),
        url: app.blob_url(b),
        size: format_size(b.size),
        date: format_date(b.creation_micros),
        kind,
        icon: fallback_icon(kind),
        preview: app.preview_state(&b.name).copied(),
    }
}

impl UiSnapshot {
    pub fn from_app(app: &App) -> Self {
        let visible = app.visible();

        let (status, error) = match app.catalog() {
            AsyncOp::Idle | AsyncOp::Pending => ("loading", None),
            AsyncOp::Failed(e) => ("error", Some(e.clone())),
            AsyncOp::Succeeded(_) => ("ready", None),
        };
        let (empty_title, empty_hint) = if status == "ready" && visible.is_empty() {
            let (t, h) = empty_state(app.active());
            (Some(t), Some(h))
        } else {
            (None, None)
        };

        let list = ListPane {
            status,
            error,
            refresh_error: app.refresh_error().map(str::to_string),
            rows: visible.iter().enumerate().map(|(i, b)| row(app, i, b)).collect(),
            selected_index: (!visible.is_empty()).then(|| app.cursor()),
            paging: match app.active_pager() {
                Paginator::Reveal(_) => "reveal",
                Paginator::Pages(_) => "pages",
            },
            paging_status: app.paging_status(),
            can_advance: app.can_advance(),
            empty_title,
            empty_hint,
        };

        let modal = app.modal_record().map(|b| {
            let position = app.modal().position(visible);
            ModalPane {
                row: row(app, position.map(|(i, _)| i).unwrap_or(0), b),
                position: position.map(|(i, _)| i + 1),
                total: visible.len(),
                has_prev: app.modal().has_prev(visible),
                has_next: app.modal().has_next(visible),
            }
        });

        let form = app.upload();
        let upload = UploadPane {
            open: form.is_open(),
            pending: form.is_pending(),
            files: form
                .files()
                .iter()
                .enumerate()
                .map(|(index, f)| UploadFileRow {
                    index,
                    name: f.name.clone(),
                    size: f.known_size().map(format_size),
                })
                .collect(),
            presets: ExpirationPreset::ALL
                .iter()
                .map(|p| PresetChip {
                    days: p.days(),
                    label: p.label(),
                    selected: form.preset() == Some(*p),
                })
                .collect(),
            expires: form.expiration().map(|at| format_datetime(&at)),
            expires_input: form
                .expiration()
                .map(|at| at.format("%Y-%m-%dT%H:%M").to_string()),
            last_error: form.last_error().map(str::to_string),
        };

        let toast = app.toast().map(|t| ToastView {
            kind: t.kind,
            title: t.title.clone(),
            description: t.description.clone(),
            link: t.link.clone(),
        });

        UiSnapshot {
            active: view_name(app.active()),
            media_count: app.count(ViewCategory::Media),
            documents_count: app.count(ViewCategory::Documents),
            summary: summary_line(app.total()),
            account: app.account().to_string(),
            account_short: short_hash(app.account()),
            wallet_connected: app.wallet().is_connected(),
            list,
            modal,
            upload,
            toast,
            route: router::to_hash(&app.current_route()),
            fps: app.fps(),
        }
    }
}

/// User actions from DOM (data flow: JS → Rust)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum UiAction {
    // ----- Catalog -----
    /// Tab click: "media" or "documents"
    SwitchCategory { category: String },
    /// "Load more" or next page
    NextPage,
    PrevPage,
    SelectRow { index: usize },
    Refresh,

    // ----- Preview modal -----
    /// Click on a row in the visible window
    OpenBlob { index: usize },
    /// Escape / ArrowLeft / ArrowRight
    ModalKey { key: String },
    /// Click outside the dialog
    ModalBackdrop,
    OpenExternal,
    CopyUrl,
    Delete,

    // ----- Upload -----
    OpenUpload,
    CloseUpload,
    SelectPreset { days: u32 },
    /// Raw value of the date input (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`)
    SetCustomExpiration { value: String },
    /// File read by the browser picker
    AddFile { name: String, bytes: Vec<u8> },
    RemoveFile { index: usize },
    SubmitUpload,

    // ----- Routing -----
    /// `hashchange` or an initial `location.hash`
    Navigate { hash: String },
}

/// Apply a DOM action to the app. Unknown values are ignored with a warning.
pub fn apply_action(app: &mut App, action: UiAction) {
    match action {
        UiAction::SwitchCategory { category } => match category.as_str() {
            "media" => app.switch_category(ViewCategory::Media),
            "documents" | "docs" => app.switch_category(ViewCategory::Documents),
            other => log::warn!("[shelbyx][dom] unknown category {other:?}"),
        },
        UiAction::NextPage => app.next_page(),
        UiAction::PrevPage => app.prev_page(),
        UiAction::SelectRow { index } => app.select_row(index),
        UiAction::Refresh => app.request_refresh(),

        UiAction::OpenBlob { index } => {
            app.select_row(index);
            app.open_selected();
        }
        UiAction::ModalKey { key } => {
            if let Some(input) = ModalInput::from_key_name(&key) {
                app.modal_input(input);
            }
        }
        UiAction::ModalBackdrop => {
            app.modal_input(ModalInput::Backdrop);
        }
        UiAction::OpenExternal => app.modal_open_external(),
        UiAction::CopyUrl => app.modal_copy_url(),
        UiAction::Delete => app.modal_delete(),

        UiAction::OpenUpload => app.open_upload(),
        UiAction::CloseUpload => app.close_upload(),
        UiAction::SelectPreset { days } => match ExpirationPreset::from_days(days) {
            Some(p) => app.select_preset(p),
            None => log::warn!("[shelbyx][dom] no preset for {days} days"),
        },
        UiAction::SetCustomExpiration { value } => {
            app.set_custom_expiration(&value);
        }
        UiAction::AddFile { name, bytes } => {
            app.add_upload_file(SelectedFile::from_bytes(name, bytes));
        }
        UiAction::RemoveFile { index } => app.remove_upload_file(index),
        UiAction::SubmitUpload => app.submit_upload(),

        UiAction::Navigate { hash } => match router::parse(&hash) {
            Some(route) => app.apply_route(&route),
            None => log::warn!("[shelbyx][dom] unknown route {hash:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::AppEvent;
    use crate::upload::WalletSession;

    fn rec(path: &str, ts: i64) -> BlobRecord {
        BlobRecord {
            name: format!("@0xabc/{path}"),
            blob_name_suffix: path.to_string(),
            size: 2048,
            creation_micros: Some(ts),
        }
    }

    fn app_with(blobs: Vec<BlobRecord>) -> App {
        let mut app = App::new(&Config::for_web("0xabc"), WalletSession::disconnected());
        app.on_event(AppEvent::BlobsLoaded {
            account: "0xabc".into(),
            blobs,
        });
        app
    }

    fn app() -> App {
        app_with(vec![rec("a/b c.png", 2), rec("notes.txt", 1)])
    }

    #[test]
    fn snapshot_rows_carry_display_fields() {
        let snap = UiSnapshot::from_app(&app());
        assert_eq!(snap.active, "media");
        assert_eq!(snap.media_count, 1);
        assert_eq!(snap.documents_count, 1);
        assert_eq!(snap.summary, "2 items stored on Shelby Network");
        let r = &snap.list.rows[0];
        assert_eq!(r.size, "2.00 KB");
        assert!(r.url.ends_with("/shelby/v1/blobs/0xabc/a/b%20c.png"));
        assert_eq!(r.kind, FileKind::Image);
        assert_eq!(snap.route, "#/v1/home");
    }

    #[test]
    fn actions_drive_modal_and_route() {
        let mut app = app();
        let action: UiAction = serde_json::from_str(r#"{"type":"OpenBlob","index":0}"#).unwrap();
        apply_action(&mut app, action);
        let snap = UiSnapshot::from_app(&app);
        let modal = snap.modal.unwrap();
        assert_eq!(modal.position, Some(1));
        assert!(!modal.has_next);
        assert_eq!(snap.route, "#/v1/blob/a/b%20c.png");

        apply_action(&mut app, UiAction::ModalKey { key: "Escape".into() });
        assert!(UiSnapshot::from_app(&app).modal.is_none());

        apply_action(&mut app, UiAction::Navigate { hash: "#/v1/documents".into() });
        assert_eq!(UiSnapshot::from_app(&app).active, "documents");
    }

    #[test]
    fn empty_listing_shows_empty_state_per_tab() {
        let mut app = app_with(vec![]);
        let snap = UiSnapshot::from_app(&app);
        assert_eq!(snap.list.status, "ready");
        assert!(snap.list.rows.is_empty());
        assert_eq!(snap.list.selected_index, None);
        assert_eq!(snap.list.empty_title.as_deref(), Some("No media files"));
        assert_eq!(snap.summary, "0 items stored on Shelby Network");

        apply_action(&mut app, UiAction::SwitchCategory { category: "documents".into() });
        let snap = UiSnapshot::from_app(&app);
        assert_eq!(snap.active, "documents");
        assert!(snap.list.rows.is_empty());
        assert_eq!(snap.list.empty_title.as_deref(), Some("No documents files"));
    }

    #[test]
    fn no_account_asks_for_a_wallet() {
        let app = App::new(&Config::for_web(""), WalletSession::disconnected());
        let snap = UiSnapshot::from_app(&app);
        assert_eq!(snap.list.status, "error");
        assert_eq!(
            snap.list.error.as_deref(),
            Some("Connect your wallet to view your files")
        );
        assert!(snap.list.empty_title.is_none());
    }

    #[test]
    fn snapshot_serializes_lowercase_enums() {
        let json = serde_json::to_value(UiSnapshot::from_app(&app())).unwrap();
        assert_eq!(json["list"]["rows"][0]["kind"], "image");
        assert_eq!(json["list"]["status"], "ready");
    }
}
