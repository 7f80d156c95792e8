use ratatui::{
    Frame,
    layout::{Layout, Direction, Constraint, Rect},
    widgets::{Block, Borders, BorderType, List, ListItem, ListState, Paragraph, Wrap, Clear},
    style::{Style, Modifier},
    text::{Line, Span},
};
use crate::app::{App, InputMode, ToastKind};
use crate::catalog::{empty_state, summary_line, ViewCategory};
use crate::preview::{fallback_icon, file_kind, PreviewState};
use crate::types::{AsyncOp, BlobRecord};
use crate::upload::ExpirationPreset;
use crate::util_text::{ellipsize, format_date, format_datetime, format_size, short_hash};

/// Terminal sessions have no wallet to sign with.
const UPLOADS_WEB_ONLY: &str = "uploads need the browser wallet";

// ===============================
// Top-level draw
// ===============================
pub fn draw(f:&mut Frame, app:&App){
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(0),    // body
            Constraint::Length(2), // footer
        ])
        .split(f.area());

    header(f, chunks[0], app);
    body(f, chunks[1], app);
    footer(f, chunks[2], app);

    // Overlays render last
    if app.modal().is_open() {
        draw_preview_modal(f, app);
    }
    if app.upload().is_open() {
        draw_upload_dialog(f, app);
    }
    if matches!(app.input_mode(), InputMode::AddPath | InputMode::CustomDate) {
        draw_input_prompt(f, app);
    }
    if app.toast().is_some() {
        draw_toast(f, app);
    }
}

// ===============================
// Header
// ===============================
fn header(f:&mut Frame, area:Rect, app:&App){
    let theme = app.theme();
    let mut spans = Vec::new();

    for (i, view) in [ViewCategory::Media, ViewCategory::Documents].into_iter().enumerate() {
        spans.push(Span::raw(if i == 0 { "┌─" } else { "┬─" }));
        let title = format!("{} ({})", view.title(), app.count(view));
        if view == app.active() {
            spans.push(Span::styled(title, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
        } else {
            spans.push(Span::raw(title));
        }
        spans.push(Span::raw("─"));
    }
    spans.push(Span::raw("┐  "));

    if app.catalog().data().is_some() {
        spans.push(Span::styled(summary_line(app.total()), Style::default().fg(theme.text_dim)));
    }
    spans.push(Span::raw("  "));
    let who = if app.wallet().is_connected() { "● " } else { "○ " };
    spans.push(Span::styled(who, Style::default().fg(theme.accent)));
    spans.push(Span::raw(short_hash(app.account())));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain));
    f.render_widget(paragraph, area);
}

// ===============================
// Body: blob list
// ===============================
fn body(f:&mut Frame, area:Rect, app:&App){
    let theme = app.theme();
    let block = Block::default()
        .title(list_title(app))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if app.input_mode() == InputMode::Normal { theme.focus_border } else { theme.unfocused_border }));

    match app.catalog() {
        AsyncOp::Idle | AsyncOp::Pending => {
            let p = Paragraph::new("Loading files...")
                .style(Style::default().fg(theme.text_dim))
                .block(block);
            f.render_widget(p, area);
            return;
        }
        AsyncOp::Failed(msg) => {
            let p = Paragraph::new(format!("Error loading files: {msg}"))
                .style(Style::default().fg(theme.toast_error))
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(p, area);
            return;
        }
        AsyncOp::Succeeded(_) => {}
    }

    let visible = app.visible();
    if visible.is_empty() {
        let (title, hint) = empty_state(app.active());
        let p = Paragraph::new(vec![
            Line::from(Span::styled(title, Style::default().fg(theme.text).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(hint, Style::default().fg(theme.text_dim))),
        ])
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(36).max(12);
    let mut items: Vec<ListItem> = visible
        .iter()
        .map(|b| blob_row(app, b, name_width))
        .collect();
    if app.can_advance() {
        let more = match app.active_pager() {
            crate::paginate::Paginator::Reveal(_) => "  ↓ more (→ to load)",
            crate::paginate::Paginator::Pages(_) => "  → next page",
        };
        items.push(ListItem::new(more).style(Style::default().fg(theme.text_dim)));
    }

    let mut st = ListState::default();
    st.select(Some(app.cursor().min(visible.len().saturating_sub(1))));
    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.selection_bg).fg(theme.selection_fg).add_modifier(Modifier::BOLD))
        .highlight_symbol("")
        .block(block);
    f.render_stateful_widget(list, area, &mut st);
}

fn list_title(app:&App) -> String {
    let total = app.active_list().len();
    let mut title = format!(" {} · {} ", app.active().title(), app.paging_status());
    if total == 0 {
        title = format!(" {} ", app.active().title());
    }
    if let Some(err) = app.refresh_error() {
        title.push_str(&format!("· refresh failed: {} ", ellipsize(err, 40)));
    }
    title
}

/// Preview column: a spinner-ish marker while loading, the kind's fallback
/// icon otherwise.
fn preview_marker(state:Option<&PreviewState>, b:&BlobRecord) -> String {
    let kind = file_kind(&b.name);
    match state {
        Some(s) if s.loaded => "▣".to_string(),
        Some(s) if s.errored => fallback_icon(kind).to_string(),
        Some(s) if s.retry_count > 0 => format!("↻{}", s.retry_count),
        Some(_) => "…".to_string(),
        None => fallback_icon(kind).to_string(),
    }
}

fn blob_row<'a>(app:&App, b:&'a BlobRecord, name_width:usize) -> ListItem<'a> {
    let theme = app.theme();
    let marker = preview_marker(app.preview_state(&b.name), b);
    let name = ellipsize(b.display_path(), name_width);
    ListItem::new(Line::from(vec![
        Span::styled(format!("{marker:<3} "), Style::default().fg(theme.badge)),
        Span::styled(format!("{name:<name_width$}"), Style::default().fg(theme.text)),
        Span::styled(format!(" {:>10}", format_size(b.size)), Style::default().fg(theme.text_dim)),
        Span::styled(format!("  {:>12}", format_date(b.creation_micros)), Style::default().fg(theme.text_dim)),
    ]))
}

// ===============================
// Footer
// ===============================
fn footer(f:&mut Frame, area:Rect, app:&App){
    let theme = app.theme();
    let key = |k:&'static str| Span::styled(k, Style::default().fg(theme.accent));
    let can_upload = app.wallet().is_connected();
    let spans: Vec<Span> = match app.input_mode() {
        InputMode::Normal => vec![
            key("Tab"), Span::raw(" media/docs │ "),
            key("↑/↓"), Span::raw(" move │ "),
            key("←/→"), Span::raw(" page │ "),
            key("Enter"), Span::raw(" preview │ "),
            key("u"), Span::raw(if can_upload { " upload │ " } else { " upload (web only) │ " }),
            key("r"), Span::raw(" refresh │ "),
            key("q"), Span::raw(" quit"),
            Span::raw(format!(" │ FPS {}", app.fps())),
        ],
        InputMode::Upload => {
            let mut spans = vec![
                key("a"), Span::raw(" add file │ "),
                key("x"), Span::raw(" remove │ "),
                key("←/→"), Span::raw(" expiration │ "),
                key("c"), Span::raw(" custom date │ "),
            ];
            if can_upload {
                spans.extend([key("Enter"), Span::raw(" upload │ ")]);
            } else {
                spans.push(Span::styled(UPLOADS_WEB_ONLY, Style::default().fg(theme.text_dim)));
                spans.push(Span::raw(" │ "));
            }
            spans.extend([key("Esc"), Span::raw(" close")]);
            spans
        }
        InputMode::AddPath | InputMode::CustomDate => vec![
            key("Enter"), Span::raw(" confirm │ "),
            key("Esc"), Span::raw(" cancel"),
        ],
    };
    let w = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP).border_type(BorderType::Plain));
    f.render_widget(w, area);
}

// ===============================
// Overlays
// ===============================
fn centered(area:Rect, pct_w:u16, height:u16) -> Rect {
    let width = (area.width * pct_w) / 100;
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

fn draw_preview_modal(f:&mut Frame, app:&App){
    let theme = app.theme();
    let overlay = centered(f.area(), 70, 14);
    f.render_widget(Clear, overlay);

    let Some(b) = app.modal_record() else {
        let p = Paragraph::new("This file is no longer listed.")
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Preview "));
        f.render_widget(p, overlay);
        return;
    };

    let kind = file_kind(&b.name);
    let visible = app.visible();
    let position = app
        .modal()
        .position(visible)
        .map(|(i, n)| format!(" {}/{} ", i + 1, n))
        .unwrap_or_default();
    let preview = match app.preview_state(&b.name) {
        Some(s) if s.loaded => "Preview loaded".to_string(),
        Some(s) if s.errored => format!("{} Preview unavailable", fallback_icon(kind)),
        Some(s) if s.retry_count > 0 => format!("Loading preview (retry {}/3)...", s.retry_count),
        Some(_) => "Loading preview...".to_string(),
        None => format!("{} No inline preview for this file type", fallback_icon(kind)),
    };

    let dim = Style::default().fg(theme.text_dim);
    let lines = vec![
        Line::from(Span::styled(b.file_name().to_string(), Style::default().fg(theme.text).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(b.display_path().to_string(), dim)),
        Line::from(""),
        Line::from(vec![Span::styled("Size     ", dim), Span::raw(format_size(b.size))]),
        Line::from(vec![Span::styled("Created  ", dim), Span::raw(format_date(b.creation_micros))]),
        Line::from(vec![Span::styled("Type     ", dim), Span::raw(format!("{kind:?}"))]),
        Line::from(vec![Span::styled("URL      ", dim), Span::styled(app.blob_url(b), Style::default().fg(theme.accent))]),
        Line::from(""),
        Line::from(Span::styled(preview, Style::default().fg(theme.badge))),
        Line::from(""),
        Line::from(vec![
            Span::styled(if app.modal().has_prev(visible) { "← prev  " } else { "        " }, dim),
            Span::styled(if app.modal().has_next(visible) { "→ next  " } else { "        " }, dim),
            Span::styled("o", Style::default().fg(theme.accent)), Span::raw(" open  "),
            Span::styled("d", Style::default().fg(theme.accent)), Span::raw(" download  "),
            Span::styled("y", Style::default().fg(theme.accent)), Span::raw(" copy URL  "),
            Span::styled("x", Style::default().fg(theme.accent)), Span::raw(" delete  "),
            Span::styled("Esc", Style::default().fg(theme.accent)), Span::raw(" close"),
        ]),
    ];

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default()
            .title(format!(" Preview{position}"))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.focus_border))
            .style(Style::default().bg(theme.background)));
    f.render_widget(p, overlay);
}

fn draw_upload_dialog(f:&mut Frame, app:&App){
    let theme = app.theme();
    let form = app.upload();
    let overlay = centered(f.area(), 70, 18);
    f.render_widget(Clear, overlay);

    let container = Block::default()
        .title(if form.is_pending() { " Upload Files · Uploading... " } else { " Upload Files " })
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.focus_border))
        .style(Style::default().bg(theme.background));
    let inner = container.inner(overlay);
    f.render_widget(container, overlay);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4), Constraint::Length(2)])
        .split(inner);

    // Selected files
    let items: Vec<ListItem> = form.files().iter().map(|file| {
        let size = file.known_size().map(format_size).unwrap_or_else(|| "—".to_string());
        ListItem::new(format!("{}  {}", file.name, size))
    }).collect();
    let mut st = ListState::default();
    if !items.is_empty() {
        st.select(Some(app.upload_cursor().min(items.len() - 1)));
    }
    let files_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" Selected files ({}) ", form.files().len()));
    if items.is_empty() {
        let p = Paragraph::new("Press a to add a file path").style(Style::default().fg(theme.text_dim)).block(files_block);
        f.render_widget(p, chunks[0]);
    } else {
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .block(files_block);
        f.render_stateful_widget(list, chunks[0], &mut st);
    }

    // Expiration presets
    let mut presets: Vec<Span> = vec![Span::raw("Expiration Date  ")];
    for p in ExpirationPreset::ALL {
        let style = if form.preset() == Some(p) {
            Style::default().fg(theme.selection_fg).bg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        presets.push(Span::styled(format!(" {} ", p.label()), style));
        presets.push(Span::raw(" "));
    }
    let expires = match form.expiration() {
        Some(at) => Line::from(vec![
            Span::raw("Files will expire on "),
            Span::styled(format_datetime(&at), Style::default().fg(theme.accent)),
        ]),
        None => Line::from(Span::styled("No expiration date selected", Style::default().fg(theme.toast_error))),
    };
    let mut lines = vec![Line::from(presets), expires];
    if let Some(err) = form.last_error() {
        lines.push(Line::from(Span::styled(ellipsize(err, inner.width as usize), Style::default().fg(theme.toast_error))));
    }
    f.render_widget(Paragraph::new(lines), chunks[1]);

    let wallet = if app.wallet().is_connected() {
        Span::styled("Wallet connected", Style::default().fg(theme.toast_success))
    } else {
        Span::styled(format!("No wallet connected: {UPLOADS_WEB_ONLY}"), Style::default().fg(theme.text_dim))
    };
    f.render_widget(Paragraph::new(Line::from(wallet)), chunks[2]);
}

fn draw_input_prompt(f:&mut Frame, app:&App){
    let theme = app.theme();
    let title = match app.input_mode() {
        InputMode::AddPath => " Add file path ",
        _ => " Expiration (YYYY-MM-DD [HH:MM], UTC) ",
    };
    let overlay = centered(f.area(), 60, 3);
    f.render_widget(Clear, overlay);
    let p = Paragraph::new(format!("{}▏", app.input_buffer()))
        .block(Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.background)));
    f.render_widget(p, overlay);
}

fn draw_toast(f: &mut Frame, app: &App) {
    let Some(toast) = app.toast() else { return };
    let theme = app.theme();
    let (color, mark) = match toast.kind {
        ToastKind::Success => (theme.toast_success, "✓"),
        ToastKind::Error => (theme.toast_error, "✗"),
        ToastKind::Info => (theme.toast_info, "ℹ"),
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{mark} {}", toast.title),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if let Some(d) = &toast.description {
        lines.push(Line::from(Span::raw(d.clone())));
    }
    if let Some(link) = &toast.link {
        lines.push(Line::from(Span::styled(link.clone(), Style::default().fg(theme.accent))));
    }

    // Bottom-right corner, like the web toasts
    let area = f.area();
    let width = (area.width / 2).max(30).min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let overlay = Rect {
        x: area.width.saturating_sub(width),
        y: area.height.saturating_sub(height + 2),
        width,
        height,
    };
    f.render_widget(Clear, overlay);
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme.background)));
    f.render_widget(p, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::AppEvent;
    use crate::upload::WalletSession;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let mut app = App::new(&Config::for_web("0xabc"), WalletSession::disconnected());
        app.on_event(AppEvent::BlobsLoaded {
            account: "0xabc".into(),
            blobs: vec![],
        });
        app
    }

    #[test]
    fn walletless_terminal_says_uploads_are_web_only() {
        let mut app = app();
        assert!(screen(&app).contains("upload (web only)"));

        app.open_upload();
        let text = screen(&app);
        assert!(text.contains(UPLOADS_WEB_ONLY));
        assert!(!text.contains("Enter upload"));
    }

    #[test]
    fn empty_tab_renders_empty_state() {
        let text = screen(&app());
        assert!(text.contains("No media files"));
        assert!(text.contains("Media (0)"));
    }
}
