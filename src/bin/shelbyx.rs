// Native binary for shelbyx - Terminal UI mode

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use shelbyx::{
    app::{App, InputMode},
    catalog::ViewCategory,
    client::{HttpShelbyClient, MediaFetcher, ShelbyApi},
    config::{load, Config},
    effects::EffectRunner,
    modal::ModalInput,
    router,
    source_poll::{refresh_channel, run_poller},
    types::AppEvent,
    ui,
    upload::{ExpirationPreset, WalletSession},
};

/// The TUI owns stdout, so logs go to a file.
fn init_file_logging(cfg: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_file)
        .with_context(|| format!("Failed to open log file {}", cfg.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_file_logging(&cfg)?;
    cfg.log_summary();

    let client = Arc::new(HttpShelbyClient::new(
        cfg.api_url.clone(),
        cfg.api_key.clone(),
        cfg.request_timeout_ms,
    ));
    let api: Arc<dyn ShelbyApi> = client.clone();
    let fetcher: Arc<dyn MediaFetcher> = client;

    // app + channels
    let (tx, rx) = unbounded_channel::<AppEvent>();
    let (refresh, refresh_rx) = refresh_channel();

    // No wallet adapter in the terminal: browsing only until one is attached.
    let mut app = App::new(&cfg, WalletSession::disconnected());

    // Apply deep link route from CLI args (if provided)
    // Example: ./shelbyx shelbyx://v1/blob/photos/cat.png
    if let Some(raw) = cfg.initial_route.as_deref() {
        match router::parse(raw) {
            Some(route) => {
                app.apply_route(&route);
                log::info!("Applied deep link route from CLI: {raw}");
            }
            None => log::warn!("Ignoring unknown route {raw:?}"),
        }
    }

    // source task
    let poll_api = api.clone();
    let account = cfg.account.clone();
    let interval = cfg.poll_interval();
    let poll_tx = tx.clone();
    let source_task: JoinHandle<Result<()>> = tokio::spawn(async move {
        run_poller(poll_api, account, interval, poll_tx, refresh_rx).await
    });

    let mut runner = EffectRunner::new(api, fetcher, tx, refresh);

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // main loop
    let result = run_loop(&mut app, &mut runner, &mut terminal, rx).await;

    // cleanup
    source_task.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn run_loop(
    app: &mut App,
    runner: &mut EffectRunner,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        // input or source events
        if event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(app, k);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }
        runner.run(app);

        if last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, k: KeyEvent) {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (k.code, k.modifiers) {
        app.on_event(AppEvent::Quit);
        return;
    }

    match app.input_mode() {
        InputMode::AddPath | InputMode::CustomDate => {
            match k.code {
                KeyCode::Char(c) => app.input_char(c),
                KeyCode::Backspace => app.input_backspace(),
                KeyCode::Enter => app.input_commit(),
                KeyCode::Esc => app.input_cancel(),
                _ => {}
            }
            return;
        }
        InputMode::Upload => {
            handle_upload_key(app, k);
            return;
        }
        InputMode::Normal => {}
    }

    if app.modal().is_open() {
        handle_modal_key(app, k);
        return;
    }

    match k.code {
        KeyCode::Char('q') => app.on_event(AppEvent::Quit),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_category(),
        KeyCode::Char('1') => app.switch_category(ViewCategory::Media),
        KeyCode::Char('2') => app.switch_category(ViewCategory::Documents),
        KeyCode::Up | KeyCode::Char('k') => app.up(),
        KeyCode::Down | KeyCode::Char('j') => app.down(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => app.next_page(),
        KeyCode::Home => app.home(),
        KeyCode::End => app.end(),
        KeyCode::Enter | KeyCode::Char(' ') => app.open_selected(),
        KeyCode::Char('u') => app.open_upload(),
        KeyCode::Char('r') => {
            app.request_refresh();
            app.show_toast("Refreshing...");
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut App, k: KeyEvent) {
    match k.code {
        KeyCode::Esc => {
            app.modal_input(ModalInput::Escape);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.modal_input(ModalInput::ArrowLeft);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.modal_input(ModalInput::ArrowRight);
        }
        KeyCode::Char('o') | KeyCode::Char('d') => app.modal_open_external(),
        KeyCode::Char('y') | KeyCode::Char('c') => app.modal_copy_url(),
        KeyCode::Char('x') | KeyCode::Delete => app.modal_delete(),
        KeyCode::Char('q') => app.close_modal(),
        _ => {}
    }
}

fn handle_upload_key(app: &mut App, k: KeyEvent) {
    match k.code {
        KeyCode::Esc => app.close_upload(),
        KeyCode::Char('a') => app.start_add_path(),
        KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
            app.remove_upload_file(app.upload_cursor())
        }
        KeyCode::Up => app.upload_cursor_up(),
        KeyCode::Down => app.upload_cursor_down(),
        KeyCode::Left => app.cycle_preset(false),
        KeyCode::Right => app.cycle_preset(true),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            app.select_preset(ExpirationPreset::ALL[idx]);
        }
        KeyCode::Char('c') => app.start_custom_date(),
        KeyCode::Enter => app.submit_upload(),
        _ => {}
    }
}
