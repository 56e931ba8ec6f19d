//! Tech-stats TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use techstats_cache::{CacheStore, FetchCache, HttpSource, LmdbStore, MemoryStore};
use techstats_charts::{DashboardSession, PendingRefresh, SelectionChange};
use techstats_core::Endpoint;
use techstats_tui::config::TuiConfig;
use techstats_tui::error::TuiError;
use techstats_tui::events::TuiEvent;
use techstats_tui::keys::{map_key, map_search_key, Action, InputMode};
use techstats_tui::nav::View;
use techstats_tui::notifications::NotificationLevel;
use techstats_tui::persistence;
use techstats_tui::render::TerminalRenderer;
use techstats_tui::state::App;
use techstats_tui::views::render_view;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    init_logging(&config)?;

    let store = open_store(&config);
    let source = Arc::new(HttpSource::new(config.request_timeout())?);
    let cache = Arc::new(
        FetchCache::new(store, source)
            .with_endpoints(config.endpoints())
            .with_policy(config.cache.policy),
    );
    let session = DashboardSession::new(cache, Arc::new(TerminalRenderer), config.chart_defaults());

    let mut app = App::new(config, session);
    match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => app.restore(state),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable UI state"),
    }
    info!(view = ?app.active_view, range = %app.session.range(), "Starting dashboard");

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);

    spawn_input_reader(event_tx.clone());
    spawn_repo_list(&app, event_tx.clone());
    refresh_views(&mut app, View::all(), &event_tx);

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);
    ticker.tick().await;

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                if handle_event(&mut app, TuiEvent::Tick, &event_tx)? {
                    break;
                }
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event, &event_tx)? {
                    break;
                }
            }
        }
    }

    if let Err(e) = persistence::save(&app.config.persistence_path, &app.persisted_state()) {
        warn!(error = %e, "Failed to save UI state");
    }
    info!("Dashboard closed");

    Ok(())
}

fn init_logging(config: &TuiConfig) -> Result<(), TuiError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

/// The persistent store, or an in-memory one if it cannot be opened.
fn open_store(config: &TuiConfig) -> Arc<dyn CacheStore> {
    match LmdbStore::open(&config.cache.path, config.cache.max_size_mb) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(path = %config.cache.path.display(), error = %e, "Cache store unavailable, caching in memory only");
            Arc::new(MemoryStore::new())
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

fn spawn_repo_list(app: &App, sender: mpsc::Sender<TuiEvent>) {
    let cache = Arc::clone(app.session.cache());
    let range = app.session.range();
    tokio::spawn(async move {
        let payload = cache.fetch_endpoint(Endpoint::RepoList, range).await;
        let _ = sender.send(TuiEvent::RepoList(payload)).await;
    });
}

fn spawn_fetches(app: &App, pending: Vec<PendingRefresh>, sender: &mpsc::Sender<TuiEvent>) {
    for pending in pending {
        let cache = Arc::clone(app.session.cache());
        let sender = sender.clone();
        tokio::spawn(async move {
            let payload = cache.fetch_endpoint(pending.endpoint, pending.range).await;
            let _ = sender.send(TuiEvent::Fetched { pending, payload }).await;
        });
    }
}

fn refresh_views(app: &mut App, views: &[View], sender: &mpsc::Sender<TuiEvent>) {
    let pending = app.begin_refresh(views);
    spawn_fetches(app, pending, sender);
}

fn handle_event(app: &mut App, event: TuiEvent, sender: &mpsc::Sender<TuiEvent>) -> Result<bool, TuiError> {
    match event {
        TuiEvent::Input(key) => {
            if app.input_mode == InputMode::Search {
                if let Some(edit) = map_search_key(key) {
                    app.edit_search(edit);
                }
                return Ok(false);
            }
            if let Some(action) = map_key(key) {
                return Ok(handle_action(app, action, sender));
            }
        }
        TuiEvent::Tick => {
            // Served from cache until the entries expire.
            let view = app.active_view;
            refresh_views(app, &[view], sender);
        }
        TuiEvent::Resize { .. } => {}
        TuiEvent::Fetched { pending, payload } => {
            app.complete_refresh(&pending, payload);
        }
        TuiEvent::RepoList(payload) => {
            let count = app.load_repo_list(&payload);
            info!(repos = count, "Repository list loaded");
            refresh_views(app, &[View::Comparison], sender);
        }
    }
    Ok(false)
}

fn handle_action(app: &mut App, action: Action, sender: &mpsc::Sender<TuiEvent>) -> bool {
    match action {
        Action::Quit => return true,
        Action::NextView => app.switch_view(app.active_view.next()),
        Action::PrevView => app.switch_view(app.active_view.previous()),
        Action::SwitchView(index) => {
            if let Some(view) = View::from_index(index) {
                app.switch_view(view);
            }
        }
        Action::SetRange(range) => {
            if app.set_range(range) {
                app.notify(NotificationLevel::Info, format!("Range: {}", range));
                refresh_views(app, View::all(), sender);
            }
        }
        Action::SetMetric(metric) => {
            app.set_metric(metric);
        }
        Action::LegendLeft => app.move_legend(-1),
        Action::LegendRight => app.move_legend(1),
        Action::ToggleDataset => {
            app.toggle_dataset();
        }
        Action::PickerUp => app.move_picker(-1),
        Action::PickerDown => app.move_picker(1),
        Action::ToggleRepo => match app.active_view {
            View::Comparison => {
                if let Some((change, needs_fetch)) = app.toggle_highlighted_repo() {
                    if change != SelectionChange::Rejected && needs_fetch {
                        refresh_views(app, &[View::Comparison], sender);
                    }
                }
            }
            View::Topics => {
                if app.toggle_highlighted_topic().is_some() {
                    refresh_views(app, &[View::Topics], sender);
                }
            }
            View::Languages | View::Ranked => {}
        },
        Action::RemoveRepo => {
            if app.active_view == View::Comparison {
                if let Some((_, needs_fetch)) = app.remove_selected(app.legend_cursor) {
                    if needs_fetch {
                        refresh_views(app, &[View::Comparison], sender);
                    }
                }
            }
        }
        Action::OpenSearch => {
            if app.active_view == View::Comparison {
                app.open_search();
            }
        }
        Action::ToggleRankedKind => {
            if app.active_view == View::Ranked {
                app.toggle_ranked_kind();
            }
        }
        Action::Refresh => {
            for panel in View::all().iter().map(|v| v.panel()) {
                app.session
                    .cache()
                    .invalidate(&panel.endpoint().cache_key(app.session.range()));
            }
            refresh_views(app, View::all(), sender);
        }
        Action::Cancel => app.notifications.clear(),
    }
    false
}
