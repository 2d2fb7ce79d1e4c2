//! livescroll-catalog — an infinite-scroll product catalog for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────────┐ PagerSnapshot ┌──────────┐  draw()  ┌──────────┐
//! │ controller.rs │ ────────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio task)  │    (watch)    │ (state)  │          │ (render) │
//! └───────────────┘ ◄──────────── └──────────┘          └──────────┘
//!                     Viewport         ▲
//!                    (scroll.rs)       │ handle_key_event()
//!                                 ┌──────────┐
//!                                 │ input.rs │
//!                                 └──────────┘
//! ```
//!
//! * **`catalog/`** — the `PageFetcher` trait, `Product`, and the HTTP
//!   fetcher.
//! * **`pager`** — the pagination state machine (cursor, gate, sequence).
//! * **`controller`** — runs a pager on a tokio task, driven by scroll
//!   events.
//! * **`scroll`** / **`viewport`** — scroll event wiring and the near-bottom
//!   test.
//! * **`app`** — host state (snapshot, selection, search prompt).
//! * **`ui`** — pure rendering.
//! * **`input`** — maps key events to `App` mutations.
//! * **`config`** — command-line / environment settings and logging.
//! * **`main`** — wires everything together and runs the event loop.

mod app;
mod catalog;
mod config;
mod controller;
mod input;
mod pager;
mod scroll;
mod ui;
mod viewport;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use app::App;
use catalog::{HttpFetcher, ListingMode, PageFetcher};
use config::Cli;
use controller::Controller;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Listing setup
// ---------------------------------------------------------------------------

/// Preload page 1 of `mode` and make a fresh controller for it the active
/// one.  On error the current listing stays in place.
fn open_listing(
    runtime: &Runtime,
    fetcher: &Arc<dyn PageFetcher>,
    cli: &Cli,
    app: &mut App,
    mode: ListingMode,
) -> Result<()> {
    let first = runtime
        .block_on(fetcher.fetch_page(&mode, 1))
        .with_context(|| format!("loading {mode}"))?;
    info!(mode = %mode, count = first.products.len(), "preloaded first page");

    let config = cli.controller_config(&mode);
    let controller = Controller::spawn(
        runtime.handle(),
        Arc::clone(fetcher),
        mode,
        first.products,
        app.scroll.subscribe(),
        config,
    );
    app.attach(controller);
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    config::init_logging(cli.log_file.as_deref())?;

    let runtime = Runtime::new().context("starting async runtime")?;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&cli.api_url, cli.timeout())?);

    // -- first page is loaded before the terminal is taken over, so startup
    //    errors print normally ------------------------------------------------
    let mut app = App::new();
    open_listing(&runtime, &fetcher, &cli, &mut app, cli.initial_mode())?;

    install_panic_hook();
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Pull the newest controller snapshot / handle a queued search.
    //   2. Render, then publish the scroll position if it moved.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        app.sync();

        if let Some(query) = app.take_search_request() {
            let mode = ListingMode::search(&query).unwrap_or(ListingMode::All);
            app.status = format!("Loading {mode}…");
            guard.terminal.draw(|f| ui::draw(&mut app, f))?;
            if let Err(e) = open_listing(&runtime, &fetcher, &cli, &mut app, mode) {
                warn!("search failed: {e:#}");
                app.status = format!("Error: {e:#}");
            }
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;
        app.publish_scroll();

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Stop the controller while the runtime is still around.
    if let Some(controller) = app.detach() {
        runtime.block_on(controller.shutdown());
    }
    info!(subscribers = app.scroll.subscriber_count(), "controller stopped");
    Ok(())
}
