mod app;
mod handler;
mod tui;
mod ui;

use anyhow::{anyhow, Result};
use focusdeck_core::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use tui::{EventHandler, Tui};

/// Log filter override, e.g. `FOCUSDECK_LOG=focusdeck_core=debug`
const LOG_ENV: &str = "FOCUSDECK_LOG";
const DEFAULT_LOG_FILTER: &str = "focusdeck_core=info,focusdeck=info";

#[tokio::main]
async fn main() -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file
    let _log_guard = init_logging()?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default config");
        Config::new()
    });

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(&config, events.sender());
    tracing::info!("focusdeck started");

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("focusdeck stopped");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event).await?;

        app.poll_assistant().await;
        app.clamp_selections();
        app.sync_pomodoro_ticker();
    }
    Ok(())
}

fn init_logging() -> Result<Option<WorkerGuard>> {
    let Some(log_dir) = dirs::data_local_dir().map(|d| d.join("focusdeck")) else {
        return Ok(None);
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "focusdeck.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {}", e))?;

    Ok(Some(guard))
}
