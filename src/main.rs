mod action;
mod api;
mod app;
mod config;
mod debounce;
mod error;
mod event;
mod fetch;
mod paging;
mod tui;
mod types;
mod ui;

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::api::Congreso;
use crate::app::App;
use crate::config::{Cli, Config};
use crate::event::Event;
use crate::fetch::FetchClient;
use crate::tui::EventHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The terminal is in raw mode while running, so logs go to a file.
    let log_writer = match open_log_file() {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(log_writer),
        )
        .init();

    let config = Config::resolve(&cli)?;
    info!(base_url = %config.api.base_url, page_size = config.search.page_size, "starting");

    let http = FetchClient::new(&config.api.base_url, config.timeout())?;
    let api = Congreso::new(http, config.bill_filter());

    tui::install_panic_hook();

    let result = run(api, &config).await;

    tui::restore()?;

    result
}

fn log_path() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("congreso");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("congreso.log"))
}

fn open_log_file() -> Option<File> {
    File::options()
        .create(true)
        .append(true)
        .open(log_path()?)
        .ok()
}

async fn run(api: Congreso, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(
        api,
        config.search.page_size,
        config.debounce(),
        action_tx.clone(),
    );

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    app.update(Action::Quit);
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
