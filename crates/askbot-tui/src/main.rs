use std::sync::Arc;

use anyhow::Result;
use askbot_core::{Config, HttpResponder};
use clap::Parser;
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod panel;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "askbot")]
#[command(about = "Terminal chat widget backed by a remote /ask endpoint")]
struct Cli {
    /// Base URL of the chat backend; requests go to <ENDPOINT>/ask
    #[arg(long, env = "ASKBOT_ENDPOINT")]
    endpoint: Option<String>,

    /// Remember the endpoint in the config file
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&Config::config_dir()?)?;

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "could not read config, using defaults");
            Config::default()
        }
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if cli.save {
        config.save()?;
    }

    let responder = Arc::new(HttpResponder::new(&config.endpoint));
    let mut app = App::new(responder, config.endpoint.clone());
    info!(endpoint = %config.endpoint, "askbot loaded");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }

    info!("askbot exiting");
    Ok(())
}
