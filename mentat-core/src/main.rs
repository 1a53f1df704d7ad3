//! src/main.rs
//! Mentat: terminal browser for a directory of markdown notes

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use mentat_core::{
    Logger,
    app::{App, CrosstermEvents, ExitReason, ShutdownSignal, spawn_signal_listener},
    config::Config,
    terminal::{AppTerminal, cleanup_terminal, setup_panic_handler, setup_terminal},
};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    let config: Arc<Config> = Arc::new(
        Config::load()
            .await
            .context("Failed to load configuration")?,
    );

    let _log_guard = Logger::init_tracing(&config).context("Failed to initialize logging")?;
    setup_panic_handler();
    info!("Starting Mentat in {}", config.notes_dir.display());

    let shutdown = ShutdownSignal::default();
    spawn_signal_listener(shutdown.clone());

    let terminal: AppTerminal = setup_terminal().context("Failed to initialize terminal")?;
    let mut app = App::new(config, terminal, CrosstermEvents::new(), shutdown);
    info!("Application initialized successfully");

    let outcome = app.run().await;
    app.log_final_metrics();

    let mut terminal: AppTerminal = app.into_terminal();
    if let Err(e) = cleanup_terminal(&mut terminal) {
        warn!("Failed to cleanup terminal: {}", e);
    }

    let reason: ExitReason = outcome.context("Application runtime error")?;
    info!("Application exited cleanly ({:?})", reason);
    Ok(())
}
