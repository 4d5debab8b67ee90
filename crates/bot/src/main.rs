mod console;
mod engine;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundboard_core::{
    load_config, sync_catalog, validate_config, GuildQueues, PlaybackDispatcher, SearchEngine,
    SoundCatalog, SoundCommands, SqliteSoundCatalog,
};

use console::{ConsoleSession, ConsoleVoice};
use engine::ConsoleEngine;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine config path
    let config_path = std::env::var("SOUNDBOARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Sound directory: {:?}", config.sounds.directory);

    let catalog: Arc<dyn SoundCatalog> = Arc::new(
        SqliteSoundCatalog::new(&config.database.path)
            .context("Failed to open sound catalog")?,
    );
    info!("Sound catalog initialized");

    // The console guild always gets a queue, even if the host list omits it.
    let mut guilds = config.host.guilds.clone();
    if !guilds.contains(&config.console.guild_id) {
        guilds.push(config.console.guild_id.clone());
    }

    let queues = GuildQueues::new();
    let report = sync_catalog(catalog.as_ref(), &config.sounds, &guilds, &queues)
        .context("Catalog sync failed")?;
    info!(
        "Sync: {} clip(s) added, {} alias(es) added, {} alias conflict(s)",
        report.clips_added, report.aliases_added, report.alias_conflicts
    );
    if let Some(import) = &report.import {
        info!(
            "Description import: {} updated, {} unmatched, {} skipped",
            import.updated, import.unmatched, import.skipped
        );
    }
    info!("{} clip(s) in catalog", catalog.count_clips()?);

    let engine_handle = tokio::spawn(ConsoleEngine::new(queues.clone()).run());

    let dispatcher = PlaybackDispatcher::new(
        Arc::clone(&catalog),
        Arc::new(queues.clone()),
        config.sounds.directory.clone(),
    );
    let search = SearchEngine::new(Arc::clone(&catalog), config.search.clone());
    let commands = SoundCommands::new(
        Arc::clone(&catalog),
        search,
        dispatcher,
        Arc::new(ConsoleVoice::new(&config.console)),
        config.commands.prefix.clone(),
    );

    let session = ConsoleSession::new(commands, &config.console);
    info!(
        "Listening on stdin as user {} in channel {} (prefix {:?})",
        config.console.user_id, config.console.channel_id, config.commands.prefix
    );

    tokio::select! {
        result = session.run(tokio::io::stdin(), tokio::io::stdout()) => {
            result.context("Console session failed")?;
            info!("Input closed");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    engine_handle.abort();
    info!("Soundboard stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
