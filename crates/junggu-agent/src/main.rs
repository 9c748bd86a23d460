//! # junggu-agent
//!
//! Jung-gu places server binary. Loads settings, builds the place store
//! and Gemini client, and serves the HTTP API until Ctrl-C.

#![deny(unsafe_code)]

mod factory;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use junggu_server::{JungguServer, ServerConfig};
use junggu_settings::JungguSettings;
use tokio::net::TcpListener;

/// Jung-gu recommended places server.
#[derive(Parser, Debug)]
#[command(name = "junggu", about = "Jung-gu recommended places server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file (default `~/.junggu/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log filter when `RUST_LOG` is unset (overrides settings if specified).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Fold CLI overrides into loaded settings.
    fn apply(&self, settings: &mut JungguSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn server_config(settings: &JungguSettings) -> ServerConfig {
    ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        max_sessions: settings.server.max_sessions,
        session_idle_secs: settings.server.session_idle_secs,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(junggu_settings::settings_path);
    let mut loaded = junggu_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut loaded.settings);

    junggu_core::logging::init_subscriber(&loaded.settings.logging.level);
    loaded.log_ignored();
    let settings = loaded.settings;

    settings.validate().context("Invalid settings")?;

    let store = factory::place_store(&settings.places).context("Failed to load places")?;
    let provider = factory::completion_provider(&settings.google)
        .context("Failed to configure completion provider")?;
    let params = factory::generation_params(&settings.google);

    let config = server_config(&settings);
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    let server = Arc::new(JungguServer::new(config, store, provider, params));
    let handle = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                tracing::error!(error = %e, "server exited with error");
            }
        })
    };

    tracing::info!("Jung-gu places server listening on http://{addr}");

    server.shutdown().wait_for_signal().await;
    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
