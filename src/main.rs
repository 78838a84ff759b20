//! courierd - line-oriented command server with per-user mailboxes.

use courierd::config::{self, Config};
use courierd::network::{DatagramBinding, Gateway};
use courierd::state::Hub;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = if explicit_path.is_none() && !Path::new(&config_path).exists() {
        warn!(path = %config_path, "No config file, using built-in defaults");
        Config::default()
    } else {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        storage = %config.storage.root.display(),
        accounts = config.accounts.len(),
        "Starting courierd"
    );

    let hub = Arc::new(Hub::from_config(&config));
    let shutdown = CancellationToken::new();

    // A bind failure is fatal
    let gateway = Gateway::bind(config.listen.address, Arc::clone(&hub), shutdown.clone())
        .await
        .map_err(|e| {
            error!(address = %config.listen.address, error = %e, "Failed to bind listener");
            e
        })?;

    if let Some(udp_address) = config.listen.udp_address {
        let binding =
            DatagramBinding::bind(udp_address, Arc::clone(&hub.validator), shutdown.clone())
                .await
                .map_err(|e| {
                    error!(address = %udp_address, error = %e, "Failed to bind datagram socket");
                    e
                })?;
        tokio::spawn(async move {
            if let Err(e) = binding.run().await {
                error!(error = %e, "Datagram socket stopped");
            }
        });
    }

    // Ctrl-C cancels the root token: the gateway stops accepting and
    // every connection closes.
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                signal_token.cancel();
            }
            Err(e) => error!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });

    gateway.run().await?;

    info!(sessions = hub.directory.len(), "courierd stopped");
    Ok(())
}
