use clap::Parser;
use log::info;
use permset::{load_node_config, PermSetHttpServer, PermSetNode, ProvisioningMode};
use std::path::PathBuf;
use std::sync::Arc;

/// Command line options for the permission-set node binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the node configuration file
    #[arg(long, default_value = "config/node_config.json")]
    config: PathBuf,

    /// Override the HTTP bind port (API mode)
    #[arg(long)]
    port: Option<u16>,
}

/// Main entry point for the permission-set node.
///
/// Loads the deployment configuration, builds the node for its provisioning
/// mode, and either serves the HTTP front door (API mode) or parks while the
/// external delivery substrate feeds storage events (event mode).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    permset::logging::init();

    let cli = Cli::parse();
    let mut config = load_node_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.override_port(port);
    }
    info!("Config loaded from {}", cli.config.display());

    let node = Arc::new(PermSetNode::new(config)?);
    info!("Permission-set path prefix: {}", node.path_prefix());

    match node.mode() {
        ProvisioningMode::Api => {
            let bind_address = node.config().bind_address.clone();
            let server = PermSetHttpServer::new(node, &bind_address)?;
            server.run().await?;
        }
        ProvisioningMode::Event => {
            // Storage events arrive through the external delivery substrate,
            // not through anything this process polls. Stay up until asked
            // to stop.
            info!("Event-mode node ready; waiting for shutdown signal");
            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
        }
    }

    Ok(())
}
