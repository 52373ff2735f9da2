//! # PADDOCK Server
//!
//! ## Usage
//!
//! ```bash
//! paddock --config paddock.toml [--debug] [--ticks N]
//! ```

use anyhow::Result;
use clap::Parser;
use paddock::{load_config, logging, Args, ConfigOrigin, PaddockServer};
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, origin) = load_config(&args.config)?;
    logging::setup_logging(&args, config.log_json)?;

    info!("Starting PADDOCK server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    match origin {
        ConfigOrigin::File => info!("Configuration loaded from: {}", args.config.display()),
        ConfigOrigin::CreatedDefault => warn!(
            "Configuration file not found, created defaults at: {}",
            args.config.display()
        ),
    }

    let mut server = PaddockServer::new(&config)?;
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    let stats = server.run(args.ticks, shutdown).await?;
    info!(flushed = stats.flushed, "server stopped");
    Ok(())
}
