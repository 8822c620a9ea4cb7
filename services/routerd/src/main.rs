//! routerd
//!
//! Keeps a tunnel interface's addresses and routing table in line with a
//! snapshot file, issuing only the `ifconfig`/`route` commands needed to get
//! from what was applied last to what is desired.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ifroute_routerd::cli::Cli;
use ifroute_routerd::{config, logging};

/// Daemon version (semver).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::from(1);
        }
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = logging::init(&config.log_level, config.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    info!(
        version = VERSION,
        iface = %config.interface,
        router = ?config.router,
        "routerd starting"
    );

    match cli.run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "routerd failed");
            // Log the error chain
            for cause in e.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            ExitCode::from(1)
        }
    }
}
