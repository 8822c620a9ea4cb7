//! Command-line interface.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ifroute_reconcile::{plan, AppliedState, CommandRunner, Config as Snapshot, Step};
use tracing::{info, warn};

use crate::config::{Config, MAGICSOCK_NETWORK};
use crate::router::{new_router, Router, RouterKind};
use crate::runner::{DryRunRunner, SystemRunner};

/// routerd - keep a tunnel interface's addresses and routes in line with a
/// snapshot.
#[derive(Debug, Parser)]
#[command(name = "routerd", version, about)]
pub struct Cli {
    /// Interface to manage (overrides IFROUTE_INTERFACE).
    #[arg(long, global = true)]
    pub interface: Option<String>,

    /// Snapshot file (overrides IFROUTE_SNAPSHOT).
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Router implementation (overrides IFROUTE_ROUTER).
    #[arg(long, global = true, value_enum)]
    pub router: Option<RouterKind>,

    /// Log commands instead of running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the commands a first reconciliation would run.
    Plan,

    /// Bring the interface up and apply the snapshot once.
    Apply,

    /// Apply the snapshot, then wait for Ctrl-C and take the interface down.
    Run,

    /// Take the interface down.
    Down,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot_path = Some(snapshot.clone());
        }
        if let Some(router) = self.router {
            config.router = router;
        }
    }

    /// Run the selected command.
    pub async fn run(&self, config: &Config) -> Result<()> {
        match self.command {
            Commands::Plan => {
                let snapshot = require_snapshot(config)?;
                print_plan(&mut std::io::stdout().lock(), &config.interface, &snapshot)
            }
            Commands::Apply => {
                let snapshot = require_snapshot(config)?;
                let mut router = self.build_router(config);
                router.up().context("failed to bring interface up")?;
                router
                    .set(Some(&snapshot))
                    .context("failed to apply snapshot")?;
                notify_port(router.as_mut(), config);
                Ok(())
            }
            Commands::Run => {
                let snapshot = require_snapshot(config)?;
                let mut router = self.build_router(config);
                router.up().context("failed to bring interface up")?;
                if let Err(e) = router.set(Some(&snapshot)) {
                    // Partially applied is still applied; keep running.
                    warn!(error = %e, reason = e.reason_code(), "snapshot applied with errors");
                }
                notify_port(router.as_mut(), config);

                info!(iface = %config.interface, "running, press Ctrl-C to stop");
                tokio::signal::ctrl_c()
                    .await
                    .context("failed to listen for shutdown signal")?;
                info!("Received shutdown signal");

                router.close()?;
                Ok(())
            }
            Commands::Down => {
                let mut router = self.build_router(config);
                router.close()?;
                Ok(())
            }
        }
    }

    fn build_router(&self, config: &Config) -> Box<dyn Router> {
        let runner: Box<dyn CommandRunner> = if self.dry_run {
            Box::new(DryRunRunner)
        } else {
            Box::new(SystemRunner)
        };

        info!(
            iface = %config.interface,
            router = ?config.router,
            dry_run = self.dry_run,
            "creating router"
        );
        new_router(config.router, &config.interface, runner)
    }
}

fn require_snapshot(config: &Config) -> Result<Snapshot> {
    config
        .load_snapshot()?
        .context("no snapshot configured (use --snapshot or IFROUTE_SNAPSHOT)")
}

fn notify_port(router: &mut dyn Router, config: &Config) {
    let Some(port) = config.magicsock_port else {
        return;
    };
    if let Err(e) = router.update_magicsock_port(port, MAGICSOCK_NETWORK) {
        warn!(port, error = %e, "failed to report magicsock port");
    }
}

/// Write the commands a reconciliation from an empty state would issue.
pub fn print_plan<W: Write>(out: &mut W, iface: &str, snapshot: &Snapshot) -> Result<()> {
    let plan = plan(iface, &AppliedState::default(), Some(snapshot))?;

    for step in &plan.steps {
        match step {
            Step::Run(command) => writeln!(out, "{}", command)?,
            Step::Unroutable { route } => {
                writeln!(out, "# skipped {}: no local {} address", route, route.family())?
            }
        }
    }

    Ok(())
}
