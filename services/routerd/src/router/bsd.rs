//! Router for BSD hosts using the userspace tunnel device.
//!
//! Addresses are managed as `ifconfig` aliases and routes are bound to the
//! interface with `route -iface`. Only one IPv4 and one IPv6 local address
//! are supported.

use ifroute_reconcile::{reconcile, run_command, AppliedState, Command, CommandRunner, Config};
use tracing::{info, warn};

use super::Router;
use crate::error::RouterError;

/// Command-driven router for one interface.
#[derive(Debug)]
pub struct BsdRouter<R> {
    /// Interface name (e.g., "tun0").
    iface: String,

    runner: R,

    /// What the last `set` tried to install.
    state: AppliedState,
}

impl<R: CommandRunner> BsdRouter<R> {
    /// Create a router for `iface`. Nothing is applied until `set`.
    pub fn new(iface: &str, runner: R) -> Self {
        Self {
            iface: iface.to_string(),
            runner,
            state: AppliedState::default(),
        }
    }

    /// Get the interface name.
    pub fn iface(&self) -> &str {
        &self.iface
    }

    /// Get the applied state.
    pub fn state(&self) -> &AppliedState {
        &self.state
    }

    /// Get the command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> Router for BsdRouter<R> {
    fn up(&mut self) -> Result<(), RouterError> {
        info!(iface = %self.iface, "bringing interface up");
        run_command(&self.runner, &Command::link_up(&self.iface)).map_err(RouterError::Up)?;
        Ok(())
    }

    fn set(&mut self, cfg: Option<&Config>) -> Result<(), RouterError> {
        let (next, result) = reconcile(&self.runner, &self.iface, &self.state, cfg);
        self.state = next;
        result.map_err(RouterError::from)
    }

    fn update_magicsock_port(&mut self, _port: u16, _network: &str) -> Result<(), RouterError> {
        // The interface does not care which port the transport uses.
        Ok(())
    }

    fn close(&mut self) -> Result<(), RouterError> {
        info!(iface = %self.iface, "taking interface down");
        if let Err(e) = run_command(&self.runner, &Command::link_down(&self.iface)) {
            warn!(iface = %self.iface, error = %e, "failed to take interface down");
        }
        Ok(())
    }
}
