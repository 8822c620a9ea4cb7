//! Router that only logs.
//!
//! Used on hosts without a supported tunnel stack and when developing
//! against real snapshots without touching the network.

use ifroute_reconcile::Config;
use tracing::info;

use super::Router;
use crate::error::RouterError;

/// Logs every call and succeeds.
#[derive(Debug)]
pub struct FakeRouter {
    iface: String,
}

impl FakeRouter {
    pub fn new(iface: &str) -> Self {
        Self {
            iface: iface.to_string(),
        }
    }
}

impl Router for FakeRouter {
    fn up(&mut self) -> Result<(), RouterError> {
        info!(iface = %self.iface, "[FAKE] up");
        Ok(())
    }

    fn set(&mut self, cfg: Option<&Config>) -> Result<(), RouterError> {
        match cfg {
            Some(cfg) => info!(iface = %self.iface, cfg = %cfg, "[FAKE] set"),
            None => info!(iface = %self.iface, "[FAKE] set shutdown"),
        }
        Ok(())
    }

    fn update_magicsock_port(&mut self, port: u16, network: &str) -> Result<(), RouterError> {
        info!(iface = %self.iface, port, network, "[FAKE] update magicsock port");
        Ok(())
    }

    fn close(&mut self) -> Result<(), RouterError> {
        info!(iface = %self.iface, "[FAKE] close");
        Ok(())
    }
}
