//! Platform routers.
//!
//! A router owns one tunnel interface and keeps its addresses and routes in
//! line with the configuration it is handed. Every platform provides the
//! same four operations; the variant is picked once, at construction.
//!
//! - `BsdRouter`: drives `ifconfig(8)`/`route(8)` through a `CommandRunner`
//! - `FakeRouter`: logs calls and changes nothing

mod bsd;
mod fake;

use clap::ValueEnum;
use ifroute_reconcile::{CommandRunner, Config};

use crate::error::RouterError;

pub use bsd::BsdRouter;
pub use fake::FakeRouter;

/// Operations every platform router provides.
///
/// Methods take `&mut self`: a router is driven by a single caller at a
/// time.
pub trait Router {
    /// Bring the interface administratively up.
    fn up(&mut self) -> Result<(), RouterError>;

    /// Converge the interface on `cfg`. `None` means the shutdown snapshot.
    fn set(&mut self, cfg: Option<&Config>) -> Result<(), RouterError>;

    /// Tell the router which port the encapsulating transport listens on.
    fn update_magicsock_port(&mut self, port: u16, network: &str) -> Result<(), RouterError>;

    /// Take the interface down. Never fails.
    fn close(&mut self) -> Result<(), RouterError>;
}

/// Which router implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RouterKind {
    /// BSD `ifconfig`/`route` commands.
    #[default]
    Bsd,

    /// Log only.
    Fake,
}

/// Build the router for `kind` on interface `iface`.
pub fn new_router(
    kind: RouterKind,
    iface: &str,
    runner: Box<dyn CommandRunner>,
) -> Box<dyn Router> {
    match kind {
        RouterKind::Bsd => Box::new(BsdRouter::new(iface, runner)),
        RouterKind::Fake => Box::new(FakeRouter::new(iface)),
    }
}
