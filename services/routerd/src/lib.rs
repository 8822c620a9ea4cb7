//! Tunnel interface router library.
//!
//! The router daemon owns one tunnel interface and keeps its addresses and
//! routes in line with a desired snapshot.
//!
//! ## Architecture
//!
//! - **Router**: per-platform implementation of up / set / close
//! - **Reconciler** (`ifroute-reconcile`): computes and applies the diff
//! - **Runner**: executes `ifconfig`/`route` on the host, or only logs them
//!
//! ## Modules
//!
//! - `router`: the `Router` trait and its BSD and fake implementations
//! - `runner`: host-backed command runners
//! - `config`: daemon configuration and snapshot loading
//! - `cli`: the `routerd` command line

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod router;
pub mod runner;

// Re-export commonly used types
pub use error::RouterError;
pub use router::{new_router, BsdRouter, FakeRouter, Router, RouterKind};
pub use runner::{DryRunRunner, SystemRunner};
