//! Address and route reconciliation for tunnel interfaces.
//!
//! This library converges an interface's addresses and routing table onto a
//! desired snapshot by issuing the smallest set of `ifconfig`/`route`
//! commands. Key concepts:
//!
//! - **Desired state** (`Config`): what the interface should look like.
//! - **Applied state** (`AppliedState`): what was last *attempted*, whether
//!   or not every command succeeded.
//! - **Plan**: the ordered commands between the two, computed without
//!   touching the system.
//!
//! # Invariants
//!
//! - Reconciling the same snapshot twice issues no commands the second time
//! - A rejected snapshot leaves the applied state untouched and runs nothing
//! - At most one IPv4 and one IPv6 local address are ever applied
//! - IPv6 local addresses are applied at /48
//!
//! The engine holds no locks. Callers serialize access, typically by owning
//! the state behind `&mut`.

mod command;
mod config;
mod engine;
mod error;
mod runner;
mod state;

pub use command::Command;
pub use config::Config;
pub use engine::{execute, plan, reconcile, run_command, Plan, Step, LOCAL6_PREFIX_LEN};
pub use error::{CommandError, ReconcileError};
pub use runner::{CommandRunner, MockRunner};
pub use state::AppliedState;

/// Re-export the prefix types the public API is written in.
pub use ifroute_networking::{Family, NetworkError, Prefix};
