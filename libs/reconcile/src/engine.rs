//! Address and route reconciliation.
//!
//! `plan` turns the applied state and a desired snapshot into an ordered
//! list of steps plus the state to record afterwards. `execute` runs those
//! steps through a `CommandRunner`. `reconcile` does both.
//!
//! # Ordering
//!
//! 1. IPv4 address: old alias and host route out, new alias and host route in
//! 2. IPv6 address: old out, new in (no route, the /48 is on-link)
//! 3. Routes no longer wanted are deleted, then new routes are added
//!
//! Every step runs even if an earlier one failed. The first failure is
//! returned and the new state is recorded regardless.

use std::collections::BTreeSet;
use std::net::IpAddr;

use ifroute_networking::{Family, Prefix};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::Config;
use crate::error::{CommandError, ReconcileError};
use crate::runner::CommandRunner;
use crate::state::AppliedState;

/// Prefix length IPv6 local addresses are installed at.
///
/// The interface treats a /48 as directly on-link, which saves a separate
/// route for the local IPv6 prefix.
pub const LOCAL6_PREFIX_LEN: u8 = 48;

/// One unit of work in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run a command.
    Run(Command),

    /// A route with no local address of its family to leave through.
    Unroutable { route: Prefix },
}

/// Steps to run and the state to record once they have been attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
    pub next: AppliedState,
}

impl Plan {
    /// A plan that does nothing and keeps `current`.
    pub fn unchanged(current: &AppliedState) -> Self {
        Self {
            steps: Vec::new(),
            next: current.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The commands this plan will run, in order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.steps.iter().filter_map(|step| match step {
            Step::Run(command) => Some(command),
            Step::Unroutable { .. } => None,
        })
    }
}

/// Compute the steps that move `iface` from `current` to `desired`.
///
/// `None` means the shutdown snapshot. A snapshot without local addresses
/// leaves everything as it is, routes included.
pub fn plan(
    iface: &str,
    current: &AppliedState,
    desired: Option<&Config>,
) -> Result<Plan, ReconcileError> {
    let shutdown = Config::shutdown();
    let desired = desired.unwrap_or(&shutdown);

    info!(iface, cfg = %desired, "reconciling interface");
    if desired.local_addrs().is_empty() {
        debug!(iface, "no local addresses, nothing to do");
        return Ok(Plan::unchanged(current));
    }

    let (local4, local6) = single_local_addrs(desired)?;
    let local6 = local6
        .map(|addr| addr.with_prefix_len(LOCAL6_PREFIX_LEN))
        .transpose()?;

    let mut steps = Vec::new();

    debug!(iface, local4 = ?local4, applied = ?current.local4, "ipv4 local address");
    if local4 != current.local4 {
        if let Some(old) = current.local4 {
            steps.push(Step::Run(Command::del_alias4(iface, old)));
            steps.push(Step::Run(Command::del_route(old, old.addr())));
        }
        if let Some(new) = local4 {
            steps.push(Step::Run(Command::add_alias4(iface, new)));
            steps.push(Step::Run(Command::add_route(new, new.addr())));
        }
    }

    debug!(iface, local6 = ?local6, applied = ?current.local6, "ipv6 local address");
    if local6 != current.local6 {
        if let Some(old) = current.local6 {
            steps.push(Step::Run(Command::del_addr6(iface, old)));
        }
        if let Some(new) = local6 {
            steps.push(Step::Run(Command::add_addr6(iface, new)));
        }
    }

    // Route commands go out through the new local addresses, even for
    // routes that belonged to the old ones.
    let routes: BTreeSet<Prefix> = desired.routes().iter().copied().collect();
    for route in current.routes.difference(&routes) {
        steps.push(route_step(*route, local4, local6, Command::del_route));
    }
    for route in routes.difference(&current.routes) {
        steps.push(route_step(*route, local4, local6, Command::add_route));
    }

    Ok(Plan {
        steps,
        next: AppliedState {
            local4,
            local6,
            routes,
        },
    })
}

/// Run every step of `plan`, continuing past failures.
///
/// Returns the plan's target state and the first failure, if any.
pub fn execute<R: CommandRunner + ?Sized>(
    runner: &R,
    plan: Plan,
) -> (AppliedState, Result<(), ReconcileError>) {
    let mut first_err: Option<ReconcileError> = None;

    for step in &plan.steps {
        let result = match step {
            Step::Run(command) => run_command(runner, command)
                .map(|_| ())
                .map_err(ReconcileError::from),
            Step::Unroutable { route } => {
                warn!(route = %route, "no local address for route family, skipping");
                Err(ReconcileError::NoLocalAddress { route: *route })
            }
        };

        if let Err(e) = result {
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
    }

    let result = match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    };
    (plan.next, result)
}

/// Plan and execute in one go.
///
/// A rejected snapshot returns `current` untouched without running anything.
pub fn reconcile<R: CommandRunner + ?Sized>(
    runner: &R,
    iface: &str,
    current: &AppliedState,
    desired: Option<&Config>,
) -> (AppliedState, Result<(), ReconcileError>) {
    match plan(iface, current, desired) {
        Ok(plan) => execute(runner, plan),
        Err(e) => {
            warn!(iface, error = %e, "rejecting configuration");
            (current.clone(), Err(e))
        }
    }
}

/// Run a single command, logging its argv and output on failure.
pub fn run_command<R: CommandRunner + ?Sized>(
    runner: &R,
    command: &Command,
) -> Result<Vec<u8>, CommandError> {
    debug!(command = %command, "running command");
    match runner.run(&command.argv()) {
        Ok(output) => Ok(output),
        Err(e) => {
            warn!(
                command = %command,
                error = %e,
                output = %String::from_utf8_lossy(e.output()).trim_end(),
                "command failed"
            );
            Err(e)
        }
    }
}

/// Pick the single IPv4 and IPv6 address out of a snapshot.
fn single_local_addrs(
    desired: &Config,
) -> Result<(Option<Prefix>, Option<Prefix>), ReconcileError> {
    let v4: Vec<Prefix> = desired.local_addrs_of(Family::V4).copied().collect();
    let v6: Vec<Prefix> = desired.local_addrs_of(Family::V6).copied().collect();

    if v4.len() > 1 || v6.len() > 1 {
        return Err(ReconcileError::MultipleLocalAddrs {
            v4: v4.len(),
            v6: v6.len(),
        });
    }

    Ok((v4.first().copied(), v6.first().copied()))
}

fn route_step(
    route: Prefix,
    local4: Option<Prefix>,
    local6: Option<Prefix>,
    build: fn(Prefix, IpAddr) -> Command,
) -> Step {
    let local = match route.family() {
        Family::V4 => local4,
        Family::V6 => local6,
    };
    match local {
        Some(local) => Step::Run(build(route.masked(), local.addr())),
        None => Step::Unroutable { route },
    }
}
