//! Error types for reconciliation.

use ifroute_networking::{NetworkError, Prefix};
use thiserror::Error;

/// An external command that could not be started or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started.
    #[error("failed to execute `{}`: {source}", argv.join(" "))]
    Spawn {
        argv: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero (or was killed).
    #[error("`{}` failed: {}", argv.join(" "), describe_exit(*code))]
    Failed {
        argv: Vec<String>,
        code: Option<i32>,
        output: Vec<u8>,
    },
}

impl CommandError {
    /// The argument vector of the failed command.
    pub fn argv(&self) -> &[String] {
        match self {
            CommandError::Spawn { argv, .. } | CommandError::Failed { argv, .. } => argv,
        }
    }

    /// Combined stdout and stderr, empty if the program never ran.
    pub fn output(&self) -> &[u8] {
        match self {
            CommandError::Spawn { .. } => &[],
            CommandError::Failed { output, .. } => output,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The desired snapshot carries more than one address of a family.
    #[error("multiple local addresses unsupported ({v4} ipv4, {v6} ipv6)")]
    MultipleLocalAddrs { v4: usize, v6: usize },

    /// The desired snapshot carries an unusable prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(#[from] NetworkError),

    /// A route has no local address of its family to go out through.
    #[error("no local {} address to route {route} through", route.family())]
    NoLocalAddress { route: Prefix },

    /// An external command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ReconcileError {
    /// Returns true for errors caused by an invalid desired snapshot.
    ///
    /// These are reported before any command runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReconcileError::MultipleLocalAddrs { .. } | ReconcileError::InvalidPrefix(_)
        )
    }

    /// The failed command, if this error came from one.
    pub fn command(&self) -> Option<&CommandError> {
        match self {
            ReconcileError::Command(e) => Some(e),
            _ => None,
        }
    }
}
