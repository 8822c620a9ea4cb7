//! Error types for router operations.

use ifroute_reconcile::{CommandError, ReconcileError};
use thiserror::Error;

/// Errors returned by a `Router`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The interface could not be brought up.
    #[error("bring-up failed: {0}")]
    Up(#[source] CommandError),

    /// Applying a configuration failed, fully or in part.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl RouterError {
    /// Get the standardized reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            RouterError::Up(_) => "up_failed",
            RouterError::Reconcile(e) if e.is_configuration() => "config_rejected",
            RouterError::Reconcile(ReconcileError::NoLocalAddress { .. }) => "route_unroutable",
            RouterError::Reconcile(_) => "command_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let up = RouterError::Up(CommandError::Failed {
            argv: vec!["ifconfig".into(), "tun0".into(), "up".into()],
            code: Some(1),
            output: Vec::new(),
        });
        assert_eq!(up.reason_code(), "up_failed");
        assert!(up.to_string().starts_with("bring-up failed"));

        let rejected = RouterError::from(ReconcileError::MultipleLocalAddrs { v4: 2, v6: 0 });
        assert_eq!(rejected.reason_code(), "config_rejected");

        let unroutable = RouterError::from(ReconcileError::NoLocalAddress {
            route: "10.0.0.0/8".parse().unwrap(),
        });
        assert_eq!(unroutable.reason_code(), "route_unroutable");
    }
}
