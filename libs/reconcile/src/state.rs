//! What the reconciler last tried to install.

use std::collections::BTreeSet;

use ifroute_networking::Prefix;

/// Addresses and routes from the most recent reconciliation.
///
/// This records intent, not kernel state: a reconciliation whose commands
/// failed still replaces every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedState {
    /// IPv4 interface address.
    pub local4: Option<Prefix>,

    /// IPv6 interface address, always at the on-link length.
    pub local6: Option<Prefix>,

    /// Routed destinations.
    pub routes: BTreeSet<Prefix>,
}

impl AppliedState {
    /// Returns true if nothing has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.local4.is_none() && self.local6.is_none() && self.routes.is_empty()
    }
}
