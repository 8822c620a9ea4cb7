//! Desired interface configuration.

use std::fmt;

use ifroute_networking::{Family, Prefix};
use serde::{Deserialize, Serialize};

/// An immutable snapshot of the desired local addresses and routes.
///
/// Nothing here stops a snapshot from carrying several addresses of one
/// family; the reconciler rejects those.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    local_addrs: Vec<Prefix>,

    #[serde(default)]
    routes: Vec<Prefix>,
}

impl Config {
    /// Create a new snapshot.
    pub fn new(local_addrs: Vec<Prefix>, routes: Vec<Prefix>) -> Self {
        Self {
            local_addrs,
            routes,
        }
    }

    /// The snapshot used when no configuration is supplied.
    pub fn shutdown() -> Self {
        Self::default()
    }

    /// Addresses to assign to the interface.
    pub fn local_addrs(&self) -> &[Prefix] {
        &self.local_addrs
    }

    /// Destinations to route through the interface.
    pub fn routes(&self) -> &[Prefix] {
        &self.routes
    }

    /// Local addresses of one family, in snapshot order.
    pub fn local_addrs_of(&self, family: Family) -> impl Iterator<Item = &Prefix> {
        self.local_addrs.iter().filter(move |p| p.family() == family)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{local_addrs=[{}] routes=[{}]}}",
            join(&self.local_addrs),
            join(&self.routes)
        )
    }
}

fn join(prefixes: &[Prefix]) -> String {
    prefixes
        .iter()
        .map(Prefix::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_is_empty() {
        let cfg = Config::shutdown();
        assert!(cfg.local_addrs().is_empty());
        assert!(cfg.routes().is_empty());
    }

    #[test]
    fn test_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
            local_addrs = ["100.64.0.1/32", "fd7a:115c:a1e0::1/128"]
            routes = ["10.0.0.0/24"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.local_addrs().len(), 2);
        assert_eq!(cfg.local_addrs_of(Family::V4).count(), 1);
        assert_eq!(cfg.routes(), &["10.0.0.0/24".parse::<Prefix>().unwrap()]);
    }

    #[test]
    fn test_missing_fields_default() {
        let cfg: Config = toml::from_str(r#"routes = ["10.0.0.0/8"]"#).unwrap();
        assert!(cfg.local_addrs().is_empty());
        assert_eq!(cfg.routes().len(), 1);
    }

    #[test]
    fn test_display() {
        let cfg = Config::new(
            vec!["100.64.0.1/32".parse().unwrap()],
            vec!["10.0.0.0/24".parse().unwrap(), "fd00::/64".parse().unwrap()],
        );
        assert_eq!(
            cfg.to_string(),
            "{local_addrs=[100.64.0.1/32] routes=[10.0.0.0/24 fd00::/64]}"
        );
    }
}
