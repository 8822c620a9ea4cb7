//! Configuration for the router daemon.
//!
//! Settings come from environment variables (overridable on the command
//! line). The desired addresses and routes live in a separate TOML snapshot
//! file:
//!
//! ```toml
//! local_addrs = ["100.64.0.1/32", "fd7a:115c:a1e0::1/128"]
//! routes = ["10.0.0.0/24", "fd00:1::/64"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use ifroute_reconcile::Config as Snapshot;

use crate::logging::LogFormat;
use crate::router::RouterKind;

/// Default interface name.
pub const DEFAULT_INTERFACE: &str = "tun0";

/// Transport network reported with the port notification.
pub const MAGICSOCK_NETWORK: &str = "udp";

/// Router daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tunnel interface to manage.
    pub interface: String,

    /// Router implementation.
    pub router: RouterKind,

    /// Path to the desired snapshot.
    pub snapshot_path: Option<PathBuf>,

    /// Transport port to report after configuring.
    pub magicsock_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            router: RouterKind::default(),
            snapshot_path: None,
            magicsock_port: None,
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let interface = lookup("IFROUTE_INTERFACE").unwrap_or(defaults.interface);

        let router = match lookup("IFROUTE_ROUTER") {
            Some(s) => RouterKind::from_str(&s, true)
                .map_err(|e| anyhow!("invalid IFROUTE_ROUTER: {}", e))?,
            None => defaults.router,
        };

        let snapshot_path = lookup("IFROUTE_SNAPSHOT").map(PathBuf::from);

        let magicsock_port = lookup("IFROUTE_PORT")
            .map(|s| s.parse::<u16>())
            .transpose()
            .context("invalid IFROUTE_PORT")?;

        let log_level = lookup("IFROUTE_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("IFROUTE_LOG_FORMAT") {
            Some(s) => LogFormat::from_str(&s, true)
                .map_err(|e| anyhow!("invalid IFROUTE_LOG_FORMAT: {}", e))?,
            None => defaults.log_format,
        };

        Ok(Self {
            interface,
            router,
            snapshot_path,
            magicsock_port,
            log_level,
            log_format,
        })
    }

    /// Load the desired snapshot, if a path is configured.
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        self.snapshot_path
            .as_deref()
            .map(load_snapshot)
            .transpose()
    }
}

/// Read a snapshot from a TOML file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot from {:?}", path))?;

    toml::from_str(&contents).with_context(|| format!("Failed to parse snapshot from {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.interface, "tun0");
        assert_eq!(config.router, RouterKind::Bsd);
        assert!(config.load_snapshot().unwrap().is_none());
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup(&[
            ("IFROUTE_INTERFACE", "tun3"),
            ("IFROUTE_ROUTER", "fake"),
            ("IFROUTE_SNAPSHOT", "/etc/ifroute/snapshot.toml"),
            ("IFROUTE_PORT", "41641"),
            ("IFROUTE_LOG_LEVEL", "debug"),
            ("IFROUTE_LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.interface, "tun3");
        assert_eq!(config.router, RouterKind::Fake);
        assert_eq!(
            config.snapshot_path.as_deref(),
            Some(Path::new("/etc/ifroute/snapshot.toml"))
        );
        assert_eq!(config.magicsock_port, Some(41641));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup(&[("IFROUTE_ROUTER", "linux")])).is_err());
        assert!(Config::from_lookup(lookup(&[("IFROUTE_PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup(&[("IFROUTE_LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_load_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
local_addrs = ["100.64.0.1/32"]
routes = ["10.0.0.0/24", "fd00:1::/64"]
"#
        )
        .unwrap();

        let config = Config {
            snapshot_path: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let snapshot = config.load_snapshot().unwrap().unwrap();
        assert_eq!(snapshot.local_addrs().len(), 1);
        assert_eq!(snapshot.routes().len(), 2);
    }

    #[test]
    fn test_load_snapshot_rejects_bad_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"local_addrs = ["100.64.0.1"]"#).unwrap();

        let err = load_snapshot(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse snapshot"));
    }

    #[test]
    fn test_load_snapshot_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }
}
