//! Typed construction of the `ifconfig`/`route` invocations.
//!
//! Every command the reconciler or lifecycle code issues is built here, so
//! argument order lives in one place and can be checked without running
//! anything.

use std::fmt;
use std::net::IpAddr;

use ifroute_networking::{Family, Prefix};

/// One external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add an IPv4 alias to the interface.
    AddAlias4 { iface: String, addr: Prefix },

    /// Remove an IPv4 alias from the interface.
    DelAlias4 { iface: String, addr: Prefix },

    /// Add an IPv6 address to the interface.
    AddAddr6 { iface: String, addr: Prefix },

    /// Remove an IPv6 address from the interface.
    DelAddr6 { iface: String, addr: Prefix },

    /// Route `dest` out of the interface owning `gateway`.
    AddRoute { dest: Prefix, gateway: IpAddr },

    /// Remove a route added with `AddRoute`.
    DelRoute { dest: Prefix, gateway: IpAddr },

    /// Mark the interface administratively up.
    LinkUp { iface: String },

    /// Mark the interface administratively down.
    LinkDown { iface: String },
}

impl Command {
    pub fn add_alias4(iface: &str, addr: Prefix) -> Self {
        Command::AddAlias4 {
            iface: iface.to_string(),
            addr,
        }
    }

    pub fn del_alias4(iface: &str, addr: Prefix) -> Self {
        Command::DelAlias4 {
            iface: iface.to_string(),
            addr,
        }
    }

    pub fn add_addr6(iface: &str, addr: Prefix) -> Self {
        Command::AddAddr6 {
            iface: iface.to_string(),
            addr,
        }
    }

    pub fn del_addr6(iface: &str, addr: Prefix) -> Self {
        Command::DelAddr6 {
            iface: iface.to_string(),
            addr,
        }
    }

    pub fn add_route(dest: Prefix, gateway: IpAddr) -> Self {
        Command::AddRoute { dest, gateway }
    }

    pub fn del_route(dest: Prefix, gateway: IpAddr) -> Self {
        Command::DelRoute { dest, gateway }
    }

    pub fn link_up(iface: &str) -> Self {
        Command::LinkUp {
            iface: iface.to_string(),
        }
    }

    pub fn link_down(iface: &str) -> Self {
        Command::LinkDown {
            iface: iface.to_string(),
        }
    }

    /// Render the argument vector. `argv[0]` is the program.
    pub fn argv(&self) -> Vec<String> {
        match self {
            Command::AddAlias4 { iface, addr } => {
                args(&["ifconfig", iface.as_str(), "inet", addr.to_string().as_str(), "alias"])
            }
            Command::DelAlias4 { iface, addr } => {
                args(&["ifconfig", iface.as_str(), "inet", addr.to_string().as_str(), "-alias"])
            }
            Command::AddAddr6 { iface, addr } => {
                args(&["ifconfig", iface.as_str(), "inet6", addr.to_string().as_str()])
            }
            Command::DelAddr6 { iface, addr } => {
                args(&["ifconfig", iface.as_str(), "inet6", addr.to_string().as_str(), "delete"])
            }
            Command::AddRoute { dest, gateway } => route_args("add", dest, gateway),
            Command::DelRoute { dest, gateway } => route_args("delete", dest, gateway),
            Command::LinkUp { iface } => args(&["ifconfig", iface.as_str(), "up"]),
            Command::LinkDown { iface } => args(&["ifconfig", iface.as_str(), "down"]),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// The `route(8)` family flag for a prefix.
fn inet(family: Family) -> &'static str {
    match family {
        Family::V4 => "-inet",
        Family::V6 => "-inet6",
    }
}

fn route_args(verb: &str, dest: &Prefix, gateway: &IpAddr) -> Vec<String> {
    let dest_family = dest.family();
    let dest = dest.to_string();
    let gateway = gateway.to_string();
    args(&[
        "route",
        "-q",
        "-n",
        verb,
        inet(dest_family),
        dest.as_str(),
        "-iface",
        gateway.as_str(),
    ])
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn p(s: &str) -> Prefix {
        s.parse().unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[rstest]
    #[case(Command::add_alias4("tun0", p("100.64.0.1/32")), "ifconfig tun0 inet 100.64.0.1/32 alias")]
    #[case(Command::del_alias4("tun0", p("100.64.0.1/32")), "ifconfig tun0 inet 100.64.0.1/32 -alias")]
    #[case(Command::add_addr6("tun0", p("fd7a::1/48")), "ifconfig tun0 inet6 fd7a::1/48")]
    #[case(Command::del_addr6("tun0", p("fd7a::1/48")), "ifconfig tun0 inet6 fd7a::1/48 delete")]
    #[case(
        Command::add_route(p("10.0.0.0/24"), ip("100.64.0.1")),
        "route -q -n add -inet 10.0.0.0/24 -iface 100.64.0.1"
    )]
    #[case(
        Command::del_route(p("fd00::/64"), ip("fd7a::1")),
        "route -q -n delete -inet6 fd00::/64 -iface fd7a::1"
    )]
    #[case(Command::link_up("tun0"), "ifconfig tun0 up")]
    #[case(Command::link_down("tun0"), "ifconfig tun0 down")]
    fn test_argv(#[case] command: Command, #[case] expected: &str) {
        assert_eq!(command.to_string(), expected);
        assert_eq!(command.argv().join(" "), expected);
    }

    #[test]
    fn test_argv_is_split() {
        let argv = Command::link_up("tun0").argv();
        assert_eq!(argv, vec!["ifconfig", "tun0", "up"]);
    }
}
