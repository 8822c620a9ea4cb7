//! Networking value types for interface configuration.
//!
//! This library provides:
//! - `Prefix`: an IP address plus mask length (CIDR), either family
//! - `Family`: the address family a prefix belongs to
//! - Masking helpers for turning an interface address into its network
//!
//! A `Prefix` keeps the host bits it was built with. `100.64.0.1/32` and
//! `2001:db8:1::5/64` are interface addresses, not networks, so masking is
//! an explicit step (`Prefix::masked`).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Networking errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Invalid IP address.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Invalid CIDR prefix.
    #[error("invalid CIDR prefix: {0}")]
    InvalidPrefix(String),
}

/// Address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// The family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Longest valid prefix length for this family.
    pub fn max_prefix_len(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Family::V4 => "ipv4",
            Family::V6 => "ipv6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An IP address together with a mask length.
///
/// Equality, hashing and ordering are structural over `(address, prefix_len)`,
/// so `10.0.0.1/24` and `10.0.0.0/24` are different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix {
    address: IpAddr,
    prefix_len: u8,
}

impl Prefix {
    /// Create a new prefix without touching the host bits.
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, NetworkError> {
        let max = Family::of(&address).max_prefix_len();
        if prefix_len > max {
            return Err(NetworkError::InvalidPrefix(format!(
                "prefix length {} exceeds {}",
                prefix_len, max
            )));
        }

        Ok(Self {
            address,
            prefix_len,
        })
    }

    /// Parse from CIDR notation (e.g., "10.0.0.0/24", "2001:db8::/32").
    pub fn from_cidr(s: &str) -> Result<Self, NetworkError> {
        let Some((addr_str, prefix_str)) = s.split_once('/') else {
            return Err(NetworkError::InvalidPrefix(format!(
                "missing '/' in CIDR: {}",
                s
            )));
        };

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidAddress(addr_str.to_string()))?;

        let prefix_len = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidPrefix(prefix_str.to_string()))?;

        Self::new(address, prefix_len)
    }

    /// The address part, host bits included.
    pub fn addr(&self) -> IpAddr {
        self.address
    }

    /// Prefix length (e.g., 24 for /24).
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn family(&self) -> Family {
        Family::of(&self.address)
    }

    pub fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }

    /// Same address with a different prefix length.
    pub fn with_prefix_len(&self, prefix_len: u8) -> Result<Self, NetworkError> {
        Self::new(self.address, prefix_len)
    }

    /// The network this prefix belongs to, host bits cleared.
    pub fn masked(&self) -> Self {
        let address = match self.address {
            IpAddr::V4(v4) => IpAddr::V4(mask_ipv4(v4, self.prefix_len)),
            IpAddr::V6(v6) => IpAddr::V6(mask_ipv6(v6, self.prefix_len)),
        };
        Self {
            address,
            prefix_len: self.prefix_len,
        }
    }

    /// Check if an address is within this prefix.
    pub fn contains(&self, addr: IpAddr) -> bool {
        if Family::of(&addr) != self.family() {
            return false;
        }
        match Self::new(addr, self.prefix_len) {
            Ok(other) => other.masked().address == self.masked().address,
            Err(_) => false,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Prefix {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cidr(s)
    }
}

impl Serialize for Prefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_cidr(&s).map_err(serde::de::Error::custom)
    }
}

/// Mask an IPv4 address to a prefix length.
fn mask_ipv4(addr: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    let bits = u32::from_be_bytes(addr.octets());
    let mask = if prefix_len == 0 {
        0
    } else if prefix_len >= 32 {
        u32::MAX
    } else {
        u32::MAX << (32 - prefix_len)
    };
    Ipv4Addr::from((bits & mask).to_be_bytes())
}

/// Mask an IPv6 address to a prefix length.
fn mask_ipv6(addr: Ipv6Addr, prefix_len: u8) -> Ipv6Addr {
    let bits = u128::from_be_bytes(addr.octets());
    let mask = if prefix_len == 0 {
        0
    } else if prefix_len >= 128 {
        u128::MAX
    } else {
        u128::MAX << (128 - prefix_len)
    };
    Ipv6Addr::from((bits & mask).to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn p(s: &str) -> Prefix {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_keeps_host_bits() {
        let prefix = p("2001:db8:1::5/64");
        assert_eq!(prefix.prefix_len(), 64);
        assert_eq!(prefix.addr(), "2001:db8:1::5".parse::<IpAddr>().unwrap());
        assert_eq!(prefix.to_string(), "2001:db8:1::5/64");
        assert!(prefix.is_ipv6());
    }

    #[rstest]
    #[case("10.0.0.0")]
    #[case("10.0.0.0/33")]
    #[case("2001:db8::/129")]
    #[case("10.0.0/24")]
    #[case("10.0.0.0/abc")]
    #[case("")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(input.parse::<Prefix>().is_err());
    }

    #[rstest]
    #[case("10.0.0.7/24", "10.0.0.0/24")]
    #[case("100.64.0.1/32", "100.64.0.1/32")]
    #[case("192.168.77.1/0", "0.0.0.0/0")]
    #[case("2001:db8:1::5/48", "2001:db8:1::/48")]
    #[case("fd7a:115c:a1e0::1/128", "fd7a:115c:a1e0::1/128")]
    fn test_masked(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(p(input).masked(), p(expected));
    }

    #[test]
    fn test_with_prefix_len() {
        let prefix = p("2001:db8:1::5/64").with_prefix_len(48).unwrap();
        assert_eq!(prefix, p("2001:db8:1::5/48"));
        assert!(p("10.0.0.1/32").with_prefix_len(48).is_err());
    }

    #[test]
    fn test_contains() {
        let prefix = p("2001:db8::/32");
        assert!(prefix.contains("2001:db8::1".parse().unwrap()));
        assert!(!prefix.contains("2001:db9::1".parse().unwrap()));
        assert!(!prefix.contains("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_structural_equality() {
        assert_ne!(p("10.0.0.1/24"), p("10.0.0.0/24"));
        assert_eq!(p("10.0.0.1/24").masked(), p("10.0.0.0/24"));
    }

    #[test]
    fn test_family() {
        assert_eq!(p("10.0.0.0/8").family(), Family::V4);
        assert_eq!(p("::/0").family(), Family::V6);
        assert_eq!(Family::V6.to_string(), "ipv6");
    }

    #[test]
    fn test_serde_as_string() {
        let prefix = p("10.1.0.0/16");
        let json = serde_json::to_string(&prefix).unwrap();
        assert_eq!(json, "\"10.1.0.0/16\"");

        let back: Prefix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prefix);

        assert!(serde_json::from_str::<Prefix>("\"10.1.0.0\"").is_err());
    }

    proptest! {
        #[test]
        fn masked_v4_contains_address(octets in any::<[u8; 4]>(), len in 0u8..=32) {
            let addr = IpAddr::V4(Ipv4Addr::from(octets));
            let prefix = Prefix::new(addr, len).unwrap();
            let net = prefix.masked();
            prop_assert!(net.contains(addr));
            prop_assert_eq!(net.masked(), net);
        }
    }
}
