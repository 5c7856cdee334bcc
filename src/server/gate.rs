//! Access gate in front of the engine: URL secret and caller IP allow-list.

use std::net::IpAddr;

use tracing::warn;

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IpRule {
    Any,
    Exact(IpAddr),
    Network(IpAddr, u8),
    /// IPv4 octets, `None` matches any value.
    Octets([Option<u8>; 4]),
    /// IPv6 groups, `None` matches any value.
    Groups([Option<u16>; 8]),
}

impl IpRule {
    fn parse(entry: &str) -> Option<Self> {
        if entry == "*" {
            return Some(Self::Any);
        }

        if let Some((addr, prefix)) = entry.split_once('/') {
            let addr: IpAddr = addr.parse().ok()?;
            let prefix: u8 = prefix.parse().ok()?;
            let max = if addr.is_ipv4() { 32 } else { 128 };
            return (prefix <= max).then_some(Self::Network(addr, prefix));
        }

        if let Ok(addr) = entry.parse::<IpAddr>() {
            return Some(Self::Exact(addr));
        }

        if !entry.contains('*') {
            return None;
        }

        // `2001:db8:*`; missing trailing groups count as wildcards.
        if entry.contains(':') {
            let parts: Vec<&str> = entry.split(':').collect();
            if parts.len() > 8 {
                return None;
            }
            let mut groups = [None; 8];
            for (slot, part) in groups.iter_mut().zip(parts) {
                *slot = match part {
                    "*" => None,
                    n => Some(u16::from_str_radix(n, 16).ok()?),
                };
            }
            return Some(Self::Groups(groups));
        }

        // `192.168.*.*`; missing trailing octets count as wildcards.
        let parts: Vec<&str> = entry.split('.').collect();
        if parts.len() > 4 {
            return None;
        }
        let mut octets = [None; 4];
        for (slot, part) in octets.iter_mut().zip(parts) {
            *slot = match part {
                "*" => None,
                n => Some(n.parse().ok()?),
            };
        }
        Some(Self::Octets(octets))
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(addr) => addr == ip,
            Self::Network(net, prefix) => in_network(net, *prefix, ip),
            Self::Octets(pattern) => match ip {
                IpAddr::V4(v4) => pattern
                    .iter()
                    .zip(v4.octets())
                    .all(|(want, got)| want.map_or(true, |w| w == got)),
                IpAddr::V6(_) => false,
            },
            Self::Groups(pattern) => match ip {
                IpAddr::V6(v6) => pattern
                    .iter()
                    .zip(v6.segments())
                    .all(|(want, got)| want.map_or(true, |w| w == got)),
                IpAddr::V4(_) => false,
            },
        }
    }
}

fn in_network(net: &IpAddr, prefix: u8, ip: &IpAddr) -> bool {
    match (net, ip) {
        (IpAddr::V4(net), IpAddr::V4(ip)) => {
            let mask = u32::MAX.checked_shl(32 - prefix as u32).unwrap_or(0);
            u32::from(*net) & mask == u32::from(*ip) & mask
        }
        (IpAddr::V6(net), IpAddr::V6(ip)) => {
            let mask = u128::MAX.checked_shl(128 - prefix as u32).unwrap_or(0);
            u128::from(*net) & mask == u128::from(*ip) & mask
        }
        _ => false,
    }
}

/// Comma separated allow-list of caller addresses.
///
/// Entries are `*` (everyone), exact addresses, CIDR networks
/// (`10.0.0.0/8`, `fd00::/8`), IPv4 patterns with `*` per octet
/// (`192.168.*.*`) or IPv6 patterns with `*` per group written without
/// `::` (`2001:db8:*`). An empty list allows nobody.
#[derive(Debug, Clone, Default)]
pub struct IpAllowList {
    rules: Vec<IpRule>,
}

impl IpAllowList {
    /// Parse the list. Invalid entries are logged and ignored.
    pub fn parse(list: &str) -> Self {
        let rules = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let rule = IpRule::parse(entry);
                if rule.is_none() {
                    warn!(entry = %entry, "Ignoring invalid allowed IP entry");
                }
                rule
            })
            .collect();

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn allows(&self, ip: IpAddr) -> bool {
        let ip = canonical(ip);
        self.rules.iter().any(|rule| rule.matches(&ip))
    }
}

/// IPv4-mapped IPv6 addresses are compared as IPv4.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    SecretNotConfigured,
    SecretMismatch,
    NoAllowedIps,
    IpNotAllowed,
}

impl Denied {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SecretNotConfigured => "no secret configured",
            Self::SecretMismatch => "secret does not match",
            Self::NoAllowedIps => "no allowed IPs configured",
            Self::IpNotAllowed => "caller IP is not allowed",
        }
    }
}

/// Secret and IP checks, in that order.
#[derive(Debug, Clone)]
pub struct Gate {
    secret: String,
    allowed: IpAllowList,
}

impl Gate {
    pub fn new(secret: impl Into<String>, allowed_ips: &str) -> Self {
        Self {
            secret: secret.into(),
            allowed: IpAllowList::parse(allowed_ips),
        }
    }

    pub fn check(&self, secret: &str, ip: IpAddr) -> Result<(), Denied> {
        if self.secret.is_empty() {
            return Err(Denied::SecretNotConfigured);
        }
        if !constant_time_eq(self.secret.as_bytes(), secret.as_bytes()) {
            return Err(Denied::SecretMismatch);
        }
        if self.allowed.is_empty() {
            return Err(Denied::NoAllowedIps);
        }
        if !self.allowed.allows(ip) {
            return Err(Denied::IpNotAllowed);
        }
        Ok(())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
