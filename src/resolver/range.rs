use std::net::Ipv4Addr;

use tracing::debug;

use crate::models::Target;

/// Expand an IP-range expression into concrete targets, all on `port`.
///
/// Accepted shapes:
/// - CIDR: `192.168.1.0/24`
/// - Dash range: `192.168.1.10-192.168.1.20` or `192.168.1.10-20`
/// - Single IPv4 literal: `192.168.1.10`
///
/// Malformed expressions yield an empty list rather than an error; callers
/// must surface "nothing to scan" to the operator.
pub fn resolve_range(expr: &str, port: u16) -> Vec<Target> {
    let expr = expr.trim();

    let targets = if expr.contains('/') {
        expand_cidr(expr, port)
    } else if expr.contains('-') {
        expand_dash_range(expr, port)
    } else if expr.parse::<Ipv4Addr>().is_ok() {
        vec![Target::new(expr, port)]
    } else {
        Vec::new()
    };

    debug!(expr, count = targets.len(), "Resolved IP range expression");
    targets
}

/// Expand a CIDR block into its usable host addresses. Host bits in the
/// address are tolerated; the network is derived from the mask. Prefixes
/// /31 and /32 have no network/broadcast pair, so every address in the
/// block is emitted.
fn expand_cidr(cidr: &str, port: u16) -> Vec<Target> {
    let Some((addr, prefix)) = cidr.split_once('/') else {
        return Vec::new();
    };
    let Ok(ip) = addr.trim().parse::<Ipv4Addr>() else {
        return Vec::new();
    };
    let Ok(prefix) = prefix.trim().parse::<u8>() else {
        return Vec::new();
    };
    if prefix > 32 {
        return Vec::new();
    }

    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    let network = u32::from(ip) & mask;
    let broadcast = network | !mask;

    let (start, end) = if prefix >= 31 {
        (network, broadcast)
    } else {
        (network + 1, broadcast - 1)
    };

    enumerate(start, end, port)
}

/// Expand `a.b.c.d-e` or `a.b.c.d-w.x.y.z`. A dotless right-hand side is
/// only the last octet and inherits the first three from the left.
fn expand_dash_range(range: &str, port: u16) -> Vec<Target> {
    let Some((start_s, end_s)) = range.split_once('-') else {
        return Vec::new();
    };
    let start_s = start_s.trim();
    let end_s = end_s.trim();

    let end_full;
    let end_s = if end_s.contains('.') {
        end_s
    } else {
        let mut octets: Vec<&str> = start_s.split('.').collect();
        if octets.len() != 4 {
            return Vec::new();
        }
        octets.truncate(3);
        end_full = format!("{}.{}", octets.join("."), end_s);
        &end_full
    };

    let Ok(start) = start_s.parse::<Ipv4Addr>() else {
        return Vec::new();
    };
    let Ok(end) = end_s.parse::<Ipv4Addr>() else {
        return Vec::new();
    };

    let (start, end) = (u32::from(start), u32::from(end));
    if start > end {
        return Vec::new();
    }

    enumerate(start, end, port)
}

fn enumerate(start: u32, end: u32, port: u16) -> Vec<Target> {
    (start..=end)
        .map(|n| Target::new(Ipv4Addr::from(n).to_string(), port))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_24_excludes_network_and_broadcast() {
        let targets = resolve_range("192.168.1.0/24", 11434);
        assert_eq!(targets.len(), 254);
        assert_eq!(targets[0].host, "192.168.1.1");
        assert_eq!(targets[253].host, "192.168.1.254");
        assert!(targets.iter().all(|t| t.port == 11434));
    }

    #[test]
    fn cidr_30_has_two_usable_hosts() {
        let targets = resolve_range("10.0.0.0/30", 8080);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].host, "10.0.0.1");
        assert_eq!(targets[1].host, "10.0.0.2");
    }

    #[test]
    fn cidr_tolerates_host_bits() {
        let targets = resolve_range("192.168.1.42/30", 11434);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].host, "192.168.1.41");
        assert_eq!(targets[1].host, "192.168.1.42");
    }

    #[test]
    fn cidr_32_is_a_single_address() {
        let targets = resolve_range("203.0.113.7/32", 11434);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].host, "203.0.113.7");
    }

    #[test]
    fn cidr_31_emits_both_addresses() {
        let targets = resolve_range("203.0.113.6/31", 11434);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn dash_range_full_addresses() {
        let targets = resolve_range("192.168.1.10-192.168.1.12", 11434);
        let hosts: Vec<&str> = targets.iter().map(|t| t.host.as_str()).collect();
        assert_eq!(hosts, ["192.168.1.10", "192.168.1.11", "192.168.1.12"]);
    }

    #[test]
    fn dash_range_last_octet_shorthand() {
        let targets = resolve_range("10.0.0.5-20", 11434);
        assert_eq!(targets.len(), 16);
        assert_eq!(targets[0].host, "10.0.0.5");
        assert_eq!(targets[15].host, "10.0.0.20");
    }

    #[test]
    fn dash_range_crossing_octet_boundary() {
        let targets = resolve_range("10.0.0.254-10.0.1.1", 11434);
        let hosts: Vec<&str> = targets.iter().map(|t| t.host.as_str()).collect();
        assert_eq!(hosts, ["10.0.0.254", "10.0.0.255", "10.0.1.0", "10.0.1.1"]);
    }

    #[test]
    fn dash_range_reversed_is_empty() {
        assert!(resolve_range("10.0.0.20-10.0.0.5", 11434).is_empty());
    }

    #[test]
    fn single_literal() {
        let targets = resolve_range("192.168.1.1", 9000);
        assert_eq!(targets, vec![Target::new("192.168.1.1", 9000)]);
    }

    #[test]
    fn malformed_expressions_are_empty() {
        assert!(resolve_range("999.1.2.3", 11434).is_empty());
        assert!(resolve_range("not-an-ip", 11434).is_empty());
        assert!(resolve_range("192.168.1.0/33", 11434).is_empty());
        assert!(resolve_range("192.168.1.0/abc", 11434).is_empty());
        assert!(resolve_range("abc-def", 11434).is_empty());
        assert!(resolve_range("", 11434).is_empty());
    }
}
