use crate::types::{Finding, ProbeOutcome};
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::lookup_host;

/// Resolves a candidate host through the system resolver. The emitted
/// finding carries the original target string; only the lookup uses the
/// scheme-stripped form. Resolver errors (NXDOMAIN included) are misses.
pub async fn check_host(target: &str, timeout: Duration) -> ProbeOutcome {
    let host = strip_scheme(target);

    match tokio::time::timeout(timeout, lookup_host((host, 80u16))).await {
        Ok(Ok(addrs)) => {
            let mut ips: Vec<IpAddr> = Vec::new();
            for addr in addrs {
                if !ips.contains(&addr.ip()) {
                    ips.push(addr.ip());
                }
            }
            if ips.is_empty() {
                ProbeOutcome::Miss
            } else {
                ProbeOutcome::Found(Finding::Host {
                    target: target.to_string(),
                    addrs: ips,
                })
            }
        }
        Ok(Err(_)) => ProbeOutcome::Miss,
        Err(_) => ProbeOutcome::Failed {
            reason: "dns timeout",
        },
    }
}

pub fn strip_scheme(target: &str) -> &str {
    let host = target.strip_prefix("http://").unwrap_or(target);
    host.strip_prefix("https://").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_prefixes_are_stripped_for_lookup() {
        assert_eq!(strip_scheme("http://api.example.com"), "api.example.com");
        assert_eq!(strip_scheme("https://api.example.com"), "api.example.com");
        assert_eq!(strip_scheme("api.example.com"), "api.example.com");
    }

    #[tokio::test]
    async fn localhost_resolves_to_at_least_one_address() {
        let outcome = check_host("localhost", Duration::from_secs(5)).await;
        match outcome {
            ProbeOutcome::Found(Finding::Host { target, addrs }) => {
                assert_eq!(target, "localhost");
                assert!(!addrs.is_empty());
            }
            other => panic!("expected a finding for localhost, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn reserved_invalid_tld_is_a_miss() {
        let outcome = check_host("no-such-host.invalid", Duration::from_secs(5)).await;
        assert!(outcome.is_miss() || outcome.is_failed());
    }
}
