use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// A candidate that exists according to the mode's success criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Host {
        target: String,
        addrs: Vec<IpAddr>,
    },
    Page {
        url: String,
        status: u16,
        /// Content-Length header value, -1 when the header is absent.
        size: i64,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Host { target, addrs } => {
                let joined = addrs
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Found: {} -> [{}]", target, joined)
            }
            Finding::Page { url, status, size } => {
                write!(f, "Found: {} [Code: {}, Size: {}]", url, status, size)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found(Finding),
    Miss,
    /// Transport-level failure. Counted for diagnostics, otherwise treated
    /// exactly like a miss.
    Failed { reason: &'static str },
}

impl ProbeOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ProbeOutcome::Found(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, ProbeOutcome::Miss)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Fixed number of concurrent workers; also the job channel capacity.
    pub workers: usize,
    /// Hard global cap on job submissions per second, shared by all workers.
    pub rate_limit: u32,
    /// Per-probe timeout (HTTP request / DNS lookup).
    pub timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            rate_limit: 10,
            timeout: Duration::from_secs(10),
        }
    }
}
