mod dns;
mod expand;
mod filter;
mod http;
mod ratelimit;
mod scanner;
mod sink;
mod stats;
mod types;
mod web;
mod wordlist;

pub use expand::{apply_extensions, directory_candidates, expand, subdomain_candidates};
pub use filter::{FilterError, FilterRules, DEFAULT_MATCH_CODES};
pub use scanner::Scanner;
pub use sink::ResultSink;
pub use stats::ScanStats;
pub use types::{Finding, ProbeOutcome, ScanConfig};
pub use wordlist::{WordlistError, WordlistStore, DEFAULT_MARKER};

/// One-shot DNS existence check with the default timeout.
pub async fn probe_host(target: &str) -> ProbeOutcome {
    dns::check_host(target, ScanConfig::default().timeout).await
}
