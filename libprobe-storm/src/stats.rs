use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Run counters kept outside the probe control flow. Workers record here;
/// nothing in here feeds back into Found/Miss decisions.
#[derive(Debug, Default)]
pub struct ScanStats {
    probed: AtomicU64,
    found: AtomicU64,
    failures: DashMap<&'static str, u64>,
}

impl ScanStats {
    pub fn record_probe(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, reason: &'static str) {
        *self.failures.entry(reason).or_insert(0) += 1;
    }

    pub fn probed(&self) -> u64 {
        self.probed.load(Ordering::Relaxed)
    }

    pub fn found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    /// Failure reasons with counts, sorted by reason for stable output.
    pub fn failures(&self) -> Vec<(&'static str, u64)> {
        let mut snapshot: Vec<_> = self
            .failures
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        snapshot.sort_by_key(|&(reason, _)| reason);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = ScanStats::default();
        stats.record_probe();
        stats.record_probe();
        stats.record_found();
        stats.record_failure("timeout");
        stats.record_failure("timeout");
        stats.record_failure("connect");

        assert_eq!(stats.probed(), 2);
        assert_eq!(stats.found(), 1);
        assert_eq!(stats.failures(), [("connect", 1), ("timeout", 2)]);
    }
}
