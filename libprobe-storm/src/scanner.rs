use crate::filter::FilterRules;
use crate::http::create_http_pool;
use crate::ratelimit::Pacer;
use crate::sink::ResultSink;
use crate::stats::ScanStats;
use crate::types::{ProbeOutcome, ScanConfig};
use crate::{dns, web};
use futures::future::join_all;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Paced dispatch loop plus a fixed pool of probe workers. One scanner owns
/// the HTTP pool, the pacer, and the run counters; the per-mode entry points
/// differ only in the probe they hand to the pool.
pub struct Scanner {
    client: Client,
    pacer: Arc<Pacer>,
    stats: Arc<ScanStats>,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let client = create_http_pool(config.timeout, config.workers);
        Self {
            client,
            pacer: Arc::new(Pacer::per_second(config.rate_limit)),
            stats: Arc::new(ScanStats::default()),
            config,
        }
    }

    pub fn stats(&self) -> Arc<ScanStats> {
        Arc::clone(&self.stats)
    }

    /// Subdomain mode: resolve every target through DNS.
    pub async fn scan_hosts(&self, targets: Vec<String>, sink: Arc<ResultSink>) {
        let timeout = self.config.timeout;
        self.run_pool(targets, sink, move |target: String| async move {
            dns::check_host(&target, timeout).await
        })
        .await;
    }

    /// Directory mode: GET every target and classify it through the rules.
    pub async fn scan_pages(
        &self,
        targets: Vec<String>,
        rules: FilterRules,
        sink: Arc<ResultSink>,
    ) {
        let client = self.client.clone();
        let rules = Arc::new(rules);
        self.run_pool(targets, sink, move |target: String| {
            let client = client.clone();
            let rules = Arc::clone(&rules);
            async move { web::check_url(&client, &target, &rules).await }
        })
        .await;
    }

    /// The concurrency core. A bounded channel with capacity equal to the
    /// worker count backpressures the producer at W outstanding jobs; the
    /// dispatch loop paces every send; dropping the sender closes the channel
    /// and is the workers' only stop signal. Probe outcomes never cross the
    /// channel boundary.
    async fn run_pool<F, Fut>(&self, targets: Vec<String>, sink: Arc<ResultSink>, probe: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProbeOutcome> + Send + 'static,
    {
        let worker_count = self.config.workers.max(1);
        let (tx, rx) = mpsc::channel::<String>(worker_count);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let probe = Arc::new(probe);

        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let rx = Arc::clone(&rx);
            let probe = Arc::clone(&probe);
            let sink = Arc::clone(&sink);
            let stats = Arc::clone(&self.stats);
            workers.push(tokio::spawn(async move {
                loop {
                    // Hold the lock only across the receive; a slow probe
                    // must not block the other workers' pulls.
                    let received = { rx.lock().await.recv().await };
                    let Some(target) = received else { break };

                    debug!("probing {}", target);
                    stats.record_probe();
                    match probe(target).await {
                        ProbeOutcome::Found(finding) => {
                            stats.record_found();
                            sink.report(&finding);
                        }
                        ProbeOutcome::Miss => {}
                        ProbeOutcome::Failed { reason } => {
                            stats.record_failure(reason);
                            debug!("probe failed: {}", reason);
                        }
                    }
                }
            }));
        }

        for target in targets {
            self.pacer.acquire().await;
            if tx.send(target).await.is_err() {
                break;
            }
        }
        drop(tx);

        join_all(workers).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Finding;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn scanner(workers: usize, rate_limit: u32) -> Scanner {
        Scanner::new(ScanConfig {
            workers,
            rate_limit,
            timeout: Duration::from_secs(1),
        })
    }

    fn null_sink() -> Arc<ResultSink> {
        Arc::new(ResultSink::new(None, false))
    }

    #[tokio::test]
    async fn pool_drains_every_target_and_terminates() {
        let scanner = scanner(4, 1000);
        let handled = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&handled);
        let targets: Vec<String> = (0..25).map(|i| format!("target-{}", i)).collect();
        scanner
            .run_pool(targets, null_sink(), move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ProbeOutcome::Miss
                }
            })
            .await;

        assert_eq!(handled.load(Ordering::SeqCst), 25);
        assert_eq!(scanner.stats().probed(), 25);
        assert_eq!(scanner.stats().found(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn in_flight_probes_never_exceed_the_worker_count() {
        let scanner = scanner(3, 1000);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let in_flight_probe = Arc::clone(&in_flight);
        let peak_probe = Arc::clone(&peak);
        let targets: Vec<String> = (0..12).map(|i| format!("target-{}", i)).collect();
        scanner
            .run_pool(targets, null_sink(), move |_| {
                let in_flight = Arc::clone(&in_flight_probe);
                let peak = Arc::clone(&peak_probe);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    ProbeOutcome::Miss
                }
            })
            .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn dispatch_respects_the_rate_limit_regardless_of_workers() {
        let scanner = scanner(8, 100);
        let targets: Vec<String> = (0..12).map(|i| format!("target-{}", i)).collect();

        let start = Instant::now();
        scanner
            .run_pool(targets, null_sink(), move |_| async move {
                ProbeOutcome::Miss
            })
            .await;

        // 12 sends at 100/s need 120ms of dispatch time even with idle
        // workers; the margin absorbs clock skew.
        assert!(
            start.elapsed() >= Duration::from_millis(110),
            "dispatch finished in {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn found_and_failed_outcomes_reach_the_stats() {
        let scanner = scanner(2, 1000);
        let targets = vec!["hit".to_string(), "down".to_string()];

        scanner
            .run_pool(targets, null_sink(), move |target: String| async move {
                if target == "hit" {
                    ProbeOutcome::Found(Finding::Host {
                        target,
                        addrs: vec!["127.0.0.1".parse().unwrap()],
                    })
                } else {
                    ProbeOutcome::Failed { reason: "connect" }
                }
            })
            .await;

        let stats = scanner.stats();
        assert_eq!(stats.probed(), 2);
        assert_eq!(stats.found(), 1);
        assert_eq!(stats.failures(), [("connect", 1)]);
    }

    #[tokio::test]
    async fn empty_target_list_completes_immediately() {
        let scanner = scanner(4, 10);
        scanner
            .run_pool(Vec::new(), null_sink(), move |_| async move {
                ProbeOutcome::Miss
            })
            .await;
        assert_eq!(scanner.stats().probed(), 0);
    }
}
