use reqwest::Client;
use std::time::Duration;

/// Shared connection-reusing client for the directory probe: per-request
/// timeout, TLS certificate validation disabled, idle-pool limits tied to
/// the worker count so full concurrency cannot exhaust the pool.
pub fn create_http_pool(timeout: Duration, pool_size: usize) -> Client {
    Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(true)
        .pool_max_idle_per_host(pool_size.max(1))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
        .expect("Failed to create HTTP client")
}
