use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::time::Duration;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Fixed-interval pacing for the dispatch loop: one permit per `1/rate`
/// seconds, no burst. Shared by all workers through the single producer.
pub struct Pacer {
    limiter: Limiter,
}

impl Pacer {
    pub fn per_second(rate: u32) -> Self {
        let period = Duration::from_secs(1) / rate.max(1);
        let quota = Quota::with_period(period).expect("pacing period is non-zero");
        let limiter = RateLimiter::direct(quota);
        // Burn the initial cell so the first acquire waits a full period,
        // like a ticker that fires only after its interval elapses.
        let _ = limiter.check();
        Self { limiter }
    }

    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}
