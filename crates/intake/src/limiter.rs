//! Per-client fixed-window rate limiting.
//!
//! Each [`ClientId`] gets a counter that allows up to
//! [`LimiterPolicy::max_requests`] calls per window. The window starts at the
//! first request after the previous one expired; it does not slide. A client
//! may therefore burst up to twice the limit across a window boundary.
//!
//! State lives in this process only. With several instances behind a load
//! balancer each one enforces the limit independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{ClientId, Clock};

/// Requests allowed per client per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 8;

/// Length of one rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Limits applied to every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterPolicy {
    /// Maximum allowed calls inside one window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for LimiterPolicy {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Result of [`FixedWindowLimiter::check_and_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Rejected,
}

impl RateDecision {
    /// `true` for [`RateDecision::Allowed`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Usage of one client inside its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientWindowCounter {
    pub request_count: u32,
    pub window_start: Instant,
}

impl ClientWindowCounter {
    fn fresh(now: Instant) -> Self {
        Self {
            request_count: 1,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) > window
    }
}

/// In-memory fixed-window limiter keyed by [`ClientId`].
///
/// The whole read-compare-increment sequence runs under one mutex so
/// concurrent handlers cannot push a client past its limit.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    policy: LimiterPolicy,
    clock: Arc<dyn Clock>,
    counters: Mutex<HashMap<ClientId, ClientWindowCounter>>,
}

impl FixedWindowLimiter {
    /// Creates a limiter driven by the system clock.
    pub fn new(policy: LimiterPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Creates a limiter driven by the given clock.
    pub fn with_clock(policy: LimiterPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Limits this limiter was built with.
    pub fn policy(&self) -> LimiterPolicy {
        self.policy
    }

    /// Records one request from `client` and decides whether it may proceed.
    ///
    /// A rejected request does not touch the counter.
    pub fn check_and_record(&self, client: &ClientId) -> RateDecision {
        let now = self.clock.now();
        let mut counters = self.lock();

        match counters.get_mut(client) {
            Some(counter) if !counter.is_expired(now, self.policy.window) => {
                if counter.request_count < self.policy.max_requests {
                    counter.request_count += 1;
                    RateDecision::Allowed
                } else {
                    RateDecision::Rejected
                }
            }
            Some(counter) => {
                *counter = ClientWindowCounter::fresh(now);
                RateDecision::Allowed
            }
            None => {
                counters.insert(client.clone(), ClientWindowCounter::fresh(now));
                RateDecision::Allowed
            }
        }
    }

    /// Drops counters whose window has already expired.
    ///
    /// Such counters would be reset on the client's next request anyway, so
    /// removing them never changes a decision. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.policy.window;
        let mut counters = self.lock();

        let before = counters.len();
        counters.retain(|_, counter| !counter.is_expired(now, window));
        let evicted = before - counters.len();

        debug!(evicted, remaining = counters.len(), "Swept expired rate-limit counters");
        evicted
    }

    /// Number of clients currently holding a counter.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    /// Current request count for `client`, if it has a counter.
    pub fn request_count(&self, client: &ClientId) -> Option<u32> {
        self.lock().get(client).map(|counter| counter.request_count)
    }

    // A panic while holding the lock cannot leave a counter half-written, so
    // poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, ClientWindowCounter>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(LimiterPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockClock;

    fn client(id: &str) -> ClientId {
        ClientId::new(id).unwrap()
    }

    fn limiter_with_clock() -> (FixedWindowLimiter, MockClock) {
        let clock = MockClock::new(Instant::now());
        let limiter = FixedWindowLimiter::with_clock(LimiterPolicy::default(), Arc::new(clock.clone()));
        (limiter, clock)
    }

    #[test]
    fn test_default_policy_values() {
        let policy = LimiterPolicy::default();
        assert_eq!(policy.max_requests, 8);
        assert_eq!(policy.window, Duration::from_secs(60));
    }

    #[test]
    fn test_eight_allowed_then_ninth_rejected() {
        let (limiter, clock) = limiter_with_clock();
        let c = client("203.0.113.1");

        for i in 0..8 {
            assert_eq!(limiter.check_and_record(&c), RateDecision::Allowed, "call {i}");
            clock.advance(Duration::from_secs(1));
        }
        assert_eq!(limiter.check_and_record(&c), RateDecision::Rejected);
        assert_eq!(limiter.request_count(&c), Some(8));
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let (limiter, clock) = limiter_with_clock();
        let c = client("203.0.113.1");

        for _ in 0..9 {
            limiter.check_and_record(&c);
        }
        assert_eq!(limiter.check_and_record(&c), RateDecision::Rejected);

        clock.advance(DEFAULT_WINDOW + Duration::from_millis(1));
        assert_eq!(limiter.check_and_record(&c), RateDecision::Allowed);
        assert_eq!(limiter.request_count(&c), Some(1));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let (limiter, clock) = limiter_with_clock();
        let c = client("203.0.113.1");

        for _ in 0..8 {
            limiter.check_and_record(&c);
        }
        // Exactly one window later the counter is still live.
        clock.advance(DEFAULT_WINDOW);
        assert_eq!(limiter.check_and_record(&c), RateDecision::Rejected);
    }

    #[test]
    fn test_boundary_burst_is_permitted() {
        let (limiter, clock) = limiter_with_clock();
        let c = client("203.0.113.1");

        assert!(limiter.check_and_record(&c).is_allowed());
        clock.advance(DEFAULT_WINDOW - Duration::from_millis(10));
        for _ in 0..7 {
            assert!(limiter.check_and_record(&c).is_allowed());
        }
        clock.advance(Duration::from_millis(20));
        for _ in 0..8 {
            assert!(limiter.check_and_record(&c).is_allowed());
        }
    }

    #[test]
    fn test_clients_are_counted_independently() {
        let (limiter, _clock) = limiter_with_clock();
        let a = client("10.0.0.1");
        let b = client("10.0.0.2");

        for _ in 0..8 {
            limiter.check_and_record(&a);
        }
        assert_eq!(limiter.check_and_record(&a), RateDecision::Rejected);
        assert_eq!(limiter.check_and_record(&b), RateDecision::Allowed);
        assert_eq!(limiter.request_count(&a), Some(8));
        assert_eq!(limiter.request_count(&b), Some(1));
    }

    #[test]
    fn test_evict_expired_only_removes_stale_counters() {
        let (limiter, clock) = limiter_with_clock();
        let stale = client("10.0.0.1");
        let live = client("10.0.0.2");

        limiter.check_and_record(&stale);
        clock.advance(Duration::from_secs(30));
        limiter.check_and_record(&live);
        clock.advance(Duration::from_secs(31));

        assert_eq!(limiter.evict_expired(), 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.request_count(&stale), None);
        assert_eq!(limiter.request_count(&live), Some(1));
    }

    #[test]
    fn test_concurrent_callers_never_exceed_limit() {
        let limiter = Arc::new(FixedWindowLimiter::default());
        let c = client("10.0.0.9");

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let c = c.clone();
                std::thread::spawn(move || limiter.check_and_record(&c).is_allowed())
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();
        assert_eq!(allowed, 8);
    }
}
