use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Entries past their window are swept once the table grows beyond this.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count one request from `client`. Returns false once the client is over its limit.
    pub fn try_acquire(&self, client: IpAddr, now: Instant) -> bool {
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let entry = clients.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_limit_per_window() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.try_acquire(ip(1), now));
        }
        assert!(!limiter.try_acquire(ip(1), now));
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, DEFAULT_WINDOW);
        let now = Instant::now();

        assert!(limiter.try_acquire(ip(1), now));
        assert!(limiter.try_acquire(ip(2), now));
        assert!(!limiter.try_acquire(ip(1), now));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.try_acquire(ip(1), start));
        assert!(limiter.try_acquire(ip(1), start + Duration::from_secs(10)));
        assert!(!limiter.try_acquire(ip(1), start + Duration::from_secs(59)));
        assert!(limiter.try_acquire(ip(1), start + Duration::from_secs(60)));
    }
}
