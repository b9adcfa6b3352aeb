use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: usize = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Failed-login throttle per client IP, kept in memory.
#[derive(Clone)]
pub struct LoginThrottle {
    max_attempts: usize,
    window: Duration,
    failures: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, WINDOW)
    }
}

impl LoginThrottle {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// True once `max_attempts` failures fall inside the window. Stale
    /// entries for the IP are pruned on the way.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let Some(stamps) = map.get_mut(&ip) else {
            return false;
        };
        stamps.retain(|t| now.duration_since(*t) < self.window);
        if stamps.is_empty() {
            map.remove(&ip);
            return false;
        }
        stamps.len() >= self.max_attempts
    }

    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(ip).or_default().push(Instant::now());
    }

    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    #[test]
    fn blocks_after_max_failures() {
        let throttle = LoginThrottle::new(3, Duration::from_secs(60));
        for _ in 0..2 {
            throttle.record_failure(IP);
        }
        assert!(!throttle.is_blocked(IP));
        throttle.record_failure(IP);
        assert!(throttle.is_blocked(IP));
        throttle.clear(IP);
        assert!(!throttle.is_blocked(IP));
    }

    #[test]
    fn failures_expire_with_window() {
        let throttle = LoginThrottle::new(1, Duration::from_millis(0));
        throttle.record_failure(IP);
        assert!(!throttle.is_blocked(IP));
    }
}
