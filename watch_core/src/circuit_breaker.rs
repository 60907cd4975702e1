//! Circuit breaker for the upstream sports feeds.
//!
//! Every feed client holds one of these. Repeated upstream failures open the
//! circuit so a dead API turns into a fast local error instead of a pile of
//! timed-out requests once per poll tick.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// States for the feed circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCircuitState {
    /// Normal operation - requests are allowed
    Closed,
    /// Circuit is open - requests are blocked
    Open,
    /// Testing if the feed has recovered
    HalfOpen,
}

/// Configuration for the feed circuit breaker
#[derive(Debug, Clone)]
pub struct ApiCircuitBreakerConfig {
    /// Number of consecutive failures to trip the circuit
    pub failure_threshold: u32,
    /// Duration to wait before attempting recovery
    pub recovery_timeout: Duration,
    /// Number of successful calls in half-open state to close the circuit
    pub success_threshold: u32,
}

impl Default for ApiCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 2,
        }
    }
}

/// Lightweight circuit breaker for external feed calls.
///
/// - Tracks consecutive failures
/// - Opens the circuit after the failure threshold
/// - Auto-transitions to half-open after the recovery timeout
/// - Closes again after enough successes in half-open state
pub struct ApiCircuitBreaker {
    name: String,
    config: ApiCircuitBreakerConfig,
    state: RwLock<ApiCircuitState>,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure_time: RwLock<Option<Instant>>,
}

impl ApiCircuitBreaker {
    pub fn new(name: &str, config: ApiCircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            state: RwLock::new(ApiCircuitState::Closed),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure_time: RwLock::new(None),
        }
    }

    pub fn with_defaults(name: &str) -> Self {
        Self::new(name, ApiCircuitBreakerConfig::default())
    }

    /// Check if the circuit breaker allows requests
    pub fn is_available(&self) -> bool {
        let mut state = self.state.write();

        match *state {
            ApiCircuitState::Closed => true,
            ApiCircuitState::Open => {
                let should_try = self
                    .last_failure_time
                    .read()
                    .map(|t| t.elapsed() >= self.config.recovery_timeout)
                    .unwrap_or(true);

                if should_try {
                    *state = ApiCircuitState::HalfOpen;
                    self.success_count.store(0, Ordering::SeqCst);
                    true
                } else {
                    false
                }
            }
            ApiCircuitState::HalfOpen => true,
        }
    }

    /// Record a successful feed call
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);

        let mut state = self.state.write();
        match *state {
            ApiCircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    *state = ApiCircuitState::Closed;
                    tracing::info!(
                        "feed circuit breaker '{}' closed after {} successful calls",
                        self.name,
                        successes
                    );
                }
            }
            _ => {
                *state = ApiCircuitState::Closed;
            }
        }
    }

    /// Record a failed feed call
    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_failure_time.write() = Some(Instant::now());

        let mut state = self.state.write();
        match *state {
            ApiCircuitState::Closed => {
                if failures >= self.config.failure_threshold {
                    *state = ApiCircuitState::Open;
                    tracing::warn!(
                        "feed circuit breaker '{}' OPENED after {} consecutive failures",
                        self.name,
                        failures
                    );
                }
            }
            ApiCircuitState::HalfOpen => {
                // Any failure in half-open goes straight back to open
                *state = ApiCircuitState::Open;
                tracing::warn!(
                    "feed circuit breaker '{}' re-OPENED during half-open test",
                    self.name
                );
            }
            ApiCircuitState::Open => {}
        }
    }

    pub fn state(&self) -> ApiCircuitState {
        *self.state.read()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Reset the circuit breaker to closed state
    pub fn reset(&self) {
        let mut state = self.state.write();
        *state = ApiCircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        *self.last_failure_time.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trips_after_threshold() {
        let cb = ApiCircuitBreaker::new(
            "nhl",
            ApiCircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_millis(100),
                success_threshold: 2,
            },
        );

        assert!(cb.is_available());
        assert_eq!(cb.state(), ApiCircuitState::Closed);

        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_available()); // 2 < 3

        cb.record_failure();
        assert_eq!(cb.state(), ApiCircuitState::Open);
        assert!(!cb.is_available());
    }

    #[test]
    fn test_recovery_via_half_open() {
        let cb = ApiCircuitBreaker::new(
            "mlb",
            ApiCircuitBreakerConfig {
                failure_threshold: 2,
                recovery_timeout: Duration::from_millis(10),
                success_threshold: 2,
            },
        );

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), ApiCircuitState::Open);

        std::thread::sleep(Duration::from_millis(20));

        assert!(cb.is_available());
        assert_eq!(cb.state(), ApiCircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.state(), ApiCircuitState::HalfOpen); // needs 2 successes

        cb.record_success();
        assert_eq!(cb.state(), ApiCircuitState::Closed);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = ApiCircuitBreaker::new(
            "nba",
            ApiCircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_millis(10),
                success_threshold: 1,
            },
        );

        cb.record_failure();
        assert_eq!(cb.state(), ApiCircuitState::Open);

        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.is_available());

        cb.record_failure();
        assert_eq!(cb.state(), ApiCircuitState::Open);
    }

    #[test]
    fn test_reset() {
        let cb = ApiCircuitBreaker::with_defaults("soccer");
        for _ in 0..10 {
            cb.record_failure();
        }
        assert_eq!(cb.state(), ApiCircuitState::Open);

        cb.reset();
        assert_eq!(cb.state(), ApiCircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }
}
