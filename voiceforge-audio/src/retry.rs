//! Retry schedules for per-chunk synthesis
//!
//! A policy answers two questions: how many attempts a chunk gets, and how
//! long to wait before retry `n` (1-based: the wait after the first failure is
//! `delay_before_retry(1)`).

use std::time::Duration;

use rand::Rng;

use voiceforge_core::config::{RETRY_ATTEMPTS_PER_CHUNK, RETRY_BACKOFF_MS};
use voiceforge_core::PipelineConfig;

pub trait RetryPolicy: Send + Sync {
    /// Total attempts per chunk, including the first. Always at least 1.
    fn max_attempts(&self) -> u32;

    /// Wait before retry `retry` (1-based).
    fn delay_before_retry(&self, retry: u32) -> Duration;
}

/// Fixed table of waits; retries past the end reuse the last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBackoff {
    attempts: u32,
    delays_ms: Vec<u64>,
}

impl StagedBackoff {
    pub fn new(attempts: u32, delays_ms: Vec<u64>) -> Self {
        Self {
            attempts: attempts.max(1),
            delays_ms,
        }
    }

    /// 3 attempts, waiting 500 ms then 1200 ms.
    pub fn standard() -> Self {
        Self::new(RETRY_ATTEMPTS_PER_CHUNK, RETRY_BACKOFF_MS.to_vec())
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_backoff_ms.clone())
    }
}

impl Default for StagedBackoff {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryPolicy for StagedBackoff {
    fn max_attempts(&self) -> u32 {
        self.attempts
    }

    fn delay_before_retry(&self, retry: u32) -> Duration {
        let idx = (retry.max(1) - 1) as usize;
        let ms = self
            .delays_ms
            .get(idx)
            .or_else(|| self.delays_ms.last())
            .copied()
            .unwrap_or(0);
        Duration::from_millis(ms)
    }
}

/// `base * factor^(retry-1)`, capped, with optional jitter of up to
/// `jitter` (fraction of the capped delay) added on top. The cap bounds the
/// base delay only, so waits at the cap still spread out.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    pub attempts: u32,
    pub base: Duration,
    pub factor: f64,
    pub cap: Duration,
    pub jitter: f64,
}

impl ExponentialBackoff {
    pub fn new(attempts: u32, base: Duration, factor: f64, cap: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base,
            factor,
            cap,
            jitter: 0.0,
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.attempts
    }

    fn delay_before_retry(&self, retry: u32) -> Duration {
        let exp = retry.max(1) - 1;
        let cap_ms = self.cap.as_millis() as f64;
        let raw = self.base.as_millis() as f64 * self.factor.max(1.0).powi(exp as i32);
        let capped = raw.min(cap_ms);
        let jittered = if self.jitter > 0.0 {
            capped * (1.0 + rand::thread_rng().gen_range(0.0..=self.jitter))
        } else {
            capped
        };
        Duration::from_millis(jittered.round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schedule() {
        let policy = StagedBackoff::standard();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(500));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(1200));
        // past the table
        assert_eq!(policy.delay_before_retry(5), Duration::from_millis(1200));
    }

    #[test]
    fn test_staged_clamps_attempts_and_handles_empty_table() {
        let policy = StagedBackoff::new(0, vec![]);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_before_retry(1), Duration::ZERO);
    }

    #[test]
    fn test_from_config() {
        let cfg = PipelineConfig {
            retry_attempts: 5,
            retry_backoff_ms: vec![10, 20, 40],
            ..PipelineConfig::standard()
        };
        let policy = StagedBackoff::from_config(&cfg);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(40));
        assert_eq!(policy.delay_before_retry(4), Duration::from_millis(40));
    }

    #[test]
    fn test_exponential_grows_and_caps() {
        let policy = ExponentialBackoff::new(
            4,
            Duration::from_millis(100),
            2.0,
            Duration::from_millis(300),
        );
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(300));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = ExponentialBackoff::new(
            3,
            Duration::from_millis(100),
            2.0,
            Duration::from_secs(10),
        )
        .with_jitter(0.5);
        for _ in 0..50 {
            let d = policy.delay_before_retry(1);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_jitter_applies_at_the_cap() {
        let policy = ExponentialBackoff::new(
            5,
            Duration::from_millis(100),
            2.0,
            Duration::from_millis(300),
        )
        .with_jitter(0.5);
        let delays: Vec<Duration> = (0..100).map(|_| policy.delay_before_retry(4)).collect();
        for d in &delays {
            assert!(*d >= Duration::from_millis(300));
            assert!(*d <= Duration::from_millis(450));
        }
        assert!(delays.iter().any(|d| *d > Duration::from_millis(300)));
    }
}
