use serde::{Deserialize, Serialize};

use crate::preflight::MAX_WORDS_PER_REQUEST;
use crate::text::MAX_WORDS_PER_WINDOW;
use crate::{Result, VfError};

/// Attempts per chunk before the request fails.
pub const RETRY_ATTEMPTS_PER_CHUNK: u32 = 3;
/// Wait before retry N (1-based); the last entry repeats.
pub const RETRY_BACKOFF_MS: [u64; 2] = [500, 1200];

/// Request-level limits and dispatch settings.
///
/// `Default` reads environment overrides:
/// - VF_MAX_WORDS_PER_REQUEST, VF_MAX_WORDS_PER_WINDOW
/// - VF_RETRY_ATTEMPTS, VF_RETRY_BACKOFF_MS (comma-separated, e.g. "500,1200")
/// - VF_MAX_CONCURRENCY
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_words_per_request: usize,
    pub max_words_per_window: usize,
    pub retry_attempts: u32,
    pub retry_backoff_ms: Vec<u64>,
    /// Chunks in flight at once; 1 dispatches sequentially.
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_words_per_request: env_parse("VF_MAX_WORDS_PER_REQUEST")
                .unwrap_or(MAX_WORDS_PER_REQUEST),
            max_words_per_window: env_parse("VF_MAX_WORDS_PER_WINDOW")
                .unwrap_or(MAX_WORDS_PER_WINDOW),
            retry_attempts: env_parse("VF_RETRY_ATTEMPTS").unwrap_or(RETRY_ATTEMPTS_PER_CHUNK),
            retry_backoff_ms: std::env::var("VF_RETRY_BACKOFF_MS")
                .ok()
                .and_then(|s| parse_backoff_list(&s))
                .unwrap_or_else(|| RETRY_BACKOFF_MS.to_vec()),
            max_concurrency: env_parse("VF_MAX_CONCURRENCY").unwrap_or(1),
        }
    }
}

impl PipelineConfig {
    /// Built-in constants, ignoring the environment.
    pub fn standard() -> Self {
        Self {
            max_words_per_request: MAX_WORDS_PER_REQUEST,
            max_words_per_window: MAX_WORDS_PER_WINDOW,
            retry_attempts: RETRY_ATTEMPTS_PER_CHUNK,
            retry_backoff_ms: RETRY_BACKOFF_MS.to_vec(),
            max_concurrency: 1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_words_per_request == 0 {
            return Err(VfError::invalid(
                "max_words_per_request",
                "must be greater than zero",
            ));
        }
        if self.max_words_per_window == 0 {
            return Err(VfError::invalid(
                "max_words_per_window",
                "must be greater than zero",
            ));
        }
        if self.retry_attempts == 0 {
            return Err(VfError::invalid("retry_attempts", "must be at least 1"));
        }
        if self.max_concurrency == 0 {
            return Err(VfError::invalid("max_concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| s.trim().parse::<T>().ok())
}

/// Parse "500, 1200" into milliseconds. Empty or malformed lists yield `None`.
pub fn parse_backoff_list(s: &str) -> Option<Vec<u64>> {
    let parsed: std::result::Result<Vec<u64>, _> = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse::<u64>)
        .collect();
    parsed.ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_constants() {
        let cfg = PipelineConfig::standard();
        assert_eq!(cfg.max_words_per_request, 5000);
        assert_eq!(cfg.max_words_per_window, 500);
        assert_eq!(cfg.retry_attempts, 3);
        assert_eq!(cfg.retry_backoff_ms, vec![500, 1200]);
        assert_eq!(cfg.max_concurrency, 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_backoff_list() {
        assert_eq!(parse_backoff_list("500,1200"), Some(vec![500, 1200]));
        assert_eq!(parse_backoff_list(" 250 , 750 ,"), Some(vec![250, 750]));
        assert_eq!(parse_backoff_list(""), None);
        assert_eq!(parse_backoff_list("fast,slow"), None);
    }

    #[test]
    fn test_validate_names_offending_field() {
        let cfg = PipelineConfig {
            max_concurrency: 0,
            ..PipelineConfig::standard()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }
}
