use rand::Rng;

use crate::utils::{now_ms, to_base36};

/// Source of per-attempt trace ids.
pub trait TraceIdGenerator: Send + Sync {
    fn next_id(&self, engine: &str) -> String;
}

/// `vf_<engine>_<unix ms, base36>_<random, base36>`
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampTraceIds;

impl TraceIdGenerator for TimestampTraceIds {
    fn next_id(&self, engine: &str) -> String {
        let suffix: u64 = rand::thread_rng().gen_range(0..36u64.pow(6));
        format!(
            "vf_{}_{}_{}",
            engine,
            to_base36(now_ms().max(0) as u64),
            to_base36(suffix)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_shape() {
        let id = TimestampTraceIds.next_id("compact");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "vf");
        assert_eq!(parts[1], "compact");
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ids_rarely_collide() {
        let ids: HashSet<String> = (0..200).map(|_| TimestampTraceIds.next_id("x")).collect();
        assert!(ids.len() > 190);
    }
}
