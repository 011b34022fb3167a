//! Importance to lifetime mapping for short-term items.

use std::time::Duration;

use crate::config::TierConfig;

/// Linear map from an importance score onto `[min_ttl, max_ttl]`.
///
/// Higher scores live longer. Only scores below the importance threshold
/// ever reach this policy, so `max_ttl` is approached but not used by
/// placement itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    min_secs: u64,
    max_secs: u64,
}

impl TtlPolicy {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Lifetime in whole seconds for a score in `[0, 100]`.
    pub fn ttl_secs(&self, score: f64) -> u64 {
        let span = self.max_secs.saturating_sub(self.min_secs) as f64;
        let fraction = score.clamp(0.0, 100.0) / 100.0;
        let ttl = (self.min_secs as f64 + span * fraction).round() as u64;
        ttl.clamp(self.min_secs, self.max_secs)
    }

    pub fn ttl(&self, score: f64) -> Duration {
        Duration::from_secs(self.ttl_secs(score))
    }
}

impl From<&TierConfig> for TtlPolicy {
    fn from(config: &TierConfig) -> Self {
        Self::new(config.min_ttl_secs, config.max_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let policy = TtlPolicy::from(&TierConfig::default());
        assert_eq!(policy.ttl_secs(0.0), 10);
        assert_eq!(policy.ttl_secs(20.0), 20);
        assert_eq!(policy.ttl_secs(50.0), 35);
        assert_eq!(policy.ttl_secs(100.0), 60);
    }

    #[test]
    fn test_monotonic_over_score_range() {
        let policy = TtlPolicy::new(10, 60);
        let mut previous = 0;
        for score in 0..=100 {
            let ttl = policy.ttl_secs(score as f64);
            assert!(ttl >= previous, "ttl dropped at score {score}");
            assert!((10..=60).contains(&ttl));
            previous = ttl;
        }
    }

    #[test]
    fn test_equal_bounds() {
        let policy = TtlPolicy::new(30, 30);
        assert_eq!(policy.ttl_secs(0.0), 30);
        assert_eq!(policy.ttl_secs(69.9), 30);
    }
}
