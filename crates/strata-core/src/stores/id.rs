//! Document id generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock nanoseconds.
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// Issues strictly increasing numeric ids derived from the clock.
///
/// Ids fit in an `i64` so backends with integer primary keys accept them.
/// When the clock repeats or steps backwards the previous id plus one is used.
pub struct TimestampIdGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicU64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicU64::new(0),
        }
    }

    /// Next id as a number.
    pub fn next_id(&self) -> u64 {
        let now = self.clock.now_nanos().min(i64::MAX as u64);
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    /// Next id in string form.
    pub fn next(&self) -> String {
        self.next_id().to_string()
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FrozenClock(u64);

    impl Clock for FrozenClock {
        fn now_nanos(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_ids_increase_with_frozen_clock() {
        let ids = TimestampIdGenerator::with_clock(Arc::new(FrozenClock(1_000)));
        assert_eq!(ids.next_id(), 1_000);
        assert_eq!(ids.next_id(), 1_001);
        assert_eq!(ids.next_id(), 1_002);
    }

    #[test]
    fn test_system_clock_ids_are_monotonic() {
        let ids = TimestampIdGenerator::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert!(second > first);
        assert!(first <= i64::MAX as u64);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(TimestampIdGenerator::with_clock(Arc::new(FrozenClock(42))));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || (0..500).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4_000);
    }
}
