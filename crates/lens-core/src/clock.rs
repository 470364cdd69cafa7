//! Time source abstraction.

use chrono::Utc;

/// Provides the current time in epoch milliseconds.
///
/// Injected wherever ids or timestamps are minted so tests can pin time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
