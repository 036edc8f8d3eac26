//! Process-wide call statistics

use std::sync::atomic::{AtomicUsize, Ordering};

static CALLS_MADE: AtomicUsize = AtomicUsize::new(0);
static INVOCATION_ERRORS: AtomicUsize = AtomicUsize::new(0);
static CONVERSION_ERRORS: AtomicUsize = AtomicUsize::new(0);

/// Call statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallStats {
    /// Events dispatched to a script resource
    pub calls_made: usize,
    pub invocation_errors: usize,
    pub conversion_errors: usize,
}

/// Snapshot of the counters
pub fn stats() -> CallStats {
    CallStats {
        calls_made: CALLS_MADE.load(Ordering::Relaxed),
        invocation_errors: INVOCATION_ERRORS.load(Ordering::Relaxed),
        conversion_errors: CONVERSION_ERRORS.load(Ordering::Relaxed),
    }
}

#[inline]
pub(crate) fn record_call() {
    CALLS_MADE.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_invocation_error() {
    INVOCATION_ERRORS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_conversion_error() {
    CONVERSION_ERRORS.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increase() {
        let before = stats();
        record_call();
        record_invocation_error();
        record_conversion_error();
        let after = stats();

        assert!(after.calls_made > before.calls_made);
        assert!(after.invocation_errors > before.invocation_errors);
        assert!(after.conversion_errors > before.conversion_errors);
    }
}
