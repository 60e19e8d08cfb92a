//! Application-wide loading indicator.
//!
//! Replaces a global "is loading" flag with a shared counter of in-flight
//! catalog fetches. Entering a fetch returns a guard; the fetch counts as
//! in flight until the guard is dropped or cleared, so a request abandoned
//! mid-fetch never leaves the indicator stuck on.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared loading state. Clones observe the same counter.
#[derive(Debug, Clone, Default)]
pub struct LoadingContext {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch as started.
    #[must_use = "the fetch stops counting as in flight when the guard is dropped"]
    pub fn begin(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        LoadingGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Whether any fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    /// Number of fetches in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Holds one unit of the loading counter.
#[derive(Debug)]
pub struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingGuard {
    /// Mark the fetch as finished.
    pub fn clear(self) {
        drop(self);
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_by_default() {
        let loading = LoadingContext::new();
        assert!(!loading.is_loading());
        assert_eq!(loading.in_flight(), 0);
    }

    #[test]
    fn test_guard_sets_and_clear_resets() {
        let loading = LoadingContext::new();
        let guard = loading.begin();
        assert!(loading.is_loading());
        guard.clear();
        assert!(!loading.is_loading());
    }

    #[test]
    fn test_overlapping_fetches_keep_indicator_on() {
        let loading = LoadingContext::new();
        let shared = loading.clone();

        let first = loading.begin();
        let second = shared.begin();
        assert_eq!(loading.in_flight(), 2);

        drop(first);
        assert!(shared.is_loading());
        drop(second);
        assert!(!shared.is_loading());
    }
}
