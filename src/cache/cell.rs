//! Single-slot cache cell with a fixed TTL and manual invalidation
//!
//! Provides a generic `CacheCell` holding exactly one value together with its
//! creation instant and an advisory invalidation flag. Refreshing cached data
//! means constructing a new cell and replacing the old one; a cell's value is
//! never mutated in place.

use std::time::{Duration, Instant};

/// How long a cached value is considered fresh
pub const CACHE_TTL: Duration = Duration::from_millis(240_000);

/// A single cached value plus the bookkeeping needed to decide freshness
///
/// The cell owns its value exclusively once constructed. Apart from the
/// invalidation flag it is immutable: callers that want a newer value build a
/// replacement cell rather than writing through this one. The cell performs
/// no locking of its own; the owning accessor is responsible for guarding
/// concurrent access.
#[derive(Debug)]
pub struct CacheCell<T> {
    /// The cached value
    value: T,
    /// When the value was cached
    created_at: Instant,
    /// Advisory flag forcing the next freshness check to report expiry
    invalidated: bool,
}

impl<T> CacheCell<T> {
    /// Wraps `value` in a fresh cell stamped with the current instant
    ///
    /// The invalidation flag starts cleared, so a cell built by a refresh
    /// never inherits an invalidation requested against its predecessor.
    pub fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            invalidated: false,
        }
    }

    /// Returns a shared reference to the cached value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Reports whether the cached value should be refreshed
    ///
    /// True once the cell has been manually invalidated or the TTL has fully
    /// elapsed since construction. Checking has no side effects.
    pub fn is_expired(&self) -> bool {
        self.invalidated || self.created_at.elapsed() >= CACHE_TTL
    }

    /// Sets or clears the manual-invalidation flag
    ///
    /// Purely advisory: the cached value itself is untouched either way.
    pub fn set_invalidated(&mut self, invalidated: bool) {
        self.invalidated = invalidated;
    }

    /// Rewinds the creation instant, simulating the passage of time
    #[cfg(test)]
    pub fn backdate(&mut self, by: Duration) {
        self.created_at -= by;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_fresh() {
        let cell = CacheCell::new("delays");
        assert!(!cell.is_expired(), "Freshly built cell should not be expired");
        assert_eq!(*cell.value(), "delays");
    }

    #[test]
    fn test_cell_expires_after_ttl() {
        let mut cell = CacheCell::new(42);
        cell.backdate(CACHE_TTL);
        assert!(cell.is_expired(), "Cell should expire once the TTL has elapsed");
    }

    #[test]
    fn test_cell_is_fresh_just_inside_ttl() {
        let mut cell = CacheCell::new(42);
        cell.backdate(CACHE_TTL - Duration::from_secs(1));
        assert!(!cell.is_expired(), "Cell should stay fresh inside the TTL window");
    }

    #[test]
    fn test_manual_invalidation_expires_immediately() {
        let mut cell = CacheCell::new(String::from("notice"));
        cell.set_invalidated(true);
        assert!(cell.is_expired(), "Invalidated cell should report expired regardless of age");

        // Clearing the flag restores freshness-based expiry
        cell.set_invalidated(false);
        assert!(!cell.is_expired());
    }

    #[test]
    fn test_invalidation_leaves_value_untouched() {
        let mut cell = CacheCell::new(vec![1, 2, 3]);
        cell.set_invalidated(true);
        assert_eq!(*cell.value(), vec![1, 2, 3]);
    }

    #[test]
    fn test_replacement_cell_starts_with_flag_cleared() {
        let mut old = CacheCell::new(1);
        old.set_invalidated(true);

        // A refresh constructs a new cell; it must not inherit the flag
        let replacement = CacheCell::new(2);
        assert!(!replacement.is_expired());
        assert_eq!(*replacement.value(), 2);
    }
}
