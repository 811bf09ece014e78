//! Shared building blocks for derived views over mutable backing state.
//!
//! `Memo` is the memoization cell every lazily derived accessor (fills, text
//! frames, geometry) is built on; `RemovalFlag` is the token a shape node
//! shares with the views derived from it, so a view can refuse mutation after
//! its owner is removed without holding a reference back into the tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// An invalidatable memoization cell.
///
/// Holds either nothing or a computed value. Between two `reset` calls the
/// compute closure runs at most once, no matter how often the cell is read.
/// The cell never invalidates itself; the owning entity must call `reset` at
/// every mutation site that structurally replaces the backing data.
#[derive(Debug)]
pub struct Memo<T> {
    value: Option<T>,
}

impl<T> Memo<T> {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Get the cached value, if one has been computed since the last reset.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Get mutable access to the cached value.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Get the cached value, computing and caching it on first access.
    pub fn get_or_insert_with<F: FnOnce() -> T>(&mut self, compute: F) -> &T {
        if self.value.is_none() {
            self.value = Some(compute());
        }
        // Safe to unwrap since the slot was just filled
        self.value.as_ref().unwrap()
    }

    /// Fallible variant of [`Memo::get_or_insert_with`].
    ///
    /// A failed compute leaves the cell empty, so the next read retries.
    pub fn try_get_or_insert_with<E, F: FnOnce() -> Result<T, E>>(
        &mut self,
        compute: F,
    ) -> Result<&T, E> {
        if self.value.is_none() {
            self.value = Some(compute()?);
        }
        // Safe to unwrap since the slot was just filled
        Ok(self.value.as_ref().unwrap())
    }

    /// Clear the cache; the next read recomputes.
    #[inline]
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Check whether a value is currently cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared removal token of a shape node.
///
/// Cloned into every view derived from the node (images, fills). The node
/// marks the flag when it is removed from its tree; views observe the flag at
/// the entry of every operation whose result depends on live backing storage.
/// The atomic serves as a shared cell only; the object model is
/// single-threaded by contract.
#[derive(Debug, Clone, Default)]
pub struct RemovalFlag(Arc<AtomicBool>);

impl RemovalFlag {
    /// Create a flag in the live state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the owning entity as removed. Removal is permanent.
    #[inline]
    pub fn mark_removed(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether the owning entity has been removed.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_computes_at_most_once_between_resets() {
        let mut memo = Memo::new();
        let mut calls = 0;

        let first = *memo.get_or_insert_with(|| {
            calls += 1;
            41
        });
        let second = *memo.get_or_insert_with(|| {
            calls += 1;
            99
        });

        assert_eq!(first, 41);
        assert_eq!(second, 41);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_memo_reset_recomputes_exactly_once() {
        let mut memo = Memo::new();
        let mut calls = 0;
        memo.get_or_insert_with(|| {
            calls += 1;
            1
        });

        memo.reset();
        assert!(!memo.is_cached());

        let value = *memo.get_or_insert_with(|| {
            calls += 1;
            2
        });
        let again = *memo.get_or_insert_with(|| {
            calls += 1;
            3
        });
        assert_eq!(value, 2);
        assert_eq!(again, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_memo_failed_compute_leaves_cell_empty() {
        let mut memo: Memo<u32> = Memo::new();
        let failed: Result<&u32, &str> = memo.try_get_or_insert_with(|| Err("nope"));
        assert!(failed.is_err());
        assert!(!memo.is_cached());

        let ok: Result<&u32, &str> = memo.try_get_or_insert_with(|| Ok(7));
        assert_eq!(ok.unwrap(), &7);
    }

    #[test]
    fn test_removal_flag_is_shared() {
        let flag = RemovalFlag::new();
        let view = flag.clone();
        assert!(!view.is_removed());

        flag.mark_removed();
        assert!(view.is_removed());
    }
}
