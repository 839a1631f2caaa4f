//! Version-counter memoization for derived statistics.
//!
//! The reload dialog recomputes mass/food/visibility readouts every frame
//! unless cached. Instead of one dirty flag per statistic, every mutation
//! of the selection bumps a single version counter and each memoized value
//! remembers the version it was computed at.

use serde::{Deserialize, Serialize};

/// Monotonic counter identifying the current state of the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionVersion(u64);

impl SelectionVersion {
    /// Mark the selection as changed, invalidating every memo computed
    /// against the previous version.
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A derived value tagged with the selection version it was computed at.
#[derive(Debug, Clone, Default)]
pub struct Memo<T> {
    slot: Option<(u64, T)>,
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Return the cached value if it is current, recomputing otherwise.
    pub fn get_or_compute(&mut self, version: SelectionVersion, compute: impl FnOnce() -> T) -> &T {
        let current = version.get();
        match &mut self.slot {
            Some((v, value)) => {
                if *v != current {
                    *v = current;
                    *value = compute();
                }
                value
            }
            slot => {
                let (_, value) = slot.insert((current, compute()));
                value
            }
        }
    }

    /// Drop the cached value regardless of version.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// The cached value, if any, without checking freshness.
    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_version() {
        let version = SelectionVersion::default();
        let mut memo = Memo::new();
        let mut calls = 0;
        let mut get = |memo: &mut Memo<u32>, version| {
            *memo.get_or_compute(version, || {
                calls += 1;
                42
            })
        };
        assert_eq!(get(&mut memo, version), 42);
        assert_eq!(get(&mut memo, version), 42);
        assert_eq!(calls, 1, "second read must hit the cache");
    }

    #[test]
    fn bump_forces_recompute() {
        let mut version = SelectionVersion::default();
        let mut memo = Memo::new();
        memo.get_or_compute(version, || 1);
        version.bump();
        let v = *memo.get_or_compute(version, || 2);
        assert_eq!(v, 2);
    }

    #[test]
    fn invalidate_clears_slot() {
        let version = SelectionVersion::default();
        let mut memo = Memo::new();
        memo.get_or_compute(version, || 7);
        assert_eq!(memo.peek(), Some(&7));
        memo.invalidate();
        assert_eq!(memo.peek(), None);
        let v = *memo.get_or_compute(version, || 9);
        assert_eq!(v, 9, "same version recomputes after invalidate");
    }
}
