use crate::planner::planned_capacity;
use crate::set::DirectoryHashSet;

/// Builds [`DirectoryHashSet`]s with service-configured load-factor bounds.
///
/// The factory is constructed once at bootstrap with the deployment's
/// default capacity and load factors; request handlers then call
/// [`create`](Self::create) with the expected element count (a user-count
/// estimate), or zero when no estimate is available.
pub struct DirectoryHashSetFactory {
    default_capacity: usize,
    min_load_factor: f64,
    max_load_factor: f64,
}

impl DirectoryHashSetFactory {
    /// # Panics
    ///
    /// Panics if `default_capacity` is zero or the bounds do not satisfy
    /// `0 < min_load_factor < max_load_factor <= 1`.
    pub fn new(default_capacity: usize, min_load_factor: f64, max_load_factor: f64) -> Self {
        assert!(default_capacity > 0, "default capacity must be positive");
        assert!(
            0.0 < min_load_factor && min_load_factor < max_load_factor && max_load_factor <= 1.0,
            "load factors must satisfy 0 < min < max <= 1"
        );
        Self {
            default_capacity,
            min_load_factor,
            max_load_factor,
        }
    }

    /// Creates a set sized for `requested` elements: `requested /
    /// min_load_factor` slots, or the configured default capacity when
    /// `requested` is zero.
    pub fn create(&self, requested: usize) -> DirectoryHashSet {
        let capacity = match planned_capacity(requested, self.min_load_factor) {
            0 => self.default_capacity,
            planned => planned,
        };
        DirectoryHashSet::new(capacity, self.min_load_factor, self.max_load_factor)
    }
}
