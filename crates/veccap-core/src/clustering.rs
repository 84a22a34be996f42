//! Clustering strategy used for index training.

use crate::core::types::ClusteringStrategy;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::info;

/// Global clustering strategy flag, default [`ClusteringStrategy::KMeans`].
#[derive(Debug)]
pub struct ClusteringSelector {
    strategy: AtomicU8,
}

impl ClusteringSelector {
    pub fn new() -> Self {
        Self {
            strategy: AtomicU8::new(ClusteringStrategy::default() as u8),
        }
    }

    pub fn set(&self, strategy: ClusteringStrategy) {
        info!(strategy = %strategy, "Set clustering_type");
        self.strategy.store(strategy as u8, Ordering::Relaxed);
    }

    /// Set from a host integer; unknown values resolve to k-means.
    ///
    /// The requested value is logged, not the resolved one.
    pub fn set_raw(&self, raw: i32) -> ClusteringStrategy {
        info!(requested = raw, "Set clustering_type");
        let strategy = ClusteringStrategy::from_raw(raw);
        self.strategy.store(strategy as u8, Ordering::Relaxed);
        strategy
    }

    pub fn get(&self) -> ClusteringStrategy {
        ClusteringStrategy::from_u8(self.strategy.load(Ordering::Relaxed))
    }
}

impl Default for ClusteringSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_kmeans() {
        assert_eq!(ClusteringSelector::new().get(), ClusteringStrategy::KMeans);
    }

    #[test]
    fn test_set_and_get() {
        let selector = ClusteringSelector::new();
        selector.set(ClusteringStrategy::KMeansPlusPlus);
        assert_eq!(selector.get(), ClusteringStrategy::KMeansPlusPlus);
        selector.set(ClusteringStrategy::KMeans);
        assert_eq!(selector.get(), ClusteringStrategy::KMeans);
    }

    #[test]
    fn test_out_of_range_resets_to_kmeans() {
        let selector = ClusteringSelector::new();
        selector.set(ClusteringStrategy::KMeansPlusPlus);
        assert_eq!(selector.set_raw(99), ClusteringStrategy::KMeans);
        assert_eq!(selector.get(), ClusteringStrategy::KMeans);
    }

    proptest! {
        #[test]
        fn prop_unknown_raw_values_resolve_to_kmeans(raw in any::<i32>().prop_filter("known", |r| *r != 1)) {
            let selector = ClusteringSelector::new();
            selector.set(ClusteringStrategy::KMeansPlusPlus);
            selector.set_raw(raw);
            prop_assert_eq!(selector.get(), ClusteringStrategy::KMeans);
        }
    }
}
