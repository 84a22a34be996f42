//! Enumerations shared across the configuration API.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SIMD capability tier requested for the distance kernels.
///
/// Ordered by descending hardware requirement. On x86 targets the tiers
/// map to AVX-512, AVX2 and SSE4.2; elsewhere only `Auto` and `Generic`
/// are meaningful and the mapping step is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CapabilityTier {
    /// Use the best tier the hardware supports.
    Auto,
    /// AVX-512 and everything below it.
    Avx512,
    /// AVX2 and SSE4.2.
    Avx2,
    /// SSE4.2 only.
    #[cfg_attr(feature = "serde", serde(rename = "SSE4_2"))]
    Sse42,
    /// Scalar kernels.
    Generic,
}

impl CapabilityTier {
    /// All tiers, highest requirement first.
    pub const ALL: [CapabilityTier; 5] = [
        Self::Auto,
        Self::Avx512,
        Self::Avx2,
        Self::Sse42,
        Self::Generic,
    ];

    /// Map a host integer (`0..=4`) to a tier.
    ///
    /// Unknown values return `None`; callers treat that as "leave the
    /// flags alone".
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Auto),
            1 => Some(Self::Avx512),
            2 => Some(Self::Avx2),
            3 => Some(Self::Sse42),
            4 => Some(Self::Generic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Avx512 => "AVX512",
            Self::Avx2 => "AVX2",
            Self::Sse42 => "SSE4_2",
            Self::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clustering variant used when training index centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[repr(u8)]
pub enum ClusteringStrategy {
    /// Plain k-means with random seeding.
    #[default]
    KMeans = 0,
    /// k-means++ seeding.
    KMeansPlusPlus = 1,
}

impl ClusteringStrategy {
    /// Map a host integer to a strategy.
    ///
    /// Anything other than `1` resolves to [`ClusteringStrategy::KMeans`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::KMeansPlusPlus,
            // Fail-open: unknown values fall back to plain k-means.
            _ => Self::KMeans,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        Self::from_raw(i32::from(raw))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KMeans => "K_MEANS",
            Self::KMeansPlusPlus => "K_MEANS_PLUS_PLUS",
        }
    }
}

impl fmt::Display for ClusteringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_raw() {
        for (raw, tier) in CapabilityTier::ALL.iter().enumerate() {
            assert_eq!(CapabilityTier::from_raw(raw as i32), Some(*tier));
        }
        assert_eq!(CapabilityTier::from_raw(-1), None);
        assert_eq!(CapabilityTier::from_raw(5), None);
    }

    #[test]
    fn test_clustering_from_raw_defaults_to_kmeans() {
        assert_eq!(ClusteringStrategy::from_raw(0), ClusteringStrategy::KMeans);
        assert_eq!(
            ClusteringStrategy::from_raw(1),
            ClusteringStrategy::KMeansPlusPlus
        );
        assert_eq!(ClusteringStrategy::from_raw(42), ClusteringStrategy::KMeans);
        assert_eq!(ClusteringStrategy::from_raw(-7), ClusteringStrategy::KMeans);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CapabilityTier::Sse42), "SSE4_2");
        assert_eq!(
            format!("{}", ClusteringStrategy::KMeansPlusPlus),
            "K_MEANS_PLUS_PLUS"
        );
    }
}
