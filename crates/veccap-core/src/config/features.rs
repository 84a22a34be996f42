//! CPU feature detection and compiled-in subsystem discovery.
//!
//! CPU features are detected once at first use and cached for the rest of
//! the process. The kernel dispatcher combines them with the tier flags to
//! decide which kernels to bind.

use once_cell::sync::Lazy;

/// Available CPU features that can be detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    /// AVX-512 Foundation support (512-bit SIMD)
    pub avx512f: bool,
    /// AVX2 support (256-bit SIMD)
    pub avx2: bool,
    /// SSE4.2 support
    pub sse42: bool,
    /// NEON support (ARM)
    pub neon: bool,
}

impl CpuFeatures {
    /// Detect CPU features at runtime.
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            Self {
                avx512f: is_x86_feature_detected!("avx512f"),
                avx2: is_x86_feature_detected!("avx2"),
                sse42: is_x86_feature_detected!("sse4.2"),
                neon: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self {
                neon: std::arch::is_aarch64_feature_detected!("neon"),
                ..Self::default()
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::default()
        }
    }

    /// Every feature reported as present. Useful for exercising dispatch
    /// decisions independently of the host CPU.
    pub fn all() -> Self {
        Self {
            avx512f: true,
            avx2: true,
            sse42: true,
            neon: true,
        }
    }
}

/// Global CPU features detected at first access.
pub static CPU_FEATURES: Lazy<CpuFeatures> = Lazy::new(CpuFeatures::detect);

/// Get the detected CPU features.
pub fn cpu_features() -> &'static CpuFeatures {
    &CPU_FEATURES
}

/// Optional subsystems compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildFeatures {
    /// Async I/O context pool for disk-resident indexes (`disk-index`).
    pub disk_index: bool,
    /// Accelerator resource manager (`accelerator`).
    pub accelerator: bool,
    /// Accelerator-side clustering memory pool (`accelerator-clustering`).
    pub accelerator_clustering: bool,
    /// CUDA device backend (`cuda`).
    pub cuda: bool,
}

impl BuildFeatures {
    /// Features enabled at compile time.
    pub const fn current() -> Self {
        Self {
            disk_index: cfg!(feature = "disk-index"),
            accelerator: cfg!(feature = "accelerator"),
            accelerator_clustering: cfg!(feature = "accelerator-clustering"),
            cuda: cfg!(feature = "cuda"),
        }
    }
}

/// Features of the running binary.
pub fn build_features() -> BuildFeatures {
    BuildFeatures::current()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_feature_detection() {
        let features = CpuFeatures::detect();
        println!("Detected CPU features: {:?}", features);

        // AVX2 hardware always carries SSE4.2
        if features.avx2 {
            assert!(features.sse42);
        }
    }

    #[test]
    fn test_global_cpu_features() {
        let features1 = cpu_features();
        let features2 = cpu_features();

        assert!(std::ptr::eq(features1, features2));
    }

    #[test]
    fn test_all_and_default_are_opposite() {
        let all = CpuFeatures::all();
        let none = CpuFeatures::default();
        assert!(all.avx512f && all.avx2 && all.sse42 && all.neon);
        assert!(!(none.avx512f || none.avx2 || none.sse42 || none.neon));
    }

    #[test]
    fn test_build_features_match_cfg() {
        let features = build_features();
        assert_eq!(features.disk_index, cfg!(feature = "disk-index"));
        assert_eq!(features.accelerator, cfg!(feature = "accelerator"));
        if features.cuda {
            assert!(features.accelerator);
        }
    }
}
