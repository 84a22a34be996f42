//! Runtime SIMD tier selection and kernel binding.
//!
//! Selecting a tier happens in two steps. First the tier is translated
//! into an inclusive prefix of [`KernelFlags`]: enabling a tier keeps every
//! lower tier enabled. Then the [`KernelDispatcher`] is asked to rebind,
//! which reads the flags together with the detected CPU features and
//! reports the name of the kernel path it bound.

use super::kernels::{self, DistanceFn};
use crate::config::features::{cpu_features, CpuFeatures};
use crate::core::types::CapabilityTier;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Snapshot of the tier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSet {
    pub avx512: bool,
    pub avx2: bool,
    pub sse4_2: bool,
}

impl FlagSet {
    pub const ALL: FlagSet = FlagSet {
        avx512: true,
        avx2: true,
        sse4_2: true,
    };

    pub const NONE: FlagSet = FlagSet {
        avx512: false,
        avx2: false,
        sse4_2: false,
    };

    /// Inclusive prefix of flags enabled by `tier`.
    pub fn for_tier(tier: CapabilityTier) -> Self {
        match tier {
            CapabilityTier::Auto | CapabilityTier::Avx512 => Self::ALL,
            CapabilityTier::Avx2 => FlagSet {
                avx512: false,
                ..Self::ALL
            },
            CapabilityTier::Sse42 => FlagSet {
                sse4_2: true,
                ..Self::NONE
            },
            CapabilityTier::Generic => Self::NONE,
        }
    }
}

/// Feature flags consulted by the dispatcher when it rebinds kernels.
///
/// All flags start enabled.
#[derive(Debug)]
pub struct KernelFlags {
    avx512: AtomicBool,
    avx2: AtomicBool,
    sse4_2: AtomicBool,
}

impl KernelFlags {
    pub fn new() -> Self {
        Self::from_set(FlagSet::ALL)
    }

    pub fn from_set(set: FlagSet) -> Self {
        Self {
            avx512: AtomicBool::new(set.avx512),
            avx2: AtomicBool::new(set.avx2),
            sse4_2: AtomicBool::new(set.sse4_2),
        }
    }

    pub fn store(&self, set: FlagSet) {
        self.avx512.store(set.avx512, Ordering::Relaxed);
        self.avx2.store(set.avx2, Ordering::Relaxed);
        self.sse4_2.store(set.sse4_2, Ordering::Relaxed);
    }

    pub fn load(&self) -> FlagSet {
        FlagSet {
            avx512: self.avx512.load(Ordering::Relaxed),
            avx2: self.avx2.load(Ordering::Relaxed),
            sse4_2: self.sse4_2.load(Ordering::Relaxed),
        }
    }

    /// Apply the flag prefix for `tier`.
    ///
    /// Only x86 targets have tiered flags; on other architectures this is
    /// a no-op and the dispatcher decides from CPU features alone.
    pub fn apply_tier(&self, tier: CapabilityTier) {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        self.store(FlagSet::for_tier(tier));

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        let _ = tier;
    }
}

impl Default for KernelFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Kernel path a dispatcher can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelPath {
    Avx512,
    Avx2,
    Sse42,
    Neon,
    Generic,
}

impl KernelPath {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Avx512 => "AVX512",
            Self::Avx2 => "AVX2",
            Self::Sse42 => "SSE4_2",
            Self::Neon => "NEON",
            Self::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for KernelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kernel set currently bound by a dispatcher.
#[derive(Clone, Copy)]
pub struct BoundKernels {
    pub path: KernelPath,
    pub l2_sqr: DistanceFn,
    pub inner_product: DistanceFn,
}

impl BoundKernels {
    /// Kernels for a given path.
    ///
    /// There is no 16-lane type in `wide`, so the AVX-512 path runs the
    /// 8-lane kernels.
    pub fn for_path(path: KernelPath) -> Self {
        let (l2_sqr, inner_product): (DistanceFn, DistanceFn) = match path {
            KernelPath::Avx512 | KernelPath::Avx2 => {
                (kernels::l2_sqr_f32x8, kernels::inner_product_f32x8)
            }
            KernelPath::Sse42 | KernelPath::Neon => {
                (kernels::l2_sqr_f32x4, kernels::inner_product_f32x4)
            }
            KernelPath::Generic => (kernels::l2_sqr_scalar, kernels::inner_product_scalar),
        };
        Self {
            path,
            l2_sqr,
            inner_product,
        }
    }

    pub fn name(&self) -> &'static str {
        self.path.name()
    }
}

impl fmt::Debug for BoundKernels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundKernels").field("path", &self.path).finish()
    }
}

/// Collaborator that binds concrete kernels from the tier flags.
pub trait KernelDispatcher: fmt::Debug + Send + Sync {
    /// Inspect `flags`, bind kernels and report the bound path name.
    fn rebind(&self, flags: &KernelFlags) -> String;

    /// Kernels bound by the last rebind.
    fn bound(&self) -> BoundKernels;
}

impl<D: KernelDispatcher + ?Sized> KernelDispatcher for Arc<D> {
    fn rebind(&self, flags: &KernelFlags) -> String {
        (**self).rebind(flags)
    }

    fn bound(&self) -> BoundKernels {
        (**self).bound()
    }
}

/// Default dispatcher: binds the highest path allowed by both the flags
/// and the CPU.
pub struct HookDispatcher {
    cpu: CpuFeatures,
    bound: RwLock<BoundKernels>,
}

impl HookDispatcher {
    /// Create a dispatcher using the detected CPU features.
    pub fn new() -> Self {
        Self::with_cpu_features(*cpu_features())
    }

    /// Create a dispatcher that trusts `cpu` instead of detection.
    pub fn with_cpu_features(cpu: CpuFeatures) -> Self {
        let initial = BoundKernels::for_path(Self::resolve(&cpu, FlagSet::ALL));
        Self {
            cpu,
            bound: RwLock::new(initial),
        }
    }

    pub fn cpu_features(&self) -> &CpuFeatures {
        &self.cpu
    }

    /// Highest path enabled by `flags` that `cpu` can run.
    pub fn resolve(cpu: &CpuFeatures, flags: FlagSet) -> KernelPath {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if flags.avx512 && cpu.avx512f {
                KernelPath::Avx512
            } else if flags.avx2 && cpu.avx2 {
                KernelPath::Avx2
            } else if flags.sse4_2 && cpu.sse42 {
                KernelPath::Sse42
            } else {
                KernelPath::Generic
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            let _ = flags;
            if cpu.neon {
                KernelPath::Neon
            } else {
                KernelPath::Generic
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            let _ = (cpu, flags);
            KernelPath::Generic
        }
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDispatcher")
            .field("cpu", &self.cpu)
            .field("bound", &self.bound.read().path)
            .finish()
    }
}

impl KernelDispatcher for HookDispatcher {
    fn rebind(&self, flags: &KernelFlags) -> String {
        let path = Self::resolve(&self.cpu, flags.load());
        *self.bound.write() = BoundKernels::for_path(path);
        path.name().to_string()
    }

    fn bound(&self) -> BoundKernels {
        *self.bound.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_prefixes() {
        assert_eq!(FlagSet::for_tier(CapabilityTier::Auto), FlagSet::ALL);
        assert_eq!(FlagSet::for_tier(CapabilityTier::Avx512), FlagSet::ALL);
        assert_eq!(
            FlagSet::for_tier(CapabilityTier::Avx2),
            FlagSet {
                avx512: false,
                avx2: true,
                sse4_2: true
            }
        );
        assert_eq!(
            FlagSet::for_tier(CapabilityTier::Sse42),
            FlagSet {
                avx512: false,
                avx2: false,
                sse4_2: true
            }
        );
        assert_eq!(FlagSet::for_tier(CapabilityTier::Generic), FlagSet::NONE);
    }

    #[test]
    fn test_prefix_is_monotonic() {
        // A flag enabled for a tier stays enabled for every higher tier.
        let order = [
            CapabilityTier::Generic,
            CapabilityTier::Sse42,
            CapabilityTier::Avx2,
            CapabilityTier::Avx512,
        ];
        for pair in order.windows(2) {
            let lower = FlagSet::for_tier(pair[0]);
            let higher = FlagSet::for_tier(pair[1]);
            assert!(!lower.sse4_2 || higher.sse4_2);
            assert!(!lower.avx2 || higher.avx2);
            assert!(!lower.avx512 || higher.avx512);
        }
    }

    #[test]
    fn test_flags_start_enabled() {
        assert_eq!(KernelFlags::new().load(), FlagSet::ALL);
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn test_resolve_respects_flags_and_cpu() {
        let all = CpuFeatures::all();
        assert_eq!(HookDispatcher::resolve(&all, FlagSet::ALL), KernelPath::Avx512);
        assert_eq!(
            HookDispatcher::resolve(&all, FlagSet::for_tier(CapabilityTier::Avx2)),
            KernelPath::Avx2
        );
        assert_eq!(
            HookDispatcher::resolve(&all, FlagSet::for_tier(CapabilityTier::Sse42)),
            KernelPath::Sse42
        );
        assert_eq!(HookDispatcher::resolve(&all, FlagSet::NONE), KernelPath::Generic);

        // Flags never enable what the CPU lacks.
        let sse_only = CpuFeatures {
            sse42: true,
            ..CpuFeatures::default()
        };
        assert_eq!(HookDispatcher::resolve(&sse_only, FlagSet::ALL), KernelPath::Sse42);
    }

    #[test]
    fn test_rebind_updates_bound_kernels() {
        let dispatcher = HookDispatcher::with_cpu_features(CpuFeatures::default());
        let flags = KernelFlags::new();

        let name = dispatcher.rebind(&flags);
        assert_eq!(name, "GENERIC");
        assert_eq!(dispatcher.bound().path, KernelPath::Generic);

        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 0.0, 1.0];
        assert_eq!((dispatcher.bound().inner_product)(&a, &b), 4.0);
        assert_eq!((dispatcher.bound().l2_sqr)(&a, &b), 8.0);
    }

    #[test]
    fn test_detected_dispatcher_binds_something() {
        let dispatcher = HookDispatcher::new();
        let name = dispatcher.rebind(&KernelFlags::new());
        assert!(!name.is_empty());
        assert_eq!(name, dispatcher.bound().name());
    }
}
