//! SIMD tier selection and the kernels it binds.

use parking_lot::Mutex;
use std::sync::Arc;
use veccap_core::compute::cpu::kernels;
use veccap_core::prelude::*;

/// Dispatcher that always reports a fixed path and records the flags.
#[derive(Debug, Default)]
struct FixedDispatcher {
    seen: Mutex<Vec<FlagSet>>,
}

impl KernelDispatcher for FixedDispatcher {
    fn rebind(&self, flags: &KernelFlags) -> String {
        self.seen.lock().push(flags.load());
        "FIXED".to_string()
    }

    fn bound(&self) -> BoundKernels {
        BoundKernels::for_path(KernelPath::Generic)
    }
}

fn test_vectors(len: usize) -> (Vec<f32>, Vec<f32>) {
    let a = (0..len).map(|i| (i as f32 * 0.37).sin()).collect();
    let b = (0..len).map(|i| (i as f32 * 0.11).cos()).collect();
    (a, b)
}

#[test]
fn test_dispatcher_report_is_returned_verbatim() {
    let dispatcher = Arc::new(FixedDispatcher::default());
    let ctx = RuntimeCapabilityContext::builder()
        .dispatcher(Box::new(Arc::clone(&dispatcher)))
        .build();

    assert_eq!(ctx.select_simd_tier(CapabilityTier::Avx2), "FIXED");
    assert_eq!(ctx.select_simd_tier(CapabilityTier::Generic), "FIXED");

    let seen = dispatcher.seen.lock().clone();
    assert_eq!(seen.len(), 2);
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        assert_eq!(seen[0], FlagSet::for_tier(CapabilityTier::Avx2));
        assert_eq!(seen[1], FlagSet::NONE);
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    assert!(seen.iter().all(|flags| *flags == FlagSet::ALL));
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[test]
fn test_tier_prefix_on_capable_cpu() {
    let ctx = RuntimeCapabilityContext::builder()
        .dispatcher(Box::new(HookDispatcher::with_cpu_features(CpuFeatures::all())))
        .build();

    let cases = [
        (CapabilityTier::Avx512, "AVX512"),
        (CapabilityTier::Avx2, "AVX2"),
        (CapabilityTier::Sse42, "SSE4_2"),
        (CapabilityTier::Generic, "GENERIC"),
        (CapabilityTier::Auto, "AVX512"),
    ];
    for (tier, expected) in cases {
        assert_eq!(ctx.select_simd_tier(tier), expected, "tier {}", tier);
        assert_eq!(ctx.kernel_flags(), FlagSet::for_tier(tier));
    }
}

#[test]
fn test_unknown_raw_tier_is_ignored() {
    let ctx = RuntimeCapabilityContext::new();
    let before = ctx.select_simd_tier(CapabilityTier::Generic);
    let flags = ctx.kernel_flags();

    for raw in [-1, 5, i32::MAX] {
        assert_eq!(ctx.select_simd_tier_raw(raw), before);
        assert_eq!(ctx.kernel_flags(), flags);
    }
}

#[test]
fn test_every_tier_binds_correct_kernels() {
    let ctx = RuntimeCapabilityContext::new();
    let (a, b) = test_vectors(133);
    let expected_l2 = kernels::l2_sqr_scalar(&a, &b);
    let expected_ip = kernels::inner_product_scalar(&a, &b);

    for tier in CapabilityTier::ALL {
        let name = ctx.select_simd_tier(tier);
        let bound = ctx.kernels();
        assert_eq!(bound.name(), name);

        let l2 = (bound.l2_sqr)(&a, &b);
        let ip = (bound.inner_product)(&a, &b);
        assert!((l2 - expected_l2).abs() <= 1e-3 * expected_l2.abs().max(1.0));
        assert!((ip - expected_ip).abs() <= 1e-3 * expected_ip.abs().max(1.0));
    }
}

#[test]
fn test_detected_features_bound_the_path() {
    let features = cpu_features();
    let ctx = RuntimeCapabilityContext::new();
    let path = ctx.kernels().path;

    match path {
        KernelPath::Avx512 => assert!(features.avx512f),
        KernelPath::Avx2 => assert!(features.avx2),
        KernelPath::Sse42 => assert!(features.sse42),
        KernelPath::Neon => assert!(features.neon),
        KernelPath::Generic => {}
    }
}
