//! CPU kernel dispatch.

pub mod kernels;
pub mod simd_dispatch;

pub use kernels::DistanceFn;
pub use simd_dispatch::{
    BoundKernels, FlagSet, HookDispatcher, KernelDispatcher, KernelFlags, KernelPath,
};
