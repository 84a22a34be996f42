//! Process-wide execution resources.
//!
//! Each optional subsystem is reached through a provider trait with a
//! present and an absent implementation. The absent implementations turn
//! every call into a successful no-op; cargo features decide which one a
//! context uses by default.

pub mod accelerator;
pub mod aio;
pub mod mem_pool;
pub mod thread_pool;

pub use accelerator::{
    AcceleratorBackend, AcceleratorProvider, AcceleratorResourceManager, AcceleratorStatus,
    DeviceResource, NoAccelerator, ResourceParams, UnboundBackend,
};
pub use aio::{
    AioContext, AioContextPool, AioLease, AioPoolProvider, AsyncIoProvider, NoAsyncIo,
    DEFAULT_MAX_EVENTS,
};
pub use mem_pool::{AcceleratorMemPool, MemPoolProvider, MemPoolSize, NoMemPool};
pub use thread_pool::{PoolKind, ThreadPoolRegistry};
