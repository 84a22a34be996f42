//! Sizing of the accelerator-side memory pool used by clustering.
//!
//! Configuration only: nothing is allocated here, the accelerator
//! clustering path grows its pool lazily within these bounds.

use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initial and maximum pool size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemPoolSize {
    pub init_size: usize,
    pub max_size: usize,
}

/// Accelerator-clustering collaborator.
pub trait MemPoolProvider: fmt::Debug + Send + Sync {
    fn set_pool_size(&self, init_size: usize, max_size: usize);

    /// Sizes last configured, if this provider keeps any.
    fn pool_size(&self) -> Option<MemPoolSize>;
}

/// Provider used when accelerator clustering is not compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemPool;

impl MemPoolProvider for NoMemPool {
    fn set_pool_size(&self, _init_size: usize, _max_size: usize) {}

    fn pool_size(&self) -> Option<MemPoolSize> {
        None
    }
}

/// Stored pool sizing. `init_size > max_size` is stored as given.
#[derive(Debug, Default)]
pub struct AcceleratorMemPool {
    size: Mutex<Option<MemPoolSize>>,
}

impl AcceleratorMemPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemPoolProvider for AcceleratorMemPool {
    fn set_pool_size(&self, init_size: usize, max_size: usize) {
        info!(init_size, max_size, "Set accelerator memory pool size");
        if init_size > max_size {
            debug!(init_size, max_size, "Memory pool initial size exceeds its maximum");
        }
        *self.size.lock() = Some(MemPoolSize {
            init_size,
            max_size,
        });
    }

    fn pool_size(&self) -> Option<MemPoolSize> {
        *self.size.lock()
    }
}

/// Provider selected by the `accelerator-clustering` feature.
pub fn default_provider() -> Box<dyn MemPoolProvider> {
    #[cfg(feature = "accelerator-clustering")]
    {
        Box::new(AcceleratorMemPool::new())
    }
    #[cfg(not(feature = "accelerator-clustering"))]
    {
        Box::new(NoMemPool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_is_stored() {
        let pool = AcceleratorMemPool::new();
        assert_eq!(pool.pool_size(), None);

        pool.set_pool_size(1 << 20, 1 << 30);
        assert_eq!(
            pool.pool_size(),
            Some(MemPoolSize {
                init_size: 1 << 20,
                max_size: 1 << 30
            })
        );
    }

    #[test]
    fn test_init_above_max_is_accepted() {
        // No validation at this layer; the collaborator decides.
        let pool = AcceleratorMemPool::new();
        pool.set_pool_size(4096, 1024);
        assert_eq!(
            pool.pool_size(),
            Some(MemPoolSize {
                init_size: 4096,
                max_size: 1024
            })
        );
    }

    #[test]
    fn test_absent_provider_keeps_nothing() {
        let pool = NoMemPool;
        pool.set_pool_size(1, 2);
        assert_eq!(pool.pool_size(), None);
    }
}
