//! Global worker pools for index building and searching.
//!
//! Each pool's size can be set once; the pool itself is built on first
//! use. If the host never sets a size, the pool gets one thread per CPU.

use crate::core::error::{CapabilityError, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which global pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Build,
    Search,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct PoolSlot {
    kind: PoolKind,
    /// 0 until configured
    size: Mutex<usize>,
    pool: OnceCell<Arc<ThreadPool>>,
}

impl PoolSlot {
    fn new(kind: PoolKind) -> Self {
        Self {
            kind,
            size: Mutex::new(0),
            pool: OnceCell::new(),
        }
    }

    fn init(&self, num_threads: usize) -> usize {
        let mut size = self.size.lock();
        if num_threads == 0 {
            error!(pool = %self.kind, "Thread pool size must be greater than 0");
            return *size;
        }
        if *size == 0 {
            *size = num_threads;
            info!(pool = %self.kind, num_threads, "Initialized global thread pool size");
        } else {
            warn!(
                pool = %self.kind,
                num_threads = *size,
                "Global thread pool has already been initialized"
            );
        }
        *size
    }

    fn configured_size(&self) -> usize {
        *self.size.lock()
    }

    fn get(&self) -> Result<Arc<ThreadPool>> {
        self.pool
            .get_or_try_init(|| {
                let num_threads = {
                    let mut size = self.size.lock();
                    if *size == 0 {
                        *size = num_cpus::get();
                        warn!(
                            pool = %self.kind,
                            num_threads = *size,
                            "Global thread pool has not been initialized yet, using one thread per CPU"
                        );
                    }
                    *size
                };

                let kind = self.kind;
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .thread_name(move |i| format!("veccap-{}-{}", kind, i))
                    .build()
                    .map(Arc::new)
                    .map_err(|e| {
                        CapabilityError::resource_acquisition(format!("{} thread pool", kind), e)
                    })
            })
            .map(Arc::clone)
    }
}

/// Build and search pools of one context.
pub struct ThreadPoolRegistry {
    build: PoolSlot,
    search: PoolSlot,
}

impl ThreadPoolRegistry {
    pub fn new() -> Self {
        Self {
            build: PoolSlot::new(PoolKind::Build),
            search: PoolSlot::new(PoolKind::Search),
        }
    }

    fn slot(&self, kind: PoolKind) -> &PoolSlot {
        match kind {
            PoolKind::Build => &self.build,
            PoolKind::Search => &self.search,
        }
    }

    /// Set the pool size if it is still unset.
    ///
    /// Returns the size in effect afterwards (0 when still unset).
    pub fn init(&self, kind: PoolKind, num_threads: usize) -> usize {
        self.slot(kind).init(num_threads)
    }

    /// Size recorded for `kind`, 0 when unset.
    pub fn configured_size(&self, kind: PoolKind) -> usize {
        self.slot(kind).configured_size()
    }

    /// The pool for `kind`, built on first call.
    pub fn get(&self, kind: PoolKind) -> Result<Arc<ThreadPool>> {
        self.slot(kind).get()
    }
}

impl Default for ThreadPoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ThreadPoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolRegistry")
            .field("build", &self.build.configured_size())
            .field("search", &self.search.configured_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_set_once() {
        let registry = ThreadPoolRegistry::new();
        assert_eq!(registry.configured_size(PoolKind::Build), 0);
        assert_eq!(registry.init(PoolKind::Build, 3), 3);
        assert_eq!(registry.init(PoolKind::Build, 8), 3);
        // Pools are independent.
        assert_eq!(registry.configured_size(PoolKind::Search), 0);
    }

    #[test]
    fn test_zero_is_ignored() {
        let registry = ThreadPoolRegistry::new();
        assert_eq!(registry.init(PoolKind::Search, 0), 0);
        assert_eq!(registry.init(PoolKind::Search, 2), 2);
        assert_eq!(registry.init(PoolKind::Search, 0), 2);
    }

    #[test]
    fn test_pool_uses_configured_size() {
        let registry = ThreadPoolRegistry::new();
        registry.init(PoolKind::Search, 2);

        let pool = registry.get(PoolKind::Search).unwrap();
        assert_eq!(pool.current_num_threads(), 2);

        let name = pool.install(|| std::thread::current().name().map(str::to_owned));
        assert_eq!(name.as_deref().map(|n| n.starts_with("veccap-search-")), Some(true));

        // Same pool on every call.
        let again = registry.get(PoolKind::Search).unwrap();
        assert!(Arc::ptr_eq(&pool, &again));
    }

    #[test]
    fn test_lazy_pool_defaults_to_cpu_count() {
        let registry = ThreadPoolRegistry::new();
        let pool = registry.get(PoolKind::Build).unwrap();
        assert_eq!(pool.current_num_threads(), num_cpus::get());
        assert_eq!(registry.configured_size(PoolKind::Build), num_cpus::get());
    }
}
