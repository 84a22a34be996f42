//! Async I/O context pool for disk-resident indexes.
//!
//! The disk engine submits reads through a bounded set of I/O contexts.
//! Each context accepts at most `max_events_per_context` in-flight events.
//! Contexts are leased from the pool and returned automatically when the
//! lease is dropped.

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Maximum in-flight events per context.
pub const DEFAULT_MAX_EVENTS: usize = 32;

/// A single I/O submission context.
#[derive(Debug, PartialEq, Eq)]
pub struct AioContext {
    id: usize,
    max_events: usize,
}

impl AioContext {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }
}

#[derive(Debug)]
struct PoolInner {
    idle: Mutex<Vec<AioContext>>,
    returned: Condvar,
    size: usize,
    max_events_per_ctx: usize,
}

/// Bounded pool of [`AioContext`]s.
#[derive(Debug, Clone)]
pub struct AioContextPool {
    inner: Arc<PoolInner>,
}

impl AioContextPool {
    /// Create a pool of `num_contexts` contexts.
    pub fn new(num_contexts: usize, max_events_per_ctx: usize) -> Self {
        let idle = (0..num_contexts)
            .map(|id| AioContext {
                id,
                max_events: max_events_per_ctx,
            })
            .collect();
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(idle),
                returned: Condvar::new(),
                size: num_contexts,
                max_events_per_ctx,
            }),
        }
    }

    /// Total number of contexts owned by the pool.
    pub fn size(&self) -> usize {
        self.inner.size
    }

    pub fn max_events_per_ctx(&self) -> usize {
        self.inner.max_events_per_ctx
    }

    /// Number of contexts not currently leased.
    pub fn available(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Lease a context, blocking until one is returned if none is idle.
    ///
    /// Blocks forever on an empty pool.
    pub fn acquire(&self) -> AioLease {
        let mut idle = self.inner.idle.lock();
        loop {
            if let Some(ctx) = idle.pop() {
                return self.lease(ctx);
            }
            self.inner.returned.wait(&mut idle);
        }
    }

    /// Lease a context if one is idle.
    pub fn try_acquire(&self) -> Option<AioLease> {
        let ctx = self.inner.idle.lock().pop()?;
        Some(self.lease(ctx))
    }

    fn lease(&self, ctx: AioContext) -> AioLease {
        AioLease {
            ctx: Some(ctx),
            pool: self.clone(),
        }
    }

    fn release(&self, ctx: AioContext) {
        self.inner.idle.lock().push(ctx);
        self.inner.returned.notify_one();
    }
}

/// A context borrowed from the pool; returned when dropped.
pub struct AioLease {
    ctx: Option<AioContext>,
    pool: AioContextPool,
}

impl Deref for AioLease {
    type Target = AioContext;

    fn deref(&self) -> &Self::Target {
        // Only `Drop` takes the context out.
        match &self.ctx {
            Some(ctx) => ctx,
            None => unreachable!("context accessed after release"),
        }
    }
}

impl fmt::Debug for AioLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AioLease").field("ctx", &self.ctx).finish()
    }
}

impl Drop for AioLease {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}

/// Disk-engine collaborator owning the process-wide context pool.
pub trait AsyncIoProvider: fmt::Debug + Send + Sync {
    /// Create the pool. Returns the collaborator's success flag.
    fn init_pool(&self, num_contexts: usize, max_events_per_ctx: usize) -> bool;

    /// The pool, if this provider has one.
    fn pool(&self) -> Option<AioContextPool>;

    /// Whether this provider is backed by a real pool.
    fn is_present(&self) -> bool;
}

/// Provider used when the disk engine is not compiled in.
///
/// Every init succeeds and no pool is ever created.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAsyncIo;

impl AsyncIoProvider for NoAsyncIo {
    fn init_pool(&self, _num_contexts: usize, _max_events_per_ctx: usize) -> bool {
        true
    }

    fn pool(&self) -> Option<AioContextPool> {
        None
    }

    fn is_present(&self) -> bool {
        false
    }
}

/// Provider holding a single lazily-created [`AioContextPool`].
///
/// The first successful init fixes the pool; later inits keep it and
/// succeed. Asking for the pool before any init creates one with one
/// context per CPU.
#[derive(Debug, Default)]
pub struct AioPoolProvider {
    pool: OnceCell<AioContextPool>,
}

impl AioPoolProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AsyncIoProvider for AioPoolProvider {
    fn init_pool(&self, num_contexts: usize, max_events_per_ctx: usize) -> bool {
        if num_contexts == 0 {
            error!("Async I/O context pool size must be greater than 0");
            return false;
        }

        let mut created = false;
        let pool = self.pool.get_or_init(|| {
            created = true;
            AioContextPool::new(num_contexts, max_events_per_ctx)
        });

        if created {
            info!(
                num_contexts,
                max_events_per_ctx, "Initialized global async I/O context pool"
            );
        } else {
            warn!(
                num_contexts = pool.size(),
                max_events_per_ctx = pool.max_events_per_ctx(),
                "Global async I/O context pool has already been initialized"
            );
        }
        true
    }

    fn pool(&self) -> Option<AioContextPool> {
        let pool = self.pool.get_or_init(|| {
            let num_contexts = num_cpus::get();
            warn!(
                num_contexts,
                "Global async I/O context pool was not initialized, using one context per CPU"
            );
            AioContextPool::new(num_contexts, DEFAULT_MAX_EVENTS)
        });
        Some(pool.clone())
    }

    fn is_present(&self) -> bool {
        true
    }
}

/// Provider selected by the `disk-index` feature.
pub fn default_provider() -> Box<dyn AsyncIoProvider> {
    #[cfg(feature = "disk-index")]
    {
        Box::new(AioPoolProvider::new())
    }
    #[cfg(not(feature = "disk-index"))]
    {
        Box::new(NoAsyncIo)
    }
}
