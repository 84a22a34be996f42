//! Accelerator device resource manager.
//!
//! The manager owns one selected device and a fixed number of reusable
//! per-device resources (streams, handles). It follows a guarded state
//! machine:
//!
//! ```text
//! Uninitialized --init_device--> Configured --init--> Ready
//!       ^                                               |
//!       +---------------------- free -------------------+
//! ```
//!
//! `free` is accepted in every state and is a no-op when nothing is held.
//! Initializing twice without an intervening `free` is rejected.

use crate::core::error::{CapabilityError, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Parameters for the per-device resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceParams {
    pub resource_count: usize,
}

impl ResourceParams {
    pub fn new(resource_count: usize) -> Self {
        Self { resource_count }
    }
}

impl TryFrom<i64> for ResourceParams {
    type Error = CapabilityError;

    fn try_from(resource_count: i64) -> Result<Self> {
        usize::try_from(resource_count)
            .map(Self::new)
            .map_err(|_| {
                CapabilityError::invalid_argument(
                    "resource_count",
                    resource_count,
                    "must be non-negative",
                )
            })
    }
}

/// A resource living on an accelerator device.
pub trait DeviceResource: fmt::Debug + Send + Sync {}

/// Device backend able to create resources on a device.
pub trait AcceleratorBackend: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Create one resource on `device_id`.
    fn create_resource(&self, device_id: usize) -> Result<Box<dyn DeviceResource>>;
}

/// Observable state of an accelerator provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceleratorStatus {
    /// No accelerator support compiled in.
    Absent,
    Uninitialized,
    Configured { device_id: usize, resource_count: usize },
    Ready { device_id: usize, resource_count: usize },
}

enum ManagerState {
    Uninitialized,
    Configured {
        device_id: usize,
        params: ResourceParams,
    },
    Ready {
        device_id: usize,
        resources: Vec<Arc<dyn DeviceResource>>,
    },
}

/// Singleton-style manager for accelerator device resources.
pub struct AcceleratorResourceManager {
    backend: Box<dyn AcceleratorBackend>,
    state: Mutex<ManagerState>,
    next: AtomicUsize,
}

impl AcceleratorResourceManager {
    pub fn new(backend: Box<dyn AcceleratorBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(ManagerState::Uninitialized),
            next: AtomicUsize::new(0),
        }
    }

    /// Select the device and record pool parameters.
    pub fn init_device(&self, device_id: usize, params: ResourceParams) -> Result<()> {
        let mut state = self.state.lock();
        if let ManagerState::Ready { device_id: current, .. } = *state {
            return Err(CapabilityError::invalid_state(format!(
                "accelerator resources already initialized on device {}; free them first",
                current
            )));
        }
        debug!(device_id, resource_count = params.resource_count, "Configured accelerator device");
        *state = ManagerState::Configured { device_id, params };
        Ok(())
    }

    /// Create the configured resources.
    ///
    /// If any creation fails, the resources created so far are dropped and
    /// the manager returns to `Uninitialized`.
    pub fn init(&self) -> Result<()> {
        let mut state = self.state.lock();
        let (device_id, params) = match *state {
            ManagerState::Configured { device_id, params } => (device_id, params),
            ManagerState::Uninitialized => {
                return Err(CapabilityError::invalid_state(
                    "accelerator device must be selected before init",
                ))
            }
            ManagerState::Ready { .. } => {
                return Err(CapabilityError::invalid_state(
                    "accelerator resources already initialized",
                ))
            }
        };

        let created: Result<Vec<Arc<dyn DeviceResource>>> = (0..params.resource_count)
            .map(|_| self.backend.create_resource(device_id).map(Arc::from))
            .collect();

        match created {
            Ok(resources) => {
                info!(
                    backend = self.backend.name(),
                    device_id,
                    resource_count = resources.len(),
                    "Initialized accelerator resources"
                );
                self.next.store(0, Ordering::Relaxed);
                *state = ManagerState::Ready {
                    device_id,
                    resources,
                };
                Ok(())
            }
            Err(err) => {
                *state = ManagerState::Uninitialized;
                Err(err)
            }
        }
    }

    /// Release every resource. Safe in any state.
    pub fn free(&self) {
        let mut state = self.state.lock();
        if let ManagerState::Ready { resources, .. } = &*state {
            info!(resource_count = resources.len(), "Free accelerator resources");
        }
        *state = ManagerState::Uninitialized;
    }

    pub fn status(&self) -> AcceleratorStatus {
        match &*self.state.lock() {
            ManagerState::Uninitialized => AcceleratorStatus::Uninitialized,
            ManagerState::Configured { device_id, params } => AcceleratorStatus::Configured {
                device_id: *device_id,
                resource_count: params.resource_count,
            },
            ManagerState::Ready {
                device_id,
                resources,
            } => AcceleratorStatus::Ready {
                device_id: *device_id,
                resource_count: resources.len(),
            },
        }
    }

    /// Run `f` on the next resource, round-robin.
    ///
    /// The manager lock is released before `f` runs, so concurrent callers
    /// work on different resources and `f` may call back into the manager.
    /// A resource freed while `f` holds it is dropped once `f` returns.
    pub fn with_resource<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&dyn DeviceResource) -> R,
    {
        let resource = self.next_resource()?;
        Ok(f(resource.as_ref()))
    }

    fn next_resource(&self) -> Result<Arc<dyn DeviceResource>> {
        match &*self.state.lock() {
            ManagerState::Ready { resources, .. } if !resources.is_empty() => {
                let idx = self.next.fetch_add(1, Ordering::Relaxed) % resources.len();
                Ok(Arc::clone(&resources[idx]))
            }
            _ => Err(CapabilityError::invalid_state(
                "no accelerator resources available",
            )),
        }
    }
}

impl fmt::Debug for AcceleratorResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceleratorResourceManager")
            .field("backend", &self.backend)
            .field("status", &self.status())
            .finish()
    }
}

/// Accelerator-resource collaborator as seen by the configurator.
pub trait AcceleratorProvider: fmt::Debug + Send + Sync {
    /// Select `device_id` and create `resource_count` resources on it.
    fn init_resources(&self, device_id: i64, resource_count: i64) -> Result<()>;

    fn free_resources(&self);

    fn status(&self) -> AcceleratorStatus;

    /// Resource manager, when one exists.
    fn manager(&self) -> Option<&AcceleratorResourceManager> {
        None
    }
}

/// Provider used when no accelerator support is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAccelerator;

impl AcceleratorProvider for NoAccelerator {
    fn init_resources(&self, _device_id: i64, _resource_count: i64) -> Result<()> {
        Ok(())
    }

    fn free_resources(&self) {}

    fn status(&self) -> AcceleratorStatus {
        AcceleratorStatus::Absent
    }
}

impl AcceleratorProvider for AcceleratorResourceManager {
    fn init_resources(&self, device_id: i64, resource_count: i64) -> Result<()> {
        info!(device_id, resource_count, "Init accelerator resources");
        let params = ResourceParams::try_from(resource_count)?;
        let device_id = usize::try_from(device_id).map_err(|_| {
            CapabilityError::invalid_argument("device_id", device_id, "must be non-negative")
        })?;
        self.init_device(device_id, params)?;
        self.init()
    }

    fn free_resources(&self) {
        self.free();
    }

    fn status(&self) -> AcceleratorStatus {
        AcceleratorResourceManager::status(self)
    }

    fn manager(&self) -> Option<&AcceleratorResourceManager> {
        Some(self)
    }
}

/// Backend used by an `accelerator` build without a compiled-in device
/// library.
///
/// Every creation fails, so only zero-resource inits succeed. Hosts with
/// their own device library install a context whose manager wraps their
/// backend; see [`crate::context::install`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundBackend;

impl AcceleratorBackend for UnboundBackend {
    fn name(&self) -> &str {
        "unbound"
    }

    fn create_resource(&self, device_id: usize) -> Result<Box<dyn DeviceResource>> {
        Err(CapabilityError::resource_acquisition(
            format!("accelerator device {}", device_id),
            "no device backend compiled in; install a context with one",
        ))
    }
}

/// Provider selected by the `accelerator` feature.
///
/// The resource manager is used whenever `accelerator` is enabled. Its
/// backend is CUDA with the `cuda` feature and [`UnboundBackend`]
/// otherwise.
pub fn default_provider() -> Box<dyn AcceleratorProvider> {
    #[cfg(feature = "accelerator")]
    {
        Box::new(AcceleratorResourceManager::new(default_backend()))
    }
    #[cfg(not(feature = "accelerator"))]
    {
        Box::new(NoAccelerator)
    }
}

#[cfg(feature = "accelerator")]
fn default_backend() -> Box<dyn AcceleratorBackend> {
    #[cfg(feature = "cuda")]
    {
        Box::new(crate::gpu::cuda::CudaBackend::new())
    }
    #[cfg(not(feature = "cuda"))]
    {
        Box::new(UnboundBackend)
    }
}
