//! Test doubles for the collaborator traits.
//!
//! These stand in for real kernel libraries and accelerator devices so
//! that the configuration logic can be exercised on any machine.

use crate::compute::cpu::{BoundKernels, FlagSet, KernelDispatcher, KernelFlags, KernelPath};
use crate::core::error::{CapabilityError, Result};
use crate::resources::accelerator::{AcceleratorBackend, DeviceResource};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Resource that tracks how many of its kind are alive.
#[derive(Debug)]
pub struct TrackedResource {
    pub device_id: usize,
    pub serial: usize,
    live: Arc<AtomicUsize>,
}

impl DeviceResource for TrackedResource {}

impl Drop for TrackedResource {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Backend whose resources are counted while alive.
#[derive(Debug, Default)]
pub struct CountingBackend {
    live: Arc<AtomicUsize>,
    created: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter of currently alive resources.
    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }

    fn make(&self, device_id: usize) -> TrackedResource {
        self.live.fetch_add(1, Ordering::SeqCst);
        TrackedResource {
            device_id,
            serial: self.created.fetch_add(1, Ordering::SeqCst),
            live: Arc::clone(&self.live),
        }
    }
}

impl AcceleratorBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    fn create_resource(&self, device_id: usize) -> Result<Box<dyn DeviceResource>> {
        Ok(Box::new(self.make(device_id)))
    }
}

/// Backend that fails after a fixed number of successful creations.
#[derive(Debug)]
pub struct FailingBackend {
    inner: CountingBackend,
    remaining: AtomicUsize,
}

impl FailingBackend {
    pub fn after(successes: usize) -> Self {
        Self {
            inner: CountingBackend::new(),
            remaining: AtomicUsize::new(successes),
        }
    }

    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        self.inner.live_counter()
    }
}

impl AcceleratorBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn create_resource(&self, device_id: usize) -> Result<Box<dyn DeviceResource>> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(CapabilityError::resource_acquisition(
                "accelerator stream",
                "device out of memory",
            ));
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        Ok(Box::new(self.inner.make(device_id)))
    }
}

/// Dispatcher that records every flag set it was asked to bind.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    seen: Mutex<Vec<FlagSet>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<FlagSet> {
        self.seen.lock().clone()
    }

    fn path_for(flags: FlagSet) -> KernelPath {
        if flags.avx512 {
            KernelPath::Avx512
        } else if flags.avx2 {
            KernelPath::Avx2
        } else if flags.sse4_2 {
            KernelPath::Sse42
        } else {
            KernelPath::Generic
        }
    }
}

impl KernelDispatcher for RecordingDispatcher {
    fn rebind(&self, flags: &KernelFlags) -> String {
        let set = flags.load();
        self.seen.lock().push(set);
        Self::path_for(set).name().to_string()
    }

    fn bound(&self) -> BoundKernels {
        let last = self.seen.lock().last().copied().unwrap_or(FlagSet::ALL);
        BoundKernels::for_path(Self::path_for(last))
    }
}
