//! Replacing the global context with host-supplied collaborators.
//!
//! The install has to happen before anything reads the global, so this
//! binary holds a single test.

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use veccap_core::prelude::*;

#[derive(Debug)]
struct Handle {
    live: Arc<AtomicUsize>,
}

impl DeviceResource for Handle {}

impl Drop for Handle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct HostDevice {
    live: Arc<AtomicUsize>,
}

impl AcceleratorBackend for HostDevice {
    fn name(&self) -> &str {
        "host"
    }

    fn create_resource(&self, _device_id: usize) -> Result<Box<dyn DeviceResource>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Handle {
            live: Arc::clone(&self.live),
        }))
    }
}

#[test]
fn test_installed_context_drives_the_configurator() {
    let live = Arc::new(AtomicUsize::new(0));
    let device = HostDevice {
        live: Arc::clone(&live),
    };
    let ctx = RuntimeCapabilityContext::builder()
        .accelerator(Box::new(AcceleratorResourceManager::new(Box::new(device))))
        .mem_pool(Box::new(AcceleratorMemPool::new()))
        .build();
    CapabilityConfigurator::install(ctx).unwrap();

    // Free before init is harmless on the installed manager.
    CapabilityConfigurator::free_accelerator_resources();
    assert_eq!(
        CapabilityConfigurator::accelerator_status(),
        AcceleratorStatus::Uninitialized
    );

    CapabilityConfigurator::init_accelerator_resources(0, 4).unwrap();
    assert_eq!(
        CapabilityConfigurator::accelerator_status(),
        AcceleratorStatus::Ready {
            device_id: 0,
            resource_count: 4
        }
    );
    assert_eq!(live.load(Ordering::SeqCst), 4);
    assert!(matches!(
        CapabilityConfigurator::init_accelerator_resources(0, 4),
        Err(CapabilityError::InvalidState { .. })
    ));

    CapabilityConfigurator::free_accelerator_resources();
    assert_eq!(
        CapabilityConfigurator::accelerator_status(),
        AcceleratorStatus::Uninitialized
    );
    assert_eq!(live.load(Ordering::SeqCst), 0);

    assert!(matches!(
        CapabilityConfigurator::init_accelerator_resources(-5, -5),
        Err(CapabilityError::InvalidArgument { .. })
    ));
    assert_eq!(
        CapabilityConfigurator::accelerator_status(),
        AcceleratorStatus::Uninitialized
    );

    // The installed memory pool keeps sizes whatever the build features.
    CapabilityConfigurator::set_accelerator_mem_pool(1024, 4096);
    assert_eq!(
        CapabilityConfigurator::accelerator_mem_pool(),
        Some(MemPoolSize {
            init_size: 1024,
            max_size: 4096
        })
    );

    assert!(matches!(
        CapabilityConfigurator::install(RuntimeCapabilityContext::new()),
        Err(CapabilityError::InvalidState { .. })
    ));
    assert_eq!(
        CapabilityConfigurator::accelerator_mem_pool(),
        Some(MemPoolSize {
            init_size: 1024,
            max_size: 4096
        })
    );
}
