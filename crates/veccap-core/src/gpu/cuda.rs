//! CUDA device backend for the accelerator resource manager.

use crate::core::error::{CapabilityError, Result};
use crate::resources::accelerator::{AcceleratorBackend, DeviceResource};
use cudarc::driver::{CudaDevice, CudaStream};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One stream forked from a device's default stream.
pub struct CudaStreamResource {
    device: Arc<CudaDevice>,
    stream: CudaStream,
}

impl CudaStreamResource {
    pub fn device(&self) -> &Arc<CudaDevice> {
        &self.device
    }

    pub fn stream(&self) -> &CudaStream {
        &self.stream
    }
}

impl fmt::Debug for CudaStreamResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CudaStreamResource")
            .field("ordinal", &self.device.ordinal())
            .finish()
    }
}

impl DeviceResource for CudaStreamResource {}

/// Opens CUDA devices on demand and hands out streams.
#[derive(Default)]
pub struct CudaBackend {
    devices: Mutex<HashMap<usize, Arc<CudaDevice>>>,
}

impl CudaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one CUDA device can be opened.
    pub fn is_available() -> bool {
        CudaDevice::new(0).is_ok()
    }

    fn device(&self, ordinal: usize) -> Result<Arc<CudaDevice>> {
        let mut devices = self.devices.lock();
        if let Some(device) = devices.get(&ordinal) {
            return Ok(Arc::clone(device));
        }
        let device = CudaDevice::new(ordinal).map_err(|e| {
            CapabilityError::resource_acquisition(format!("CUDA device {}", ordinal), e)
        })?;
        devices.insert(ordinal, Arc::clone(&device));
        Ok(device)
    }
}

impl fmt::Debug for CudaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut open: Vec<usize> = self.devices.lock().keys().copied().collect();
        open.sort_unstable();
        f.debug_struct("CudaBackend").field("open_devices", &open).finish()
    }
}

impl AcceleratorBackend for CudaBackend {
    fn name(&self) -> &str {
        "cuda"
    }

    fn create_resource(&self, device_id: usize) -> Result<Box<dyn DeviceResource>> {
        let device = self.device(device_id)?;
        let stream = device
            .fork_default_stream()
            .map_err(|e| CapabilityError::resource_acquisition("CUDA stream", e))?;
        Ok(Box::new(CudaStreamResource { device, stream }))
    }
}
