/// Device module - the opaque ray-tracing backend boundary

// Module declarations
pub mod device;

// Re-export everything from device.rs
pub use device::*;

// Mock device for tests (no backend required)
#[cfg(test)]
pub mod mock_device;
