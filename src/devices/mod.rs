//! Device driver implementations

#[cfg(feature = "mock")]
pub mod mock;

use crate::config::DeviceConfig;
use crate::drivers::LidarDriver;
use crate::error::{Error, Result};

/// Create a lidar driver based on configuration
pub fn create_driver(config: &DeviceConfig) -> Result<Box<dyn LidarDriver>> {
    match config.device_type.as_str() {
        #[cfg(feature = "mock")]
        "mock" => Ok(Box::new(mock::MockLidar::new(config.clone()))),
        other => Err(Error::UnknownDevice(other.to_string())),
    }
}
