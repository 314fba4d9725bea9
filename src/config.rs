//! Configuration for ChakraIO
//!
//! Loads configuration from a TOML file with the minimal parameters needed to
//! select and parameterize a device driver.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub logging: LoggingConfig,
}

/// Device configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Driver selector. `"mock"` is the only built-in type; real transports
    /// plug in through the `LidarDriver` trait.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Human-readable device name
    pub name: String,
    /// Serial port path reported as the transport endpoint
    pub port: String,
    /// Simulation parameters, used by the mock device only
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Simulation parameters for the mock device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Spin speed once the motor is started
    pub rpm: f32,
    /// Samples generated per revolution
    pub samples_per_revolution: usize,
    /// Half-size of the simulated square room in meters
    pub room_half_size_m: f32,
    /// Gaussian range noise standard deviation in meters
    pub range_stddev_m: f32,
    /// Probability of a sample being dropped as an invalid reading
    pub miss_rate: f32,
    /// RNG seed; 0 draws entropy for non-deterministic runs
    pub random_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rpm: 360.0,
            samples_per_revolution: 360,
            room_half_size_m: 2.0,
            range_stddev_m: 0.01,
            miss_rate: 0.02,
            random_seed: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration for the simulated device
    ///
    /// Suitable for testing and development. Deployments against real
    /// hardware should use a proper TOML configuration file.
    pub fn mock_defaults() -> Self {
        Self {
            device: DeviceConfig {
                device_type: "mock".to_string(),
                name: "Mock RPLIDAR A1".to_string(),
                port: "/dev/ttyUSB0".to_string(),
                simulation: SimulationConfig::default(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::mock_defaults()
    }
}
