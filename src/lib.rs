//! ChakraIO - Lifecycle supervision for spinning lidar sensors
//!
//! This library supervises an RPLIDAR-class device through an opaque
//! [`drivers::LidarDriver`] capability: every command is validated against the
//! connect → motor → scan lifecycle before it reaches the hardware, and the
//! driver's decoded sample stream is forwarded to subscribers untouched.
//!
//! ## Features
//!
//! - `mock`: Enable mock device simulation for hardware-free testing

pub mod config;
pub mod controller;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use controller::LidarController;
pub use error::{Error, Result};
pub use types::SpeedUnit;
