//! Device driver traits

pub mod lidar;

pub use lidar::{DriverResult, LidarDriver};
