//! Lidar device driver trait

use crate::error::DriverError;
use crate::types::{DeviceHealth, DeviceInfo, SampleRates, ScanMode, ScanSample};
use crossbeam_channel::Receiver;

/// Outcome of a driver operation
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Opaque capability of an RPLIDAR-class device driver.
///
/// The driver owns the serial transport, the binary protocol framing, and the
/// decoding of raw samples; the supervisor never reaches past this trait. All
/// operations run to completion before returning, so a caller holding the
/// driver observes every command as an atomic success or failure.
pub trait LidarDriver: Send {
    /// Open the connection to the device
    fn open(&mut self) -> DriverResult<()>;

    /// Close the connection to the device
    fn close(&mut self) -> DriverResult<()>;

    /// Start the spin motor
    fn motor_start(&mut self) -> DriverResult<()>;

    /// Stop the spin motor
    fn motor_stop(&mut self) -> DriverResult<()>;

    /// Start the scan stream
    fn scan_start(&mut self) -> DriverResult<()>;

    /// Stop the scan stream
    fn scan_stop(&mut self) -> DriverResult<()>;

    /// Query device identification
    fn get_info(&mut self) -> DriverResult<DeviceInfo>;

    /// Query device health
    fn get_health(&mut self) -> DriverResult<DeviceHealth>;

    /// Query per-mode sample durations
    fn get_sample_rates(&mut self) -> DriverResult<SampleRates>;

    /// List the scan modes the device supports
    fn list_scan_modes(&mut self) -> DriverResult<Vec<ScanMode>>;

    /// Path of the underlying transport endpoint
    fn port_path(&self) -> &str;

    /// Current spin speed in revolutions per minute
    fn scanning_rpm(&self) -> f32;

    /// Current spin speed in revolutions per second
    fn scanning_hz(&self) -> f32;

    /// Subscribe to the decoded-sample event stream.
    ///
    /// Subscribing never changes device state. The stream is a single bounded
    /// queue; producers drop samples when it is full, so consumers see a
    /// best-effort feed.
    fn samples(&self) -> Receiver<ScanSample>;
}
