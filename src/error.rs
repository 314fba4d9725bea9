//! Error types for ChakraIO

use std::io;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the underlying device driver.
///
/// The driver owns the serial transport and the wire protocol; its failures
/// are opaque to the supervisor and wrapped verbatim into [`Error`].
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// I/O error on the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport endpoint is not open
    #[error("port not open")]
    PortClosed,

    /// Communication timeout
    #[error("communication timeout")]
    Timeout,

    /// Invalid packet or response
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Generic driver error with message
    #[error("{0}")]
    Other(String),
}

/// ChakraIO error types
///
/// Precondition violations are raised before the driver is touched and never
/// retried. Driver-operation failures carry the driver's cause unchanged, with
/// the failing operation named for traceability. State flags are left exactly
/// as they were whenever a driver call fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lidar is already connected
    #[error("lidar already connected")]
    AlreadyConnected,

    /// Lidar is not connected
    #[error("lidar not connected")]
    NotConnected,

    /// Spin motor is not running
    #[error("motor not running")]
    MotorNotRunning,

    /// Lidar is not scanning
    #[error("lidar not scanning")]
    NotScanning,

    /// Opening the device connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(#[source] DriverError),

    /// Closing the device connection failed
    #[error("disconnection failed: {0}")]
    DisconnectionFailed(#[source] DriverError),

    /// Starting the spin motor failed
    #[error("motor start failed: {0}")]
    MotorStartFailed(#[source] DriverError),

    /// Stopping the spin motor failed
    #[error("motor stop failed: {0}")]
    MotorStopFailed(#[source] DriverError),

    /// Starting the scan stream failed
    #[error("scan start failed: {0}")]
    ScanStartFailed(#[source] DriverError),

    /// Stopping the scan stream failed
    #[error("scan stop failed: {0}")]
    ScanStopFailed(#[source] DriverError),

    /// A telemetry query failed
    #[error("query '{operation}' failed: {source}")]
    QueryFailed {
        /// Name of the failed query operation
        operation: &'static str,
        /// Underlying driver failure
        #[source]
        source: DriverError,
    },

    /// Unknown device type in configuration
    #[error("unknown device type: {0}")]
    UnknownDevice(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
