//! Device telemetry records and the speed-unit selector

use serde::{Deserialize, Serialize};

/// Device identification record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Model code
    pub model: u8,
    /// Firmware major version
    pub firmware_major: u8,
    /// Firmware minor version
    pub firmware_minor: u8,
    /// Hardware revision
    pub hardware: u8,
    /// Serial number as a hex string
    pub serial_number: String,
}

/// Health status reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Device is operating normally
    Good,
    /// Device works but reports a warning code
    Warning,
    /// Device is in a protection/error state
    Error,
}

/// Device health record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHealth {
    pub status: HealthStatus,
    /// Device-specific error code, 0 when healthy
    pub error_code: u16,
}

/// Single-measurement durations for the supported sampling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRates {
    /// Microseconds per sample in standard scan mode
    pub standard_us: u16,
    /// Microseconds per sample in express scan mode
    pub express_us: u16,
}

/// A scan mode supported by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMode {
    /// Mode id used by the device
    pub id: u16,
    /// Human-readable mode name
    pub name: String,
    /// Sample duration in microseconds
    pub us_per_sample: f32,
    /// Maximum measurable distance in meters
    pub max_distance_m: f32,
}

/// Spin-speed unit selector for speed readouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedUnit {
    /// Revolutions per minute (the default readout)
    #[default]
    Rpm,
    /// Revolutions per second
    Hz,
}

impl SpeedUnit {
    /// Parse a unit selector, case-insensitively.
    ///
    /// Anything that is not `"hz"` selects RPM, the default readout.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("hz") {
            SpeedUnit::Hz
        } else {
            SpeedUnit::Rpm
        }
    }

    /// Unit label for formatted readouts
    pub fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Rpm => "RPM",
            SpeedUnit::Hz => "Hz",
        }
    }
}
