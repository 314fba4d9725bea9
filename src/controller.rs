//! Lidar lifecycle supervision
//!
//! [`LidarController`] enforces the legal ordering of operations against a
//! lidar device driver: connect before spinning the motor, spin the motor
//! before scanning. Every command checks the lifecycle flags before touching
//! the driver, and a flag transition is committed only once the driver reports
//! success, so the supervisor never drifts out of sync with the hardware.

use crate::drivers::LidarDriver;
use crate::error::{Error, Result};
use crate::types::{DeviceHealth, DeviceInfo, SampleRates, ScanMode, ScanSample, SpeedUnit};
use crossbeam_channel::Receiver;

/// Lifecycle supervisor for a spinning lidar device.
///
/// The controller exclusively owns its driver and three lifecycle flags:
/// `connected`, `motor_running`, `scanning`. After every command, success or
/// failure, scanning implies a running motor and a running motor implies an
/// open connection.
///
/// Commands take `&mut self`, so the borrow checker serializes command
/// sequences per instance; wrap the controller in a mutex to share it between
/// threads. Each command runs guard → driver call → flag update to completion
/// before the next one can begin. The controller imposes no timeouts of its
/// own and never retries a failed driver call.
pub struct LidarController {
    driver: Box<dyn LidarDriver>,
    connected: bool,
    motor_running: bool,
    scanning: bool,
}

impl LidarController {
    /// Create a controller in the fully-disconnected state
    pub fn new(driver: Box<dyn LidarDriver>) -> Self {
        Self {
            driver,
            connected: false,
            motor_running: false,
            scanning: false,
        }
    }

    /// Open the device connection.
    ///
    /// Fails with [`Error::AlreadyConnected`] when a connection is open, and
    /// with [`Error::ConnectionFailed`] when the driver cannot open the port
    /// (the controller stays disconnected in that case).
    pub fn connect(&mut self) -> Result<String> {
        if self.connected {
            return Err(Error::AlreadyConnected);
        }
        self.driver.open().map_err(Error::ConnectionFailed)?;
        self.connected = true;
        log::info!("Lidar: Connected on {}", self.driver.port_path());
        Ok(format!("Lidar ready on \"{}\"", self.driver.port_path()))
    }

    /// Close the device connection.
    ///
    /// A closed transport makes downstream state meaningless, so a successful
    /// disconnect also clears the motor and scan flags. This is the only
    /// command that retreats multiple lifecycle stages at once.
    pub fn disconnect(&mut self) -> Result<String> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.driver.close().map_err(Error::DisconnectionFailed)?;
        self.connected = false;
        self.motor_running = false;
        self.scanning = false;
        log::info!("Lidar: Disconnected");
        Ok("Lidar disconnected".to_string())
    }

    /// Start the spin motor
    pub fn start_motor(&mut self) -> Result<String> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.driver.motor_start().map_err(Error::MotorStartFailed)?;
        self.motor_running = true;
        log::info!("Lidar: Motor started");
        Ok("Lidar motor started".to_string())
    }

    /// Stop the spin motor.
    ///
    /// A stopped motor cannot produce samples, so the scan flag is cleared
    /// alongside the motor flag.
    pub fn stop_motor(&mut self) -> Result<String> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.driver.motor_stop().map_err(Error::MotorStopFailed)?;
        self.motor_running = false;
        if self.scanning {
            log::warn!("Lidar: Motor stopped while scanning, scan stream ends");
            self.scanning = false;
        }
        log::info!("Lidar: Motor stopped");
        Ok("Lidar motor stopped".to_string())
    }

    /// Start the scan stream
    pub fn start_scan(&mut self) -> Result<String> {
        if !self.motor_running {
            return Err(Error::MotorNotRunning);
        }
        self.driver.scan_start().map_err(Error::ScanStartFailed)?;
        self.scanning = true;
        log::info!("Lidar: Scanning started");
        Ok("Scanning started".to_string())
    }

    /// Stop the scan stream
    pub fn stop_scan(&mut self) -> Result<String> {
        if !self.motor_running {
            return Err(Error::MotorNotRunning);
        }
        self.driver.scan_stop().map_err(Error::ScanStopFailed)?;
        self.scanning = false;
        log::info!("Lidar: Scanning stopped");
        Ok("Scanning stopped".to_string())
    }

    /// Query device identification
    pub fn info(&mut self) -> Result<DeviceInfo> {
        self.driver.get_info().map_err(|source| Error::QueryFailed {
            operation: "info",
            source,
        })
    }

    /// Query device health
    pub fn health(&mut self) -> Result<DeviceHealth> {
        self.driver
            .get_health()
            .map_err(|source| Error::QueryFailed {
                operation: "health",
                source,
            })
    }

    /// Query per-mode sample durations
    pub fn sample_rates(&mut self) -> Result<SampleRates> {
        self.driver
            .get_sample_rates()
            .map_err(|source| Error::QueryFailed {
                operation: "sample_rates",
                source,
            })
    }

    /// List the scan modes the device supports
    pub fn scan_modes(&mut self) -> Result<Vec<ScanMode>> {
        self.driver
            .list_scan_modes()
            .map_err(|source| Error::QueryFailed {
                operation: "scan_modes",
                source,
            })
    }

    /// Read the current spin speed, formatted with its unit label.
    ///
    /// Only meaningful during an active scan; fails with
    /// [`Error::NotScanning`] otherwise.
    pub fn scan_speed(&self, unit: SpeedUnit) -> Result<String> {
        if !self.scanning {
            return Err(Error::NotScanning);
        }
        let value = match unit {
            SpeedUnit::Rpm => self.driver.scanning_rpm(),
            SpeedUnit::Hz => self.driver.scanning_hz(),
        };
        Ok(format!("{:.1} {}", value, unit.label()))
    }

    /// Subscribe to the driver's decoded-sample stream.
    ///
    /// Subscribing does not change controller or device state; the stream is
    /// produced only between `start_scan` and `stop_scan`.
    pub fn samples(&self) -> Receiver<ScanSample> {
        self.driver.samples()
    }

    /// True once the connection is open and not yet closed
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// True while the spin motor is running
    pub fn is_motor_running(&self) -> bool {
        self.motor_running
    }

    /// True while a scan stream is active
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::DriverResult;
    use crate::error::DriverError;
    use crate::types::HealthStatus;
    use crossbeam_channel::{bounded, Sender};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Scripted driver double: every operation succeeds unless a failure
    /// message has been queued for it, and every call is recorded.
    #[derive(Clone)]
    struct ScriptedDriver {
        state: Arc<Mutex<ScriptState>>,
        tx: Sender<ScanSample>,
        rx: Receiver<ScanSample>,
    }

    #[derive(Default)]
    struct ScriptState {
        failures: HashMap<&'static str, String>,
        calls: Vec<&'static str>,
    }

    impl ScriptedDriver {
        fn new() -> Self {
            let (tx, rx) = bounded(16);
            Self {
                state: Arc::new(Mutex::new(ScriptState::default())),
                tx,
                rx,
            }
        }

        /// Queue a failure for the next invocation of `op`
        fn fail_next(&self, op: &'static str, message: &str) {
            let mut state = self.state.lock().unwrap();
            state.failures.insert(op, message.to_string());
        }

        fn calls(&self) -> Vec<&'static str> {
            self.state.lock().unwrap().calls.clone()
        }

        /// Push a sample into the stream, as the device would mid-scan
        fn emit(&self, sample: ScanSample) {
            self.tx.send(sample).unwrap();
        }

        fn run(&self, op: &'static str) -> DriverResult<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(op);
            match state.failures.remove(op) {
                Some(message) => Err(DriverError::Other(message)),
                None => Ok(()),
            }
        }
    }

    impl LidarDriver for ScriptedDriver {
        fn open(&mut self) -> DriverResult<()> {
            self.run("open")
        }

        fn close(&mut self) -> DriverResult<()> {
            self.run("close")
        }

        fn motor_start(&mut self) -> DriverResult<()> {
            self.run("motor_start")
        }

        fn motor_stop(&mut self) -> DriverResult<()> {
            self.run("motor_stop")
        }

        fn scan_start(&mut self) -> DriverResult<()> {
            self.run("scan_start")
        }

        fn scan_stop(&mut self) -> DriverResult<()> {
            self.run("scan_stop")
        }

        fn get_info(&mut self) -> DriverResult<DeviceInfo> {
            self.run("get_info")?;
            Ok(DeviceInfo {
                model: 0x18,
                firmware_major: 1,
                firmware_minor: 29,
                hardware: 7,
                serial_number: "C0FFEE0123456789".to_string(),
            })
        }

        fn get_health(&mut self) -> DriverResult<DeviceHealth> {
            self.run("get_health")?;
            Ok(DeviceHealth {
                status: HealthStatus::Good,
                error_code: 0,
            })
        }

        fn get_sample_rates(&mut self) -> DriverResult<SampleRates> {
            self.run("get_sample_rates")?;
            Ok(SampleRates {
                standard_us: 508,
                express_us: 254,
            })
        }

        fn list_scan_modes(&mut self) -> DriverResult<Vec<ScanMode>> {
            self.run("list_scan_modes")?;
            Ok(vec![ScanMode {
                id: 0,
                name: "Standard".to_string(),
                us_per_sample: 508.0,
                max_distance_m: 12.0,
            }])
        }

        fn port_path(&self) -> &str {
            "/dev/ttyUSB0"
        }

        fn scanning_rpm(&self) -> f32 {
            360.0
        }

        fn scanning_hz(&self) -> f32 {
            6.0
        }

        fn samples(&self) -> Receiver<ScanSample> {
            self.rx.clone()
        }
    }

    fn controller() -> (LidarController, ScriptedDriver) {
        let driver = ScriptedDriver::new();
        (LidarController::new(Box::new(driver.clone())), driver)
    }

    fn invariants_hold(c: &LidarController) -> bool {
        (!c.is_scanning() || c.is_motor_running())
            && (!c.is_motor_running() || c.is_connected())
    }

    #[test]
    fn test_full_lifecycle_in_order() {
        let (mut c, _d) = controller();

        let msg = c.connect().unwrap();
        assert!(msg.contains("/dev/ttyUSB0"));
        assert!(invariants_hold(&c));

        c.start_motor().unwrap();
        assert!(c.is_motor_running());
        assert!(invariants_hold(&c));

        assert_eq!(c.start_scan().unwrap(), "Scanning started");
        assert!(c.is_scanning());
        assert!(invariants_hold(&c));

        assert_eq!(c.stop_scan().unwrap(), "Scanning stopped");
        assert!(!c.is_scanning());
        assert!(invariants_hold(&c));

        c.stop_motor().unwrap();
        assert!(!c.is_motor_running());
        assert!(invariants_hold(&c));

        c.disconnect().unwrap();
        assert!(!c.is_connected());
        assert!(invariants_hold(&c));
    }

    #[test]
    fn test_double_connect_rejected() {
        let (mut c, _d) = controller();
        c.connect().unwrap();

        assert!(matches!(c.connect(), Err(Error::AlreadyConnected)));
        // The first connection stays up
        assert!(c.is_connected());
    }

    #[test]
    fn test_commands_fail_without_prerequisites() {
        let (mut c, d) = controller();

        assert!(matches!(c.start_motor(), Err(Error::NotConnected)));
        assert!(matches!(c.stop_motor(), Err(Error::NotConnected)));
        assert!(matches!(c.disconnect(), Err(Error::NotConnected)));
        assert!(matches!(c.start_scan(), Err(Error::MotorNotRunning)));
        assert!(matches!(c.stop_scan(), Err(Error::MotorNotRunning)));
        assert!(matches!(
            c.scan_speed(SpeedUnit::default()),
            Err(Error::NotScanning)
        ));

        // Guards run before delegation: the driver never saw a call
        assert!(d.calls().is_empty());
    }

    #[test]
    fn test_scan_requires_motor_even_when_connected() {
        let (mut c, _d) = controller();
        c.connect().unwrap();
        assert!(matches!(c.start_scan(), Err(Error::MotorNotRunning)));
        assert!(!c.is_scanning());
    }

    #[test]
    fn test_disconnect_while_scanning_clears_everything() {
        let (mut c, _d) = controller();
        c.connect().unwrap();
        c.start_motor().unwrap();
        c.start_scan().unwrap();

        c.disconnect().unwrap();
        assert!(!c.is_connected());
        assert!(!c.is_motor_running());
        assert!(!c.is_scanning());
        assert!(matches!(
            c.scan_speed(SpeedUnit::default()),
            Err(Error::NotScanning)
        ));
    }

    #[test]
    fn test_connect_failure_reverts_state() {
        let (mut c, d) = controller();
        d.fail_next("open", "port busy");

        let err = c.connect().unwrap_err();
        assert!(matches!(err, Error::ConnectionFailed(_)));
        assert!(err.to_string().contains("port busy"));
        assert!(!c.is_connected());

        // The controller is still usable once the driver recovers
        c.connect().unwrap();
        assert!(c.is_connected());
    }

    #[test]
    fn test_motor_start_failure_leaves_flag_clear() {
        let (mut c, d) = controller();
        c.connect().unwrap();
        d.fail_next("motor_start", "voltage sag");

        let err = c.start_motor().unwrap_err();
        assert!(matches!(err, Error::MotorStartFailed(_)));
        assert!(err.to_string().contains("motor start failed"));
        assert!(err.to_string().contains("voltage sag"));
        assert!(!c.is_motor_running());
        assert!(invariants_hold(&c));
    }

    #[test]
    fn test_disconnect_failure_keeps_flags() {
        let (mut c, d) = controller();
        c.connect().unwrap();
        c.start_motor().unwrap();
        d.fail_next("close", "flush failed");

        assert!(matches!(
            c.disconnect(),
            Err(Error::DisconnectionFailed(_))
        ));
        // No partial commit: the pre-attempt state is intact
        assert!(c.is_connected());
        assert!(c.is_motor_running());
    }

    #[test]
    fn test_scan_start_failure_leaves_flag_clear() {
        let (mut c, d) = controller();
        c.connect().unwrap();
        c.start_motor().unwrap();
        d.fail_next("scan_start", "descriptor mismatch");

        let err = c.start_scan().unwrap_err();
        assert!(matches!(err, Error::ScanStartFailed(_)));
        assert!(err.to_string().contains("descriptor mismatch"));
        assert!(!c.is_scanning());
        assert!(invariants_hold(&c));
    }

    #[test]
    fn test_stop_motor_ends_active_scan() {
        let (mut c, _d) = controller();
        c.connect().unwrap();
        c.start_motor().unwrap();
        c.start_scan().unwrap();

        c.stop_motor().unwrap();
        assert!(!c.is_motor_running());
        assert!(!c.is_scanning());
        assert!(invariants_hold(&c));
    }

    #[test]
    fn test_queries_forward_in_any_state() {
        let (mut c, _d) = controller();

        // No lifecycle precondition on telemetry queries
        let info = c.info().unwrap();
        assert_eq!(info.model, 0x18);
        assert_eq!(c.health().unwrap().status, HealthStatus::Good);
        assert_eq!(c.sample_rates().unwrap().standard_us, 508);
        assert_eq!(c.scan_modes().unwrap()[0].name, "Standard");
    }

    #[test]
    fn test_query_failure_names_operation() {
        let (mut c, d) = controller();
        d.fail_next("get_health", "checksum mismatch");

        let err = c.health().unwrap_err();
        assert!(matches!(err, Error::QueryFailed { .. }));
        let text = err.to_string();
        assert!(text.contains("health"));
        assert!(text.contains("checksum mismatch"));
    }

    #[test]
    fn test_scan_speed_unit_selection() {
        let (mut c, _d) = controller();
        c.connect().unwrap();
        c.start_motor().unwrap();
        c.start_scan().unwrap();

        // Default readout is RPM
        assert_eq!(c.scan_speed(SpeedUnit::default()).unwrap(), "360.0 RPM");
        // Case-insensitive selectors pick the same source field
        assert_eq!(c.scan_speed(SpeedUnit::parse("hz")).unwrap(), "6.0 Hz");
        assert_eq!(c.scan_speed(SpeedUnit::parse("HZ")).unwrap(), "6.0 Hz");
    }

    #[test]
    fn test_samples_flow_through_controller() {
        let (mut c, d) = controller();
        c.connect().unwrap();
        c.start_motor().unwrap();
        c.start_scan().unwrap();

        let rx = c.samples();
        d.emit(ScanSample::new(1.0, 2.5, 47));

        let sample = rx.try_recv().unwrap();
        assert_eq!(sample.distance, 2.5);
        assert_eq!(sample.quality, 47);
    }

    #[test]
    fn test_session_reusable_after_disconnect() {
        let (mut c, _d) = controller();
        c.connect().unwrap();
        c.disconnect().unwrap();

        // A fresh connect→operate cycle works on the same instance
        c.connect().unwrap();
        c.start_motor().unwrap();
        c.start_scan().unwrap();
        assert!(c.is_scanning());
    }
}
