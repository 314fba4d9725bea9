//! Mock lidar device for hardware-free testing
//!
//! Simulates an RPLIDAR-class sensor end to end: the connection opens and
//! closes, the motor spins up on command, and while a scan is active an
//! emitter thread publishes synthetic revolutions through the sample channel.
//! Individual operations can be scripted to fail for exercising error paths.

mod noise;
mod sim;

use crate::config::DeviceConfig;
use crate::drivers::{DriverResult, LidarDriver};
use crate::error::DriverError;
use crate::types::{DeviceHealth, DeviceInfo, HealthStatus, SampleRates, ScanMode, ScanSample};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use sim::ScanSynthesizer;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Sample queue depth; producers drop samples when full (best-effort feed)
const SAMPLE_QUEUE_DEPTH: usize = 2048;

/// Operations that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Open,
    Close,
    MotorStart,
    MotorStop,
    ScanStart,
    ScanStop,
    Info,
    Health,
    SampleRates,
    ScanModes,
}

/// Simulated RPLIDAR device
///
/// Clones share the same device state and sample channel, so tests can keep a
/// handle for scripting failures while the controller owns the driver.
#[derive(Clone)]
pub struct MockLidar {
    config: DeviceConfig,
    state: Arc<Mutex<MockState>>,
    tx: Sender<ScanSample>,
    rx: Receiver<ScanSample>,
}

#[derive(Default)]
struct MockState {
    open: bool,
    motor_on: bool,
    scanning: bool,
    rpm: f32,
    /// Scripted failures consumed by the next matching operation
    failures: HashMap<MockOp, String>,
    emitter: Option<thread::JoinHandle<()>>,
}

impl MockLidar {
    /// Create a new mock device from configuration
    pub fn new(config: DeviceConfig) -> Self {
        let (tx, rx) = bounded(SAMPLE_QUEUE_DEPTH);
        log::info!("MockLidar: Driver initialized for '{}'", config.name);
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
            tx,
            rx,
        }
    }

    /// Queue a failure for the next invocation of `op`
    pub fn fail_next(&self, op: MockOp, message: &str) {
        self.state.lock().failures.insert(op, message.to_string());
    }

    fn take_failure(state: &mut MockState, op: MockOp) -> DriverResult<()> {
        match state.failures.remove(&op) {
            Some(message) => Err(DriverError::Other(message)),
            None => Ok(()),
        }
    }

    /// Stop the emitter thread, if one is running.
    ///
    /// Joins outside the state lock; the emitter takes the same lock on every
    /// revolution.
    fn halt_emitter(&self) {
        let handle = {
            let mut state = self.state.lock();
            state.scanning = false;
            state.emitter.take()
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn emitter_loop(
    state: Arc<Mutex<MockState>>,
    tx: Sender<ScanSample>,
    mut synth: ScanSynthesizer,
    rev_period: Duration,
) {
    log::debug!("MockLidar: Emitter thread started");
    loop {
        if !state.lock().scanning {
            break;
        }
        for sample in synth.next_revolution() {
            // Queue full - drop the sample, the stream is best-effort
            let _ = tx.try_send(sample);
        }
        thread::sleep(rev_period);
    }
    log::debug!("MockLidar: Emitter thread exiting");
}

impl LidarDriver for MockLidar {
    fn open(&mut self) -> DriverResult<()> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::Open)?;
        state.open = true;
        log::info!("MockLidar: Port {} open", self.config.port);
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        {
            let mut state = self.state.lock();
            Self::take_failure(&mut state, MockOp::Close)?;
            state.open = false;
            state.motor_on = false;
            state.rpm = 0.0;
        }
        self.halt_emitter();
        log::info!("MockLidar: Port {} closed", self.config.port);
        Ok(())
    }

    fn motor_start(&mut self) -> DriverResult<()> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::MotorStart)?;
        if !state.open {
            return Err(DriverError::PortClosed);
        }
        state.motor_on = true;
        state.rpm = self.config.simulation.rpm;
        log::debug!("MockLidar: Motor spinning at {} RPM", state.rpm);
        Ok(())
    }

    fn motor_stop(&mut self) -> DriverResult<()> {
        {
            let mut state = self.state.lock();
            Self::take_failure(&mut state, MockOp::MotorStop)?;
            if !state.open {
                return Err(DriverError::PortClosed);
            }
            state.motor_on = false;
            state.rpm = 0.0;
        }
        // No spin, no samples
        self.halt_emitter();
        log::debug!("MockLidar: Motor stopped");
        Ok(())
    }

    fn scan_start(&mut self) -> DriverResult<()> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::ScanStart)?;
        if !state.open {
            return Err(DriverError::PortClosed);
        }
        if !state.motor_on {
            return Err(DriverError::Other("motor not spinning".to_string()));
        }
        if state.scanning {
            return Ok(()); // already streaming
        }
        state.scanning = true;

        // The emitter blocks on the state lock held here, so it cannot
        // observe a stale scanning flag before this method returns.
        let synth = ScanSynthesizer::new(self.config.simulation.clone());
        let rev_period = Duration::from_secs_f32(60.0 / state.rpm.max(1.0));
        let thread_state = Arc::clone(&self.state);
        let tx = self.tx.clone();
        let handle = match thread::Builder::new()
            .name("mock-lidar-emitter".to_string())
            .spawn(move || emitter_loop(thread_state, tx, synth, rev_period))
        {
            Ok(handle) => handle,
            Err(e) => {
                state.scanning = false;
                return Err(DriverError::Io(e));
            }
        };
        state.emitter = Some(handle);
        Ok(())
    }

    fn scan_stop(&mut self) -> DriverResult<()> {
        {
            let mut state = self.state.lock();
            Self::take_failure(&mut state, MockOp::ScanStop)?;
            if !state.open {
                return Err(DriverError::PortClosed);
            }
        }
        self.halt_emitter();
        Ok(())
    }

    fn get_info(&mut self) -> DriverResult<DeviceInfo> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::Info)?;
        if !state.open {
            return Err(DriverError::PortClosed);
        }
        Ok(DeviceInfo {
            model: 0x18,
            firmware_major: 1,
            firmware_minor: 29,
            hardware: 7,
            serial_number: "B0E1C0FFEE0000000000000000004242".to_string(),
        })
    }

    fn get_health(&mut self) -> DriverResult<DeviceHealth> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::Health)?;
        if !state.open {
            return Err(DriverError::PortClosed);
        }
        Ok(DeviceHealth {
            status: HealthStatus::Good,
            error_code: 0,
        })
    }

    fn get_sample_rates(&mut self) -> DriverResult<SampleRates> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::SampleRates)?;
        if !state.open {
            return Err(DriverError::PortClosed);
        }
        Ok(SampleRates {
            standard_us: 508,
            express_us: 254,
        })
    }

    fn list_scan_modes(&mut self) -> DriverResult<Vec<ScanMode>> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, MockOp::ScanModes)?;
        if !state.open {
            return Err(DriverError::PortClosed);
        }
        Ok(vec![
            ScanMode {
                id: 0,
                name: "Standard".to_string(),
                us_per_sample: 508.0,
                max_distance_m: 12.0,
            },
            ScanMode {
                id: 1,
                name: "Express".to_string(),
                us_per_sample: 254.0,
                max_distance_m: 12.0,
            },
        ])
    }

    fn port_path(&self) -> &str {
        &self.config.port
    }

    fn scanning_rpm(&self) -> f32 {
        self.state.lock().rpm
    }

    fn scanning_hz(&self) -> f32 {
        self.state.lock().rpm / 60.0
    }

    fn samples(&self) -> Receiver<ScanSample> {
        self.rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn device() -> MockLidar {
        let mut config = AppConfig::mock_defaults().device;
        config.simulation.random_seed = 42;
        config.simulation.rpm = 600.0; // 100ms revolutions, fast tests
        MockLidar::new(config)
    }

    #[test]
    fn test_operations_require_open_port() {
        let mut d = device();
        assert!(matches!(d.motor_start(), Err(DriverError::PortClosed)));
        assert!(matches!(d.get_info(), Err(DriverError::PortClosed)));
    }

    #[test]
    fn test_scan_requires_spinning_motor() {
        let mut d = device();
        d.open().unwrap();
        assert!(d.scan_start().is_err());
    }

    #[test]
    fn test_samples_arrive_while_scanning() {
        let mut d = device();
        d.open().unwrap();
        d.motor_start().unwrap();
        d.scan_start().unwrap();

        let rx = d.samples();
        let sample = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(sample.distance > 0.0);

        d.scan_stop().unwrap();
        assert!(!d.state.lock().scanning);
    }

    #[test]
    fn test_close_stops_scan() {
        let mut d = device();
        d.open().unwrap();
        d.motor_start().unwrap();
        d.scan_start().unwrap();

        d.close().unwrap();
        let state = d.state.lock();
        assert!(!state.open);
        assert!(!state.motor_on);
        assert!(!state.scanning);
    }

    #[test]
    fn test_speed_readouts_agree() {
        let mut d = device();
        d.open().unwrap();
        d.motor_start().unwrap();

        assert_eq!(d.scanning_rpm(), 600.0);
        assert_eq!(d.scanning_hz(), 10.0);
    }

    #[test]
    fn test_scripted_failure_is_consumed() {
        let mut d = device();
        d.fail_next(MockOp::Open, "port busy");

        let err = d.open().unwrap_err();
        assert!(err.to_string().contains("port busy"));

        // The failure fires once; the next attempt succeeds
        d.open().unwrap();
    }

    #[test]
    fn test_telemetry_queries() {
        let mut d = device();
        d.open().unwrap();

        assert_eq!(d.get_info().unwrap().model, 0x18);
        assert_eq!(d.get_health().unwrap().status, HealthStatus::Good);
        assert_eq!(d.get_sample_rates().unwrap().express_us, 254);
        assert_eq!(d.list_scan_modes().unwrap().len(), 2);
    }
}
