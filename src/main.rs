//! ChakraIO demo daemon
//!
//! Drives a full lidar session against the configured device: connect, query
//! telemetry, spin up the motor, stream samples until Ctrl-C, then tear down
//! in order.

use chakra_io::config::AppConfig;
use chakra_io::devices::create_driver;
use chakra_io::error::Result;
use chakra_io::types::SpeedUnit;
use chakra_io::LidarController;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `chakra-io <path>` (positional)
/// - `chakra-io --config <path>` (flag-based)
/// - `chakra-io -c <path>` (short flag)
///
/// Defaults to `chakraio.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "chakraio.toml".to_string()
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("ChakraIO v0.2.0 starting...");

    let config_path = parse_config_path();
    let config = match AppConfig::from_file(&config_path) {
        Ok(config) => {
            log::info!("Using config: {}", config_path);
            config
        }
        Err(e) => {
            log::warn!(
                "Could not load {} ({}), falling back to mock defaults",
                config_path,
                e
            );
            AppConfig::mock_defaults()
        }
    };

    log::info!(
        "Device: {} ({})",
        config.device.name,
        config.device.device_type
    );

    let driver = create_driver(&config.device)?;
    let mut lidar = LidarController::new(driver);

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| chakra_io::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Bring the device up in order: connect, then motor, then scan
    log::info!("{}", lidar.connect()?);

    let info = lidar.info()?;
    log::info!(
        "Device info: model 0x{:02X}, firmware {}.{}, hardware {}, serial {}",
        info.model,
        info.firmware_major,
        info.firmware_minor,
        info.hardware,
        info.serial_number
    );
    let health = lidar.health()?;
    log::info!(
        "Device health: {:?} (error code {})",
        health.status,
        health.error_code
    );
    let rates = lidar.sample_rates()?;
    log::info!(
        "Sample rates: standard {}us, express {}us",
        rates.standard_us,
        rates.express_us
    );
    for mode in lidar.scan_modes()? {
        log::info!(
            "Scan mode {}: {} ({}us/sample, max {}m)",
            mode.id,
            mode.name,
            mode.us_per_sample,
            mode.max_distance_m
        );
    }

    log::info!("{}", lidar.start_motor()?);
    std::thread::sleep(Duration::from_millis(200)); // let the spin stabilize
    log::info!("{}", lidar.start_scan()?);
    log::info!("Scan speed: {}", lidar.scan_speed(SpeedUnit::default())?);
    log::info!("Scan speed: {}", lidar.scan_speed(SpeedUnit::parse("hz"))?);

    let samples = lidar.samples();
    log::info!("Streaming samples. Press Ctrl-C to stop.");

    let mut count: u64 = 0;
    let mut last_stats = Instant::now();
    while running.load(Ordering::Relaxed) {
        if let Ok(sample) = samples.recv_timeout(Duration::from_millis(100)) {
            count += 1;
            log::debug!(
                "sample: angle {:.3} rad, distance {:.3} m, quality {}",
                sample.angle,
                sample.distance,
                sample.quality
            );
        }

        if last_stats.elapsed().as_secs() >= 10 {
            log::info!("Samples received: {}", count);
            last_stats = Instant::now();
        }
    }

    // Tear down in reverse order
    log::info!("{}", lidar.stop_scan()?);
    log::info!("{}", lidar.stop_motor()?);
    log::info!("{}", lidar.disconnect()?);

    log::info!("ChakraIO stopped");
    Ok(())
}
