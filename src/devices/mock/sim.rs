//! Synthetic revolution generation
//!
//! Generates samples as if the sensor sat at the center of a square room.
//! Each revolution carries Gaussian range noise, and a configurable fraction
//! of rays is dropped as invalid readings, matching the gaps real hardware
//! produces on absorbent or distant surfaces.

use super::noise::NoiseGenerator;
use crate::config::SimulationConfig;
use crate::types::ScanSample;
use std::f32::consts::TAU;

/// Quality of a clean close-range echo
const QUALITY_BASE: f32 = 200.0;
/// Quality falloff per meter of range
const QUALITY_DECAY: f32 = 15.0;

/// Revolution-by-revolution sample synthesizer
pub struct ScanSynthesizer {
    config: SimulationConfig,
    noise: NoiseGenerator,
}

impl ScanSynthesizer {
    /// Create a synthesizer from simulation parameters
    pub fn new(config: SimulationConfig) -> Self {
        let noise = NoiseGenerator::new(config.random_seed);
        Self { config, noise }
    }

    /// Generate one full revolution of samples.
    ///
    /// The first generated sample carries the new-turn marker.
    pub fn next_revolution(&mut self) -> Vec<ScanSample> {
        let n = self.config.samples_per_revolution;
        let mut samples = Vec::with_capacity(n);
        let angle_step = TAU / n as f32;

        for i in 0..n {
            if self.noise.chance(self.config.miss_rate) {
                continue; // invalid reading
            }

            let angle = i as f32 * angle_step;
            let mut distance = wall_distance(angle, self.config.room_half_size_m);
            distance += self.noise.gaussian(self.config.range_stddev_m);
            distance = distance.max(0.05);

            let quality = (QUALITY_BASE - QUALITY_DECAY * distance).clamp(1.0, 255.0) as u8;
            samples.push(ScanSample::new(angle, distance, quality));
        }

        if let Some(first) = samples.first_mut() {
            first.new_turn = true;
        }
        samples
    }
}

/// Distance from the room center to the wall along `angle`
fn wall_distance(angle: f32, half_size: f32) -> f32 {
    let c = angle.cos().abs();
    let s = angle.sin().abs();
    half_size / c.max(s)
}
