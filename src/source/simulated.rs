//! Generated sensor data for demos and development without hardware.

use handwatch_types::{metric, Batch, Observation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::{DataSource, FetchError};
use crate::data::SensorPoint;

/// Phase advance per fetch.
const TIME_STEP: f64 = 0.1;

/// Resting skin temperature the waveform oscillates around (°C).
const BASE_TEMPERATURE: f64 = 33.0;
const TEMPERATURE_SWING: f64 = 3.0;
const PRESSURE_PEAK: f64 = 15.0;

/// Standard deviation of the Gaussian noise on each reading.
const TEMPERATURE_SIGMA: f64 = 0.2;
const PRESSURE_SIGMA: f64 = 0.5;

/// A source that synthesizes plausible fingertip readings.
///
/// Each fetch emits one row per point carrying both temperature and
/// pressure, at positions that continue from the previous fetch.
#[derive(Debug)]
pub struct SimulatedSource {
    points: Vec<SensorPoint>,
    rng: StdRng,
    t: f64,
    next_position: u64,
    description: String,
}

impl SimulatedSource {
    /// Create a simulated source for the given points.
    ///
    /// A seed makes the generated sequence reproducible.
    pub fn new(points: Vec<SensorPoint>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let description = match seed {
            Some(seed) => format!("simulated (seed {})", seed),
            None => "simulated".to_string(),
        };
        Self {
            points,
            rng,
            t: 0.0,
            next_position: 0,
            description,
        }
    }

    fn noise(&mut self, sigma: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        sigma * z
    }

    fn temperature(&mut self, x: f64) -> f64 {
        temperature_wave(self.t, x) + self.noise(TEMPERATURE_SIGMA)
    }

    fn pressure(&mut self, y: f64) -> f64 {
        let value = PRESSURE_PEAK * (1.5 * self.t + y).sin().abs() + self.noise(PRESSURE_SIGMA);
        value.max(0.0)
    }
}

fn temperature_wave(t: f64, x: f64) -> f64 {
    BASE_TEMPERATURE + TEMPERATURE_SWING * (t + x).sin()
}

impl DataSource for SimulatedSource {
    fn fetch(&mut self) -> Result<Batch, FetchError> {
        self.t += TIME_STEP;

        let points = self.points.clone();
        let mut observations = Vec::with_capacity(points.len());
        for point in &points {
            let temperature = self.temperature(point.x);
            let pressure = self.pressure(point.y);
            observations.push(
                Observation::builder(self.next_position)
                    .sensor(point.sensor_id)
                    .reading(metric::TEMPERATURE, temperature)
                    .reading(metric::PRESSURE, pressure)
                    .build(),
            );
            self.next_position += 1;
        }

        Ok(Batch::from_observations(observations))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
