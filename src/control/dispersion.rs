use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::canopy::CanopyPhase;
use super::ground::GroundSensor;
use crate::config::SimulationConfig;
use crate::errors::SimulationError;

/// Relative spread applied to each dispersed parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispersion {
    pub mass: f64,
    pub initial_altitude: f64,
    pub density: f64,
}

impl Default for Dispersion {
    fn default() -> Self {
        Dispersion {
            mass: 0.1,
            initial_altitude: 0.05,
            density: 0.05,
        }
    }
}

/// Outcome of one dispersed descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub mass: f64,
    pub initial_altitude: f64,
    pub density: f64,
    pub deployment_altitude: Option<f64>,
    pub touchdown_speed: Option<f64>,
    pub flight_time: f64,
}

/// Independent descents of bodies drawn around a nominal configuration.
pub struct DispersionRunner {
    pub nominal: SimulationConfig,
    pub dispersion: Dispersion,
    rng: StdRng,
}

impl DispersionRunner {
    pub fn new(nominal: SimulationConfig, dispersion: Dispersion, seed: u64) -> Self {
        DispersionRunner {
            nominal,
            dispersion,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self) -> SimulationConfig {
        let mut config = self.nominal;
        config.air = config.air();
        config.standard_atmosphere_altitude = None;
        config.body.mass *= self.factor(self.dispersion.mass);
        config.initial_altitude *= self.factor(self.dispersion.initial_altitude);
        config.air.density *= self.factor(self.dispersion.density);
        config
    }

    fn factor(&mut self, spread: f64) -> f64 {
        if spread <= 0.0 {
            return 1.0;
        }
        1.0 + self.rng.gen_range(-spread..=spread)
    }

    /// Runs `count` bodies, each with its own state; a failed run is logged and skipped.
    pub fn run(&mut self, count: usize, sensor: &GroundSensor) -> Vec<RunSummary> {
        let mut summaries = Vec::with_capacity(count);

        for index in 0..count {
            let config = self.sample();
            match run_single(&config, sensor) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Dispersion run {} failed: {}", index, e),
            }
        }

        info!(
            "Completed {} of {} dispersion runs",
            summaries.len(),
            count
        );
        summaries
    }
}

pub fn run_single(
    config: &SimulationConfig,
    sensor: &GroundSensor,
) -> Result<RunSummary, SimulationError> {
    let mut parachute = config.build()?;
    let results = parachute.run(config.time_step, sensor, config.max_time)?;

    let deployment_altitude = results
        .iter()
        .find(|result| result.phase != CanopyPhase::Closed)
        .map(|result| result.altitude);
    let touchdown_speed = results
        .iter()
        .rev()
        .find(|result| !result.grounded)
        .filter(|_| parachute.is_grounded())
        .map(|result| result.speed);

    Ok(RunSummary {
        mass: config.body.mass,
        initial_altitude: config.initial_altitude,
        density: config.air().density,
        deployment_altitude,
        touchdown_speed,
        flight_time: parachute.elapsed_time(),
    })
}
