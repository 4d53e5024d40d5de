use std::collections::VecDeque;

use log::{debug, info};

use crate::constants::{GRAVITY, TELEMETRY_LOG_CAPACITY};
use crate::control::canopy::CanopyPhase;
use crate::control::parachute::StepResult;

pub struct Telemetry {
    log: VecDeque<String>,
    max_speed: f64,
    max_impact_force: f64,
    max_dynamic_pressure: f64,
    peak_opening_load: f64,
    deployment_altitude: Option<f64>,
    touchdown_speed: Option<f64>,
    last_airborne_speed: f64,
    phase_times: Vec<(CanopyPhase, f64)>,
    simulation_time: f64,
}

impl Default for Telemetry {
    fn default() -> Self {
        Telemetry::new()
    }
}

impl Telemetry {
    pub fn new() -> Self {
        Telemetry {
            log: VecDeque::with_capacity(TELEMETRY_LOG_CAPACITY),
            max_speed: 0.0,
            max_impact_force: 0.0,
            max_dynamic_pressure: 0.0,
            peak_opening_load: 0.0,
            deployment_altitude: None,
            touchdown_speed: None,
            last_airborne_speed: 0.0,
            phase_times: Vec::new(),
            simulation_time: 0.0,
        }
    }

    pub fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 3600.0 {
            let hours = (elapsed_time / 3600.0).floor();
            let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    pub fn format_altitude(altitude: f64) -> String {
        if altitude >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    pub fn collect_data(&mut self, result: &StepResult) {
        self.simulation_time = result.elapsed_time;

        self.max_speed = self.max_speed.max(result.speed);
        self.max_impact_force = self.max_impact_force.max(result.impact_force);
        self.max_dynamic_pressure = self.max_dynamic_pressure.max(result.dynamic_pressure);

        if result.phase != CanopyPhase::Closed && !result.grounded {
            // Opening shock, expressed in g.
            self.peak_opening_load = self.peak_opening_load.max(result.deceleration / GRAVITY);
        }
        if result.deployment_requested && self.deployment_altitude.is_none() {
            self.deployment_altitude = Some(result.altitude);
        }
        if result.grounded {
            if self.touchdown_speed.is_none() {
                self.touchdown_speed = Some(self.last_airborne_speed);
            }
        } else {
            self.last_airborne_speed = result.speed;
        }

        let time_to_ground = match result.time_to_ground {
            Some(time) => Self::format_time(time),
            None => "undefined".to_string(),
        };
        let data = format!(
            "Time: {} | Altitude: {} | Speed: {:.2} m/s | Phase: {:?} | \
             Inflation remaining: {:.2} | Impact estimate: {:.1} N | Time to ground: {}",
            Self::format_time(result.elapsed_time),
            Self::format_altitude(result.altitude),
            result.speed,
            result.phase,
            result.inflation_fraction_remaining,
            result.impact_force,
            time_to_ground
        );
        debug!("{}", data);
        if self.log.len() == TELEMETRY_LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(data);

        // Track phase transitions
        match self.phase_times.last() {
            Some((last_phase, _)) if *last_phase == result.phase => {}
            _ => self.phase_times.push((result.phase, result.elapsed_time)),
        }
    }

    /// The most recent per-step lines, oldest first.
    pub fn recent_log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn max_impact_force(&self) -> f64 {
        self.max_impact_force
    }

    pub fn peak_opening_load(&self) -> f64 {
        self.peak_opening_load
    }

    pub fn deployment_altitude(&self) -> Option<f64> {
        self.deployment_altitude
    }

    pub fn touchdown_speed(&self) -> Option<f64> {
        self.touchdown_speed
    }

    pub fn phase_times(&self) -> &[(CanopyPhase, f64)] {
        &self.phase_times
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            "--- Descent Summary ---".to_string(),
            format!("Flight time: {}", Self::format_time(self.simulation_time)),
            format!("Max speed: {:.2} m/s", self.max_speed),
            format!("Max impact estimate: {:.1} N", self.max_impact_force),
            format!("Max dynamic pressure: {:.1} Pa", self.max_dynamic_pressure),
            format!("Peak opening load: {:.2} g", self.peak_opening_load),
        ];
        lines.push(match self.deployment_altitude {
            Some(altitude) => format!("Deployed at: {}", Self::format_altitude(altitude)),
            None => "Deployed at: never".to_string(),
        });
        lines.push(match self.touchdown_speed {
            Some(speed) => format!("Touchdown speed: {:.2} m/s", speed),
            None => "Touchdown speed: not landed".to_string(),
        });
        for (phase, time) in &self.phase_times {
            lines.push(format!("Phase {:?} reached at: {}", phase, Self::format_time(*time)));
        }
        lines.join("\n")
    }

    pub fn display_data(&self) {
        for line in self.summary().lines() {
            info!("{}", line);
        }
    }
}
