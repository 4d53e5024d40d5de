use log::trace;

use crate::constants::{SNAP_EPSILON, SPEED_EPSILON};
use crate::control::body::BodyParameters;
use crate::errors::SimulationError;
use crate::utils::approach::move_towards;

/// Downward motion of one body. Speed is a magnitude, altitude is above ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub speed: f64,
    pub altitude: f64,
    pub initial_altitude: f64,
    pub impact_force: f64,
    pub previous_impact_force: Option<f64>,
    pub time_to_ground: Option<f64>,
    pub previous_time_to_ground: Option<f64>,
    pub grounded: bool,
}

impl KinematicState {
    pub fn new(initial_altitude: f64) -> Self {
        KinematicState {
            speed: 0.0,
            altitude: initial_altitude,
            initial_altitude,
            impact_force: 0.0,
            previous_impact_force: None,
            time_to_ground: None,
            previous_time_to_ground: None,
            grounded: false,
        }
    }
}

/// Quantities derived from the rest of the model for the deployment policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedState {
    pub terminal_velocity: Option<f64>,
    pub expected_inflation_time: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DescentIntegrator {
    state: KinematicState,
    mass: f64,
    gravity: f64,
}

impl DescentIntegrator {
    pub fn new(body: &BodyParameters, initial_altitude: f64) -> Self {
        DescentIntegrator {
            state: KinematicState::new(initial_altitude),
            mass: body.mass,
            gravity: body.gravity,
        }
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    /// Ground contact: speed drops to zero and altitude stays where it is.
    pub fn ground(&mut self) {
        self.state.speed = 0.0;
        self.state.grounded = true;
        self.state.time_to_ground = Some(0.0);
    }

    /// One fixed step of the descent toward `terminal_velocity`.
    ///
    /// `deceleration_rate` is the canopy's `(v_onset − v_target) / τ`, known once inflation began.
    pub fn advance(
        &mut self,
        terminal_velocity: f64,
        deceleration_rate: Option<f64>,
        delta_time: f64,
    ) {
        if self.state.grounded {
            return;
        }

        self.state.speed = self.next_speed(terminal_velocity, deceleration_rate, delta_time);
        self.state.altitude = (self.state.altitude - self.state.speed * delta_time).max(0.0);

        self.state.previous_impact_force = Some(self.state.impact_force);
        self.state.impact_force = impact_force(
            self.mass,
            self.state.speed,
            self.state.initial_altitude,
            delta_time,
        );

        self.state.previous_time_to_ground = self.state.time_to_ground;
        self.state.time_to_ground = match time_to_ground(self.state.altitude, self.state.speed) {
            Ok(time) => Some(time),
            Err(e) => {
                trace!("{}", e);
                None
            }
        };
    }

    fn next_speed(
        &self,
        terminal_velocity: f64,
        deceleration_rate: Option<f64>,
        delta_time: f64,
    ) -> f64 {
        let speed = self.state.speed;

        if speed > terminal_velocity {
            let next = match deceleration_rate {
                Some(rate) if rate.is_finite() && rate > 0.0 => {
                    move_towards(speed, terminal_velocity, rate * delta_time)
                }
                // No inflation to drive the slowdown: clamp like a hard speed limit.
                _ => terminal_velocity,
            };

            if next - terminal_velocity < SNAP_EPSILON {
                (terminal_velocity - SNAP_EPSILON).max(0.0)
            } else {
                next
            }
        } else {
            move_towards(speed, terminal_velocity, self.gravity * delta_time)
        }
    }
}

/// Energy-based impact estimate `m·v² / (2·h₀·Δt)`.
///
/// Not a collision force; it is strongly dependent on the step size.
pub fn impact_force(mass: f64, speed: f64, initial_altitude: f64, delta_time: f64) -> f64 {
    mass * speed.powi(2) / (2.0 * initial_altitude * delta_time)
}

pub fn time_to_ground(altitude: f64, speed: f64) -> Result<f64, SimulationError> {
    if speed < SPEED_EPSILON {
        return Err(SimulationError::DegenerateRate(format!(
            "time to ground undefined at speed {}",
            speed
        )));
    }
    Ok(altitude / speed)
}
