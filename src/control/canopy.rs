use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::body::{require_positive, BodyParameters};
use super::environment::AirState;
use crate::constants::{
    CANOPY_DECELERATION_EXPONENT, CANOPY_DIAMETER, CANOPY_FILL_CONSTANT, CANOPY_OPEN_PROGRESS,
};
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::DragModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanopyPhase {
    Closed,
    Inflating,
    Inflated,
}

impl CanopyPhase {
    /// Whether the canopy contributes drag.
    pub fn canopy_out(&self) -> bool {
        !matches!(self, CanopyPhase::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanopyParameters {
    pub fill_constant: f64,
    pub deceleration_exponent: f64,
    pub diameter: f64, // m
}

impl Default for CanopyParameters {
    fn default() -> Self {
        CanopyParameters {
            fill_constant: CANOPY_FILL_CONSTANT,
            deceleration_exponent: CANOPY_DECELERATION_EXPONENT,
            diameter: CANOPY_DIAMETER,
        }
    }
}

impl CanopyParameters {
    pub fn new(
        fill_constant: f64,
        deceleration_exponent: f64,
        diameter: f64,
    ) -> Result<Self, SimulationError> {
        let params = CanopyParameters {
            fill_constant,
            deceleration_exponent,
            diameter,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        require_positive("canopy fill constant", self.fill_constant)?;
        require_positive("canopy diameter", self.diameter)?;
        if !self.deceleration_exponent.is_finite() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "deceleration exponent must be finite, got {}",
                self.deceleration_exponent
            )));
        }
        Ok(())
    }

    /// Inflation time constant `fill · D / v^n` for a canopy opened at `speed`.
    pub fn inflation_time(&self, speed: f64) -> Result<f64, SimulationError> {
        if speed.is_nan() || speed <= 0.0 {
            return Err(SimulationError::DivergentModel(format!(
                "inflation time undefined for onset speed {}",
                speed
            )));
        }

        let time = self.fill_constant * (self.diameter / speed.powf(self.deceleration_exponent));
        if time.is_finite() && time > 0.0 {
            Ok(time)
        } else {
            Err(SimulationError::DivergentModel(format!(
                "inflation time evaluated to {} for onset speed {}",
                time, speed
            )))
        }
    }
}

/// Everything the controller tracks for one descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeploymentState {
    pub phase: CanopyPhase,
    pub deployment_requested: bool,
    pub inflation_time: Option<f64>,
    pub progress: f64,
    pub speed_at_onset: Option<f64>,
    pub target_terminal_speed: Option<f64>,
}

impl Default for DeploymentState {
    fn default() -> Self {
        DeploymentState {
            phase: CanopyPhase::Closed,
            deployment_requested: false,
            inflation_time: None,
            progress: 0.0,
            speed_at_onset: None,
            target_terminal_speed: None,
        }
    }
}

/// Closed → Inflating → Inflated, driven by the sticky deployment request.
#[derive(Debug, Clone, Copy)]
pub struct InflationController {
    pub params: CanopyParameters,
    state: DeploymentState,
    drag: DragModel,
}

impl InflationController {
    pub fn new(params: CanopyParameters) -> Result<Self, SimulationError> {
        params.validate()?;
        Ok(InflationController {
            params,
            state: DeploymentState::default(),
            drag: DragModel::new(),
        })
    }

    /// Back to a packed canopy for a new run.
    pub fn reset(&mut self) {
        self.state = DeploymentState::default();
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    pub fn phase(&self) -> CanopyPhase {
        self.state.phase
    }

    pub fn deployment_requested(&self) -> bool {
        self.state.deployment_requested
    }

    /// Sets the sticky request. Returns true only on the first call.
    pub fn request_deployment(&mut self) -> bool {
        if self.state.deployment_requested {
            return false;
        }
        self.state.deployment_requested = true;
        true
    }

    /// Opening deceleration `(v_onset − v_target) / τ` in m/s², once inflation has begun.
    ///
    /// The integrator slows the body by this much per second, and inflation
    /// progress advances by the same number per second.
    pub fn deceleration_rate(&self) -> Option<f64> {
        match (
            self.state.speed_at_onset,
            self.state.target_terminal_speed,
            self.state.inflation_time,
        ) {
            (Some(onset), Some(target), Some(time)) => Some((onset - target) / time),
            _ => None,
        }
    }

    pub fn inflation_fraction_remaining(&self) -> f64 {
        1.0 - self.state.progress
    }

    pub fn is_fully_inflated(&self) -> bool {
        self.state.phase == CanopyPhase::Inflated
    }

    pub fn is_canopy_open(&self) -> bool {
        self.state.progress >= CANOPY_OPEN_PROGRESS
    }

    /// Advances the state machine by `delta_time` and returns the phase entered, if any.
    ///
    /// `speed` is the current downward speed; it is only read at inflation onset.
    pub fn advance(
        &mut self,
        speed: f64,
        body: &BodyParameters,
        air: &AirState,
        delta_time: f64,
    ) -> Result<Option<CanopyPhase>, SimulationError> {
        let mut entered = None;

        match self.state.phase {
            CanopyPhase::Closed => {
                if !self.state.deployment_requested {
                    return Ok(None);
                }
                self.begin_inflation(speed, body, air)?;
                entered = Some(CanopyPhase::Inflating);
            }
            CanopyPhase::Inflating => {}
            CanopyPhase::Inflated => return Ok(None),
        }

        if self.advance_progress(delta_time) {
            entered = Some(CanopyPhase::Inflated);
        }
        Ok(entered)
    }

    fn begin_inflation(
        &mut self,
        speed: f64,
        body: &BodyParameters,
        air: &AirState,
    ) -> Result<(), SimulationError> {
        let inflation_time = self.params.inflation_time(speed)?;
        let target = self
            .drag
            .terminal_velocity(CanopyPhase::Inflating, body, air)?;

        self.state.speed_at_onset = Some(speed);
        self.state.inflation_time = Some(inflation_time);
        self.state.target_terminal_speed = Some(target);
        self.state.phase = CanopyPhase::Inflating;

        info!(
            "Canopy inflating: onset speed {:.2} m/s, inflation time {:.3} s, target {:.2} m/s",
            speed, inflation_time, target
        );
        Ok(())
    }

    fn advance_progress(&mut self, delta_time: f64) -> bool {
        let rate = self.deceleration_rate().unwrap_or(0.0);
        let delta = if rate.is_finite() && rate > 0.0 {
            rate * delta_time
        } else {
            // Already at or below the canopy terminal speed: open in one step.
            debug!("Non-positive inflation rate {}, completing inflation", rate);
            1.0
        };

        self.state.progress = (self.state.progress + delta).min(1.0);

        if self.state.progress >= 1.0 {
            self.state.phase = CanopyPhase::Inflated;
            info!("Canopy fully inflated");
            true
        } else {
            false
        }
    }
}
