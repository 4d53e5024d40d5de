use log::{debug, info, warn};

use super::{
    body::{require_positive, BodyParameters},
    canopy::{CanopyParameters, CanopyPhase, DeploymentState, InflationController},
    deployment::{AutoDeploymentConfig, AutoDeploymentPolicy},
    environment::AirState,
    ground::GroundSensor,
};
use crate::errors::SimulationError;
use crate::trajectory_system::{
    aerodynamics::DragModel,
    kinematics::{DerivedState, DescentIntegrator, KinematicState},
};

/// Collaborator signals read at the start of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepInputs {
    pub ground_contact: bool,
    pub manual_deploy: bool,
}

/// What one step produced, for rendering and telemetry collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub elapsed_time: f64,
    pub speed: f64,
    pub altitude: f64,
    pub phase: CanopyPhase,
    pub deployment_requested: bool,
    pub inflation_fraction_remaining: f64,
    pub fully_inflated: bool,
    pub canopy_open: bool,
    pub grounded: bool,
    pub impact_force: f64,
    pub time_to_ground: Option<f64>,
    pub terminal_velocity: Option<f64>,
    pub dynamic_pressure: f64,
    pub drag_force: f64,
    pub reynolds_number: Option<f64>,
    pub deceleration: f64,
}

/// One simulated body: parameters, canopy, deployment policy and descent state.
pub struct Parachute {
    pub body: BodyParameters,
    pub air: AirState,
    policy: AutoDeploymentPolicy,
    canopy: InflationController,
    integrator: DescentIntegrator,
    drag: DragModel,
    derived: DerivedState,
    initial_altitude: f64,
    elapsed_time: f64,
}

impl Parachute {
    pub fn new(
        body: BodyParameters,
        air: AirState,
        deployment: AutoDeploymentConfig,
        canopy: CanopyParameters,
        initial_altitude: f64,
    ) -> Result<Self, SimulationError> {
        body.validate()?;
        require_positive("initial altitude", initial_altitude)?;

        let mut parachute = Parachute {
            body,
            air,
            policy: AutoDeploymentPolicy::new(deployment)?,
            canopy: InflationController::new(canopy)?,
            integrator: DescentIntegrator::new(&body, initial_altitude),
            drag: DragModel::new(),
            derived: DerivedState::default(),
            initial_altitude,
            elapsed_time: 0.0,
        };
        parachute.evaluate_policy();
        Ok(parachute)
    }

    /// Starts a new run with the same configuration.
    pub fn reset(&mut self) {
        self.canopy.reset();
        self.integrator = DescentIntegrator::new(&self.body, self.initial_altitude);
        self.derived = DerivedState::default();
        self.elapsed_time = 0.0;
        self.evaluate_policy();
    }

    /// Advances the body by `delta_time`.
    ///
    /// A failed step commits nothing, including a `manual_deploy` request made
    /// on it; the host must assert `manual_deploy` again on a later step. A
    /// request already raised by the deployment policy stays in place.
    pub fn step(
        &mut self,
        delta_time: f64,
        inputs: StepInputs,
    ) -> Result<StepResult, SimulationError> {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return Err(SimulationError::InvalidTimeStep(delta_time));
        }

        if self.integrator.is_grounded() || inputs.ground_contact {
            if !self.integrator.is_grounded() {
                info!(
                    "Touchdown at {:.2} m/s after {:.2} s (impact estimate {:.1} N)",
                    self.integrator.state().speed,
                    self.elapsed_time,
                    self.integrator.state().impact_force
                );
                self.integrator.ground();
            }
            self.elapsed_time += delta_time;
            return Ok(self.snapshot(0.0));
        }

        // Work on copies so a divergent step leaves the last valid state in place.
        let mut canopy = self.canopy;
        let mut integrator = self.integrator;

        if inputs.manual_deploy && canopy.request_deployment() {
            info!(
                "Manual deployment requested at altitude {:.1} m",
                integrator.state().altitude
            );
        }

        let speed_before = integrator.state().speed;
        let terminal_velocity = self
            .advance_physics(&mut canopy, &mut integrator, delta_time)
            .map_err(|e| {
                warn!("Step at t={:.2} s failed: {}", self.elapsed_time, e);
                e
            })?;

        self.canopy = canopy;
        self.integrator = integrator;
        self.elapsed_time += delta_time;
        self.derived = DerivedState {
            terminal_velocity: Some(terminal_velocity),
            expected_inflation_time: self.expected_inflation_time(),
        };
        self.evaluate_policy();

        let deceleration = (speed_before - self.integrator.state().speed) / delta_time;
        Ok(self.snapshot(deceleration))
    }

    fn advance_physics(
        &self,
        canopy: &mut InflationController,
        integrator: &mut DescentIntegrator,
        delta_time: f64,
    ) -> Result<f64, SimulationError> {
        let speed = integrator.state().speed;
        if let Some(phase) = canopy.advance(speed, &self.body, &self.air, delta_time)? {
            debug!("Canopy entered {:?} at t={:.2} s", phase, self.elapsed_time);
        }

        let terminal_velocity = self
            .drag
            .terminal_velocity(canopy.phase(), &self.body, &self.air)?;
        integrator.advance(terminal_velocity, canopy.deceleration_rate(), delta_time);
        Ok(terminal_velocity)
    }

    /// Steps with the sensor driving ground contact until touchdown or `max_time`.
    pub fn run(
        &mut self,
        delta_time: f64,
        sensor: &GroundSensor,
        max_time: f64,
    ) -> Result<Vec<StepResult>, SimulationError> {
        let mut results = Vec::new();

        while self.elapsed_time < max_time {
            let inputs = StepInputs {
                ground_contact: sensor.in_contact(self.altitude()),
                manual_deploy: false,
            };
            let result = self.step(delta_time, inputs)?;
            results.push(result);

            if result.grounded {
                break;
            }
        }

        Ok(results)
    }

    fn evaluate_policy(&mut self) {
        if self.canopy.deployment_requested() {
            return;
        }

        if self
            .policy
            .should_deploy(self.integrator.state(), &self.derived)
            && self.canopy.request_deployment()
        {
            let state = self.integrator.state();
            info!(
                "Automatic deployment ({:?}) at altitude {:.1} m, speed {:.2} m/s",
                self.policy.mode(),
                state.altitude,
                state.speed
            );
        }
    }

    /// Inflation time in effect, or the one a canopy opened at the current speed would get.
    fn expected_inflation_time(&self) -> f64 {
        self.canopy.state().inflation_time.unwrap_or_else(|| {
            self.canopy
                .params
                .inflation_time(self.integrator.state().speed)
                .unwrap_or(0.0)
        })
    }

    fn snapshot(&self, deceleration: f64) -> StepResult {
        let state = self.integrator.state();
        let phase = self.canopy.phase();
        let reynolds_number = if self.body.characteristic_length > 0.0 {
            self.drag
                .reynolds_number(state.speed, self.body.characteristic_length, &self.air)
                .ok()
        } else {
            None
        };

        StepResult {
            elapsed_time: self.elapsed_time,
            speed: state.speed,
            altitude: state.altitude,
            phase,
            deployment_requested: self.canopy.deployment_requested(),
            inflation_fraction_remaining: self.canopy.inflation_fraction_remaining(),
            fully_inflated: self.canopy.is_fully_inflated(),
            canopy_open: self.canopy.is_canopy_open(),
            grounded: state.grounded,
            impact_force: state.impact_force,
            time_to_ground: state.time_to_ground,
            terminal_velocity: self.derived.terminal_velocity,
            dynamic_pressure: self.drag.dynamic_pressure(state.speed, &self.air),
            drag_force: self
                .drag
                .drag_force(state.speed, phase, &self.body, &self.air),
            reynolds_number,
            deceleration,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.integrator.is_grounded()
    }

    pub fn is_fully_inflated(&self) -> bool {
        self.canopy.is_fully_inflated()
    }

    pub fn phase(&self) -> CanopyPhase {
        self.canopy.phase()
    }

    pub fn deployment_requested(&self) -> bool {
        self.canopy.deployment_requested()
    }

    pub fn inflation_fraction_remaining(&self) -> f64 {
        self.canopy.inflation_fraction_remaining()
    }

    pub fn speed(&self) -> f64 {
        self.integrator.state().speed
    }

    pub fn altitude(&self) -> f64 {
        self.integrator.state().altitude
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn kinematics(&self) -> &KinematicState {
        self.integrator.state()
    }

    pub fn deployment(&self) -> &DeploymentState {
        self.canopy.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_parachute(deployment: AutoDeploymentConfig) -> Parachute {
        let body = BodyParameters::new(80.0, 0.5, 1.0, 20.0, 1.5, 9.81).unwrap();
        Parachute::new(
            body,
            AirState::sea_level(),
            deployment,
            CanopyParameters::default(),
            4_000.0,
        )
        .unwrap()
    }

    #[test]
    fn test_parachute_initial_state() {
        let parachute = create_test_parachute(AutoDeploymentConfig::altitude(1_000.0));

        assert_eq!(parachute.phase(), CanopyPhase::Closed);
        assert!(!parachute.deployment_requested());
        assert!(!parachute.is_grounded());
        assert_eq!(parachute.altitude(), 4_000.0);
        assert_eq!(parachute.speed(), 0.0);
    }

    #[test]
    fn test_invalid_initial_altitude_rejected() {
        let body = BodyParameters::new(80.0, 0.5, 1.0, 20.0, 1.5, 9.81).unwrap();
        let result = Parachute::new(
            body,
            AirState::sea_level(),
            AutoDeploymentConfig::default(),
            CanopyParameters::default(),
            0.0,
        );
        assert!(matches!(
            result,
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_invalid_time_step_rejected() {
        let mut parachute = create_test_parachute(AutoDeploymentConfig::altitude(1_000.0));

        for delta_time in [0.0, -0.02, f64::NAN] {
            let result = parachute.step(delta_time, StepInputs::default());
            assert!(matches!(result, Err(SimulationError::InvalidTimeStep(_))));
        }
        assert_eq!(parachute.elapsed_time(), 0.0);
    }

    #[test]
    fn test_manual_deploy_opens_canopy() {
        let mut parachute = create_test_parachute(AutoDeploymentConfig::altitude(0.0));

        for _ in 0..50 {
            parachute.step(0.02, StepInputs::default()).unwrap();
        }
        assert!(!parachute.deployment_requested());

        let inputs = StepInputs {
            manual_deploy: true,
            ..Default::default()
        };
        let result = parachute.step(0.02, inputs).unwrap();

        assert!(result.deployment_requested);
        assert_eq!(result.phase, CanopyPhase::Inflating);
        assert!(result.inflation_fraction_remaining < 1.0);
    }

    #[test]
    fn test_step_reports_drag_and_pressure() {
        let mut parachute = create_test_parachute(AutoDeploymentConfig::altitude(1_000.0));

        let result = parachute.step(0.02, StepInputs::default()).unwrap();

        let pressure = 0.5 * 1.225 * result.speed.powi(2);
        assert_relative_eq!(result.dynamic_pressure, pressure, epsilon = 1e-12);
        assert_relative_eq!(result.drag_force, pressure * 0.5, epsilon = 1e-12);
        assert!(result.reynolds_number.is_none());
        assert!(result.terminal_velocity.is_some());
    }

    #[test]
    fn test_divergent_step_keeps_last_state() {
        let body = BodyParameters::new(80.0, 0.5, 1.0, 20.0, 1.5, 9.81).unwrap();
        let mut parachute = Parachute::new(
            body,
            AirState::new(0.0, 1.81e-5),
            AutoDeploymentConfig::altitude(1_000.0),
            CanopyParameters::default(),
            4_000.0,
        )
        .unwrap();

        let result = parachute.step(0.02, StepInputs::default());

        assert!(matches!(result, Err(SimulationError::DivergentModel(_))));
        assert_eq!(parachute.speed(), 0.0);
        assert_eq!(parachute.altitude(), 4_000.0);
        assert_eq!(parachute.elapsed_time(), 0.0);
    }

    #[test]
    fn test_manual_request_on_failed_step_is_dropped() {
        let mut parachute = create_test_parachute(AutoDeploymentConfig::altitude(1_000.0));
        let deploy = StepInputs {
            manual_deploy: true,
            ..Default::default()
        };

        // At rest the inflation time is undefined.
        let result = parachute.step(0.02, deploy);
        assert!(matches!(result, Err(SimulationError::DivergentModel(_))));
        assert!(!parachute.deployment_requested());

        let result = parachute.step(0.02, StepInputs::default()).unwrap();
        assert!(!result.deployment_requested);
        assert_eq!(result.phase, CanopyPhase::Closed);

        let result = parachute.step(0.02, deploy).unwrap();
        assert!(result.deployment_requested);
        assert_ne!(result.phase, CanopyPhase::Closed);
    }

    #[test]
    fn test_reset_restarts_run() {
        let mut parachute = create_test_parachute(AutoDeploymentConfig::altitude(3_990.0));
        let sensor = GroundSensor::default();
        parachute.run(0.02, &sensor, 20.0).unwrap();
        assert!(parachute.deployment_requested());

        parachute.reset();

        assert!(!parachute.deployment_requested());
        assert_eq!(parachute.phase(), CanopyPhase::Closed);
        assert_eq!(parachute.altitude(), 4_000.0);
        assert_eq!(parachute.elapsed_time(), 0.0);
    }
}
