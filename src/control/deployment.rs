use log::trace;
use serde::{Deserialize, Serialize};

use super::body::{require_non_negative, require_positive};
use crate::constants::{
    CONVERGENCE_EPSILON, SAFE_ALTITUDE_TO_DEPLOY, SAFE_IMPACT_FORCE_TO_DEPLOY, SAFE_TIME_TO_DEPLOY,
};
use crate::errors::SimulationError;
use crate::trajectory_system::kinematics::{DerivedState, KinematicState};
use crate::utils::approach::within;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    TimeToGround,
    Altitude,
    ImpactForce,
    Convergence,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDeploymentConfig {
    pub mode: TriggerMode,
    /// Time budget before touchdown; the expected inflation time is taken out of it.
    pub safe_time_to_deploy: f64, // s
    pub safe_altitude_to_deploy: f64, // m
    pub safe_impact_force_to_deploy: f64, // N
    pub convergence_epsilon: f64,
}

impl Default for AutoDeploymentConfig {
    fn default() -> Self {
        AutoDeploymentConfig {
            mode: TriggerMode::Altitude,
            safe_time_to_deploy: SAFE_TIME_TO_DEPLOY,
            safe_altitude_to_deploy: SAFE_ALTITUDE_TO_DEPLOY,
            safe_impact_force_to_deploy: SAFE_IMPACT_FORCE_TO_DEPLOY,
            convergence_epsilon: CONVERGENCE_EPSILON,
        }
    }
}

impl AutoDeploymentConfig {
    pub fn time_to_ground(safe_time_to_deploy: f64) -> Self {
        AutoDeploymentConfig {
            mode: TriggerMode::TimeToGround,
            safe_time_to_deploy,
            ..Default::default()
        }
    }

    pub fn altitude(safe_altitude_to_deploy: f64) -> Self {
        AutoDeploymentConfig {
            mode: TriggerMode::Altitude,
            safe_altitude_to_deploy,
            ..Default::default()
        }
    }

    pub fn impact_force(safe_impact_force_to_deploy: f64) -> Self {
        AutoDeploymentConfig {
            mode: TriggerMode::ImpactForce,
            safe_impact_force_to_deploy,
            ..Default::default()
        }
    }

    pub fn convergence() -> Self {
        AutoDeploymentConfig {
            mode: TriggerMode::Convergence,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        require_non_negative("safe time to deploy", self.safe_time_to_deploy)?;
        require_non_negative("safe altitude to deploy", self.safe_altitude_to_deploy)?;
        require_non_negative("safe impact force to deploy", self.safe_impact_force_to_deploy)?;
        require_positive("convergence epsilon", self.convergence_epsilon)?;
        Ok(())
    }
}

/// Stateless deployment decision over the current and previous-step snapshots.
#[derive(Debug, Clone, Copy)]
pub struct AutoDeploymentPolicy {
    pub config: AutoDeploymentConfig,
}

impl AutoDeploymentPolicy {
    pub fn new(config: AutoDeploymentConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(AutoDeploymentPolicy { config })
    }

    pub fn mode(&self) -> TriggerMode {
        self.config.mode
    }

    pub fn should_deploy(&self, kinematics: &KinematicState, derived: &DerivedState) -> bool {
        let config = &self.config;
        let decision = match config.mode {
            TriggerMode::TimeToGround => match kinematics.time_to_ground {
                Some(time_to_ground) => {
                    time_to_ground <= config.safe_time_to_deploy - derived.expected_inflation_time
                }
                None => false,
            },
            TriggerMode::Altitude => kinematics.altitude <= config.safe_altitude_to_deploy,
            TriggerMode::ImpactForce => {
                kinematics.impact_force >= config.safe_impact_force_to_deploy
            }
            TriggerMode::Convergence => self.has_converged(kinematics, derived),
        };

        trace!(
            "{:?} trigger at altitude {:.1} m, speed {:.2} m/s: {}",
            config.mode,
            kinematics.altitude,
            kinematics.speed,
            decision
        );
        decision
    }

    fn has_converged(&self, kinematics: &KinematicState, derived: &DerivedState) -> bool {
        let epsilon = self.config.convergence_epsilon;

        let speed_settled = match derived.terminal_velocity {
            Some(terminal) => within(kinematics.speed, terminal, epsilon),
            None => false,
        };
        let time_settled = match (
            kinematics.time_to_ground,
            kinematics.previous_time_to_ground,
        ) {
            (Some(current), Some(previous)) => within(current, previous, epsilon),
            _ => false,
        };
        let force_settled = match kinematics.previous_impact_force {
            Some(previous) => within(kinematics.impact_force, previous, epsilon),
            None => false,
        };

        speed_settled && time_settled && force_settled
    }
}
