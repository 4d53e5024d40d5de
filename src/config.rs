use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, AIR_VISCOSITY_SEA_LEVEL, GRAVITY, INITIAL_ALTITUDE, MAX_SIMULATION_TIME,
    TIME_STEP,
};
use crate::control::body::{require_non_negative, require_positive, BodyParameters};
use crate::control::canopy::CanopyParameters;
use crate::control::deployment::AutoDeploymentConfig;
use crate::control::environment::AirState;
use crate::control::parachute::Parachute;
use crate::errors::SimulationError;

/// Everything needed to set up one run, loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub body: BodyParameters,
    #[serde(default)]
    pub air: AirState,
    /// When set, `air` is replaced by the standard atmosphere at this altitude.
    #[serde(default)]
    pub standard_atmosphere_altitude: Option<f64>, // m
    #[serde(default)]
    pub deployment: AutoDeploymentConfig,
    #[serde(default)]
    pub canopy: CanopyParameters,
    #[serde(default = "default_initial_altitude")]
    pub initial_altitude: f64, // m
    #[serde(default = "default_time_step")]
    pub time_step: f64, // s
    #[serde(default = "default_max_time")]
    pub max_time: f64, // s
}

fn default_initial_altitude() -> f64 {
    INITIAL_ALTITUDE
}

fn default_time_step() -> f64 {
    TIME_STEP
}

fn default_max_time() -> f64 {
    MAX_SIMULATION_TIME
}

impl Default for SimulationConfig {
    /// 80 kg load under a 20 m² canopy dropped from 4 km, opening at 1 km.
    fn default() -> Self {
        SimulationConfig {
            body: BodyParameters {
                mass: 80.0,
                load_area: 0.5,
                load_drag_coefficient: 1.0,
                canopy_area: 20.0,
                canopy_drag_coefficient: 1.5,
                gravity: GRAVITY,
                characteristic_length: 1.8,
            },
            air: AirState::new(AIR_DENSITY_SEA_LEVEL, AIR_VISCOSITY_SEA_LEVEL),
            standard_atmosphere_altitude: None,
            deployment: AutoDeploymentConfig::altitude(1_000.0),
            canopy: CanopyParameters::default(),
            initial_altitude: INITIAL_ALTITUDE,
            time_step: TIME_STEP,
            max_time: MAX_SIMULATION_TIME,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: SimulationConfig = serde_json::from_str(json)
            .map_err(|e| SimulationError::Config(format!("invalid scenario: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, SimulationError> {
        let json = fs::read_to_string(path).map_err(|e| {
            SimulationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        SimulationConfig::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::Config(format!("cannot serialize scenario: {}", e)))
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.body.validate()?;
        self.deployment.validate()?;
        self.canopy.validate()?;
        require_positive("initial altitude", self.initial_altitude)?;
        require_positive("time step", self.time_step)?;
        require_positive("max time", self.max_time)?;
        if let Some(altitude) = self.standard_atmosphere_altitude {
            require_non_negative("standard atmosphere altitude", altitude)?;
        }
        Ok(())
    }

    /// Air the run will use.
    pub fn air(&self) -> AirState {
        self.standard_atmosphere_altitude
            .map_or(self.air, AirState::standard_atmosphere)
    }

    pub fn build(&self) -> Result<Parachute, SimulationError> {
        self.validate()?;
        Parachute::new(
            self.body,
            self.air(),
            self.deployment,
            self.canopy,
            self.initial_altitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::deployment::TriggerMode;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "body": {
                "mass": 90.0,
                "load_area": 0.6,
                "load_drag_coefficient": 1.1,
                "canopy_area": 25.0,
                "canopy_drag_coefficient": 1.4
            }
        }"#;

        let config = SimulationConfig::from_json(json).unwrap();

        assert_relative_eq!(config.body.mass, 90.0);
        assert_relative_eq!(config.body.gravity, GRAVITY);
        assert_relative_eq!(config.air.density, AIR_DENSITY_SEA_LEVEL);
        assert_relative_eq!(config.initial_altitude, INITIAL_ALTITUDE);
        assert_relative_eq!(config.time_step, TIME_STEP);
        assert_eq!(config.deployment.mode, TriggerMode::Altitude);
    }

    #[test]
    fn test_json_selects_trigger_mode() {
        let json = r#"{
            "body": {
                "mass": 80.0,
                "load_area": 0.5,
                "load_drag_coefficient": 1.0,
                "canopy_area": 20.0,
                "canopy_drag_coefficient": 1.5
            },
            "deployment": { "mode": "TimeToGround", "safe_time_to_deploy": 45.0 }
        }"#;

        let config = SimulationConfig::from_json(json).unwrap();

        assert_eq!(config.deployment.mode, TriggerMode::TimeToGround);
        assert_relative_eq!(config.deployment.safe_time_to_deploy, 45.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimulationConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_reported_as_config_error() {
        let result = SimulationConfig::from_json("{ not json");
        assert!(matches!(result, Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let json = r#"{
            "body": {
                "mass": -1.0,
                "load_area": 0.5,
                "load_drag_coefficient": 1.0,
                "canopy_area": 20.0,
                "canopy_drag_coefficient": 1.5
            }
        }"#;
        assert!(matches!(
            SimulationConfig::from_json(json),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_standard_atmosphere_altitude_sets_run_air() {
        let json = r#"{
            "body": {
                "mass": 80.0,
                "load_area": 0.5,
                "load_drag_coefficient": 1.0,
                "canopy_area": 20.0,
                "canopy_drag_coefficient": 1.5
            },
            "standard_atmosphere_altitude": 3000.0
        }"#;

        let config = SimulationConfig::from_json(json).unwrap();
        let expected = AirState::standard_atmosphere(3_000.0);
        assert_eq!(config.air(), expected);
        assert!(config.air().density < AIR_DENSITY_SEA_LEVEL);

        let parachute = config.build().unwrap();
        assert_eq!(parachute.air, expected);
    }

    #[test]
    fn test_configured_air_used_without_standard_atmosphere() {
        let config = SimulationConfig::default();
        assert_eq!(config.air(), config.air);
        assert_eq!(config.build().unwrap().air, config.air);
    }

    #[test]
    fn test_negative_standard_atmosphere_altitude_rejected() {
        let config = SimulationConfig {
            standard_atmosphere_altitude: Some(-10.0),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/scenario.json"));
        assert!(matches!(result, Err(SimulationError::Config(_))));
    }
}
