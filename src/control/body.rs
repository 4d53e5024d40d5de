use serde::{Deserialize, Serialize};

use crate::constants::GRAVITY;
use crate::errors::SimulationError;

/// Mass and drag properties of the falling load and its canopy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParameters {
    pub mass: f64, // kg
    pub load_area: f64, // m²
    pub load_drag_coefficient: f64,
    pub canopy_area: f64, // m²
    pub canopy_drag_coefficient: f64,
    #[serde(default = "default_gravity")]
    pub gravity: f64, // m/s²
    #[serde(default)]
    pub characteristic_length: f64, // m
}

fn default_gravity() -> f64 {
    GRAVITY
}

impl BodyParameters {
    pub fn new(
        mass: f64,
        load_area: f64,
        load_drag_coefficient: f64,
        canopy_area: f64,
        canopy_drag_coefficient: f64,
        gravity: f64,
    ) -> Result<Self, SimulationError> {
        let body = BodyParameters {
            mass,
            load_area,
            load_drag_coefficient,
            canopy_area,
            canopy_drag_coefficient,
            gravity,
            characteristic_length: 0.0,
        };
        body.validate()?;
        Ok(body)
    }

    pub fn with_characteristic_length(mut self, length: f64) -> Result<Self, SimulationError> {
        self.characteristic_length = length;
        self.validate()?;
        Ok(self)
    }

    /// Rejects anything that would make the drag model meaningless.
    ///
    /// The canopy pair may be zero to describe a load-only body.
    pub fn validate(&self) -> Result<(), SimulationError> {
        require_positive("mass", self.mass)?;
        require_positive("load area", self.load_area)?;
        require_positive("load drag coefficient", self.load_drag_coefficient)?;
        require_positive("gravity", self.gravity)?;
        require_non_negative("canopy area", self.canopy_area)?;
        require_non_negative("canopy drag coefficient", self.canopy_drag_coefficient)?;
        require_non_negative("characteristic length", self.characteristic_length)?;
        Ok(())
    }

    pub fn load_drag_area(&self) -> f64 {
        self.load_drag_coefficient * self.load_area
    }

    pub fn canopy_drag_area(&self) -> f64 {
        self.canopy_drag_coefficient * self.canopy_area
    }

    pub fn weight(&self) -> f64 {
        self.mass * self.gravity
    }
}

pub(crate) fn require_positive(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfiguration(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfiguration(format!(
            "{} must not be negative, got {}",
            name, value
        )))
    }
}
