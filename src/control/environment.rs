use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, AIR_VISCOSITY_SEA_LEVEL, SEA_LEVEL_PRESSURE, SEA_LEVEL_TEMPERATURE,
    SPECIFIC_GAS_CONSTANT_AIR, TROPOSPHERE_HEIGHT, TROPOSPHERE_TEMP_GRADIENT,
};

/// Ambient air for one run. The core reads it and never changes it.
///
/// Density is not validated here; a zero density must reach the drag model and
/// fail the step as a divergent model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirState {
    pub density: f64, // kg/m³
    #[serde(default = "default_viscosity")]
    pub dynamic_viscosity: f64, // Pa·s
}

fn default_viscosity() -> f64 {
    AIR_VISCOSITY_SEA_LEVEL
}

impl Default for AirState {
    fn default() -> Self {
        AirState::sea_level()
    }
}

impl AirState {
    pub fn new(density: f64, dynamic_viscosity: f64) -> Self {
        AirState {
            density,
            dynamic_viscosity,
        }
    }

    pub fn sea_level() -> Self {
        AirState::new(AIR_DENSITY_SEA_LEVEL, AIR_VISCOSITY_SEA_LEVEL)
    }

    /// Standard troposphere air at `altitude`, held constant for the run.
    ///
    /// Above the tropopause the tropopause values are used.
    pub fn standard_atmosphere(altitude: f64) -> Self {
        let altitude = altitude.clamp(0.0, TROPOSPHERE_HEIGHT);
        let temperature = SEA_LEVEL_TEMPERATURE + TROPOSPHERE_TEMP_GRADIENT * altitude;
        let pressure = SEA_LEVEL_PRESSURE * (temperature / SEA_LEVEL_TEMPERATURE).powf(5.255);
        let density = pressure / (SPECIFIC_GAS_CONSTANT_AIR * temperature);

        // Sutherland's law for the viscosity.
        let dynamic_viscosity = 1.458e-6 * temperature.powf(1.5) / (temperature + 110.4);

        AirState::new(density, dynamic_viscosity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sea_level_air() {
        let air = AirState::sea_level();
        assert_abs_diff_eq!(air.density, 1.225, epsilon = 1e-12);
        assert_abs_diff_eq!(air.dynamic_viscosity, 1.81e-5, epsilon = 1e-12);
        assert_eq!(AirState::default(), air);
    }

    #[test]
    fn test_standard_atmosphere_sea_level() {
        let air = AirState::standard_atmosphere(0.0);
        assert_abs_diff_eq!(air.density, 1.225, epsilon = 0.01);
        assert_abs_diff_eq!(air.dynamic_viscosity, 1.789e-5, epsilon = 1e-7);
    }

    #[test]
    fn test_standard_atmosphere_tropopause() {
        let air = AirState::standard_atmosphere(11_000.0);
        assert_abs_diff_eq!(air.density, 0.3639, epsilon = 0.01);
    }

    #[test]
    fn test_density_decreases_with_altitude() {
        let low = AirState::standard_atmosphere(1_000.0);
        let high = AirState::standard_atmosphere(4_000.0);
        assert!(high.density < low.density);
    }

    #[test]
    fn test_zero_density_is_accepted() {
        let air = AirState::new(0.0, 1.81e-5);
        assert_eq!(air.density, 0.0);
    }
}
