use crate::control::{body::BodyParameters, canopy::CanopyPhase, environment::AirState};
use crate::errors::SimulationError;

/// Quadratic drag on the load plus, once the canopy leaves its bag, the canopy.
///
/// The canopy term is gated on or off by phase; it is not blended by inflation progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragModel;

impl DragModel {
    pub fn new() -> Self {
        DragModel
    }

    pub fn dynamic_pressure(&self, speed: f64, air: &AirState) -> f64 {
        0.5 * air.density * speed.powi(2)
    }

    /// Combined `C_d·A` for the current phase.
    pub fn effective_drag_area(&self, phase: CanopyPhase, body: &BodyParameters) -> f64 {
        let canopy_term = if phase.canopy_out() {
            body.canopy_drag_area()
        } else {
            0.0
        };
        canopy_term + body.load_drag_area()
    }

    pub fn drag_force(
        &self,
        speed: f64,
        phase: CanopyPhase,
        body: &BodyParameters,
        air: &AirState,
    ) -> f64 {
        self.dynamic_pressure(speed, air) * self.effective_drag_area(phase, body)
    }

    pub fn terminal_velocity(
        &self,
        phase: CanopyPhase,
        body: &BodyParameters,
        air: &AirState,
    ) -> Result<f64, SimulationError> {
        let denominator = air.density * self.effective_drag_area(phase, body);
        if !denominator.is_finite() || denominator <= 0.0 {
            return Err(SimulationError::DivergentModel(format!(
                "terminal velocity undefined for density {} and drag area {}",
                air.density,
                self.effective_drag_area(phase, body)
            )));
        }

        let terminal_velocity = (2.0 * body.mass * body.gravity / denominator).sqrt();
        if terminal_velocity.is_finite() {
            Ok(terminal_velocity)
        } else {
            Err(SimulationError::DivergentModel(format!(
                "terminal velocity evaluated to {}",
                terminal_velocity
            )))
        }
    }

    pub fn reynolds_number(
        &self,
        speed: f64,
        characteristic_length: f64,
        air: &AirState,
    ) -> Result<f64, SimulationError> {
        if !air.dynamic_viscosity.is_finite() || air.dynamic_viscosity <= 0.0 {
            return Err(SimulationError::DivergentModel(format!(
                "Reynolds number undefined for viscosity {}",
                air.dynamic_viscosity
            )));
        }
        Ok(air.density * speed * characteristic_length / air.dynamic_viscosity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    fn create_test_body() -> BodyParameters {
        BodyParameters::new(80.0, 0.5, 1.0, 20.0, 1.5, 9.81).unwrap()
    }

    #[test]
    fn test_dynamic_pressure_at_sea_level() {
        let drag = DragModel::new();
        let pressure = drag.dynamic_pressure(50.0, &AirState::sea_level());

        assert_relative_eq!(pressure, 1531.25, epsilon = EPSILON);
    }

    #[test]
    fn test_free_fall_terminal_velocity() {
        let drag = DragModel::new();
        let body = create_test_body();
        let terminal = drag
            .terminal_velocity(CanopyPhase::Closed, &body, &AirState::sea_level())
            .unwrap();

        let expected = (2.0 * 80.0 * 9.81 / (1.225 * 0.5_f64)).sqrt();
        assert_relative_eq!(terminal, expected, epsilon = EPSILON);
        assert!(terminal > 50.0 && terminal < 51.0);
    }

    #[test]
    fn test_canopy_terminal_velocity() {
        let drag = DragModel::new();
        let body = create_test_body();
        let air = AirState::sea_level();

        let inflating = drag
            .terminal_velocity(CanopyPhase::Inflating, &body, &air)
            .unwrap();
        let inflated = drag
            .terminal_velocity(CanopyPhase::Inflated, &body, &air)
            .unwrap();

        let expected = (2.0 * 80.0 * 9.81 / (1.225 * 30.5_f64)).sqrt();
        assert_relative_eq!(inflating, expected, epsilon = EPSILON);
        assert_relative_eq!(inflated, expected, epsilon = EPSILON);
        assert!(inflated > 6.4 && inflated < 6.5);
    }

    #[test]
    fn test_drag_force_uses_phase_gated_area() {
        let drag = DragModel::new();
        let body = create_test_body();
        let air = AirState::sea_level();

        let closed = drag.drag_force(10.0, CanopyPhase::Closed, &body, &air);
        let open = drag.drag_force(10.0, CanopyPhase::Inflated, &body, &air);

        assert_relative_eq!(closed, 61.25 * 0.5, epsilon = EPSILON);
        assert_relative_eq!(open, 61.25 * 30.5, epsilon = EPSILON);
    }

    #[test]
    fn test_drag_balances_weight_at_terminal_velocity() {
        let drag = DragModel::new();
        let body = create_test_body();
        let air = AirState::sea_level();

        for phase in [CanopyPhase::Closed, CanopyPhase::Inflated] {
            let terminal = drag.terminal_velocity(phase, &body, &air).unwrap();
            let force = drag.drag_force(terminal, phase, &body, &air);
            assert_relative_eq!(force, body.weight(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_density_is_divergent() {
        let drag = DragModel::new();
        let body = create_test_body();
        let air = AirState::new(0.0, 1.81e-5);

        let result = drag.terminal_velocity(CanopyPhase::Closed, &body, &air);
        assert!(matches!(result, Err(SimulationError::DivergentModel(_))));
    }

    #[test]
    fn test_reynolds_number() {
        let drag = DragModel::new();
        let air = AirState::new(1.225, 1.81e-5);

        let reynolds = drag.reynolds_number(10.0, 1.0, &air).unwrap();
        assert_relative_eq!(reynolds, 1.225 * 10.0 / 1.81e-5, epsilon = 1e-6);
    }

    #[test]
    fn test_reynolds_number_zero_viscosity() {
        let drag = DragModel::new();
        let air = AirState::new(1.225, 0.0);

        assert!(drag.reynolds_number(10.0, 1.0, &air).is_err());
    }
}
