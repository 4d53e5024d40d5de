use crate::constants::GROUND_CHECK_RADIUS;

/// Stand-in for a host's ground check: contact once the body is within `radius` of the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSensor {
    pub radius: f64, // m
}

impl Default for GroundSensor {
    fn default() -> Self {
        GroundSensor {
            radius: GROUND_CHECK_RADIUS,
        }
    }
}

impl GroundSensor {
    pub fn new(radius: f64) -> Self {
        GroundSensor {
            radius: radius.max(0.0),
        }
    }

    pub fn in_contact(&self, altitude: f64) -> bool {
        altitude <= self.radius
    }
}
