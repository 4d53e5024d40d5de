pub mod config;
pub mod constants;
pub mod control;
pub mod errors;
pub mod logging;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use config::SimulationConfig;
pub use constants::*;
pub use control::body::BodyParameters;
pub use control::canopy::{CanopyParameters, CanopyPhase, DeploymentState, InflationController};
pub use control::deployment::{AutoDeploymentConfig, AutoDeploymentPolicy, TriggerMode};
pub use control::dispersion::{Dispersion, DispersionRunner, RunSummary};
pub use control::environment::AirState;
pub use control::ground::GroundSensor;
pub use control::parachute::{Parachute, StepInputs, StepResult};
pub use errors::SimulationError;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::DragModel;
pub use trajectory_system::kinematics::{DerivedState, DescentIntegrator, KinematicState};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::Telemetry;
