// Physical Constants
pub const GRAVITY: f64 = 9.81; // m/s²

// Environmental Constants
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³
pub const AIR_VISCOSITY_SEA_LEVEL: f64 = 1.81e-5; // Pa·s
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
pub const SEA_LEVEL_PRESSURE: f64 = 101325.0; // Pa
pub const TROPOSPHERE_TEMP_GRADIENT: f64 = -6.5 / 1_000.0; // K per meter
pub const TROPOSPHERE_HEIGHT: f64 = 11_000.0; // m
pub const SPECIFIC_GAS_CONSTANT_AIR: f64 = 287.05; // J/(kg·K)

// Canopy Constants
pub const CANOPY_FILL_CONSTANT: f64 = 0.65;
pub const CANOPY_DECELERATION_EXPONENT: f64 = 1.0;
pub const CANOPY_DIAMETER: f64 = 8.0; // m
/// Progress at which the canopy counts as open for the animation collaborator.
pub const CANOPY_OPEN_PROGRESS: f64 = 0.85;

// Deployment Defaults
pub const SAFE_TIME_TO_DEPLOY: f64 = 60.0; // s
pub const SAFE_ALTITUDE_TO_DEPLOY: f64 = 1_000.0; // m
pub const SAFE_IMPACT_FORCE_TO_DEPLOY: f64 = 1_000.0; // N (model estimate)

// Numerical Tolerances
pub const SNAP_EPSILON: f64 = 0.1;
pub const CONVERGENCE_EPSILON: f64 = 0.1;
pub const SPEED_EPSILON: f64 = 1e-6; // m/s

// Ground Sensor
pub const GROUND_CHECK_RADIUS: f64 = 0.2; // m

// Simulation Parameters
pub const TIME_STEP: f64 = 0.02; // s
pub const INITIAL_ALTITUDE: f64 = 4_000.0; // m
pub const MAX_SIMULATION_TIME: f64 = 3_600.0; // s

// Telemetry
/// Per-step lines kept in memory; older lines only reach the `debug` log.
pub const TELEMETRY_LOG_CAPACITY: usize = 256;
