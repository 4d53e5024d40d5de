use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Divergent model: {0}")]
    DivergentModel(String),

    #[error("Degenerate rate: {0}")]
    DegenerateRate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid time step: {0} s")]
    InvalidTimeStep(f64),

    #[error("Config error: {0}")]
    Config(String),
}
