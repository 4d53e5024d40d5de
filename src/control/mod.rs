pub mod body;
pub mod canopy;
pub mod deployment;
pub mod dispersion;
pub mod environment;
pub mod ground;
pub mod parachute;
