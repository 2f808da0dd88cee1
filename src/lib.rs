pub mod constants;
pub mod engine;
pub mod hazard;
pub mod poi;
pub mod rng;
pub mod session;
pub mod types;
pub mod walls;
