pub mod actor;
pub mod platform;
pub mod rng;
