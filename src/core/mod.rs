pub mod common;
pub mod consistency;
pub mod delivery;
pub mod demand;
pub mod heating_systems;
pub mod simulator;
pub mod summary;
pub mod units;
