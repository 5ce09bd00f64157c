//! Particle simulation: movement, arrival policy and the frame driver.

pub mod arrival;
pub mod particle;
mod simulation;

pub use arrival::{Arrival, next_destination, resolve_arrival, trip_visit_list};
pub use particle::{Particle, Step};
pub use simulation::{HubToggle, Simulation};
