//! Core data structures for the flapper simulation.

pub mod agent;
pub mod obstacle;
pub mod observation;
pub mod snapshot;
