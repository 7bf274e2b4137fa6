//! Plain data carried between the flapper simulation crates.

pub mod data;

pub use data::agent::{Agent, AgentId, DeathCause, Fitness};
pub use data::obstacle::Obstacle;
pub use data::observation::Observation;
pub use data::snapshot::{AgentSnapshot, ObstacleSnapshot, WorldSnapshot};
