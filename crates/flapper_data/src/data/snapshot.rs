use super::agent::AgentId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub x: f64,
    pub y: f64,
    pub tilt: f64,
    pub fitness: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
    pub passed: bool,
}

/// Read-only view of one tick, handed to whatever draws the world.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub generation: u64,
    pub score: u32,
    pub agents: Vec<AgentSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub ground_offsets: (f64, f64),
}
