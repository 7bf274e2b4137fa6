use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for one member of a population.
///
/// Assigned once at generation start and never reused within that generation,
/// so it keeps an agent, its decision function and its fitness together no
/// matter how many neighbours are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Kinematic state of one bird.
///
/// `y` grows downward (screen coordinates). The agent never bounds-checks
/// itself; leaving the playfield is judged by the population manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    /// Ticks since the last jump (or since spawn).
    pub ticks_since_jump: u32,
    /// Visual pitch in degrees, positive is nose up.
    pub tilt: f64,
    /// Vertical position captured at the last jump.
    pub jump_baseline: f64,
    pub alive: bool,
}

impl Agent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            ticks_since_jump: 0,
            tilt: 0.0,
            jump_baseline: y,
            alive: true,
        }
    }
}

/// Per-agent reward accumulator handed back to the evolution driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fitness(pub f64);

/// Why an agent left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Silhouette overlapped a pipe segment.
    Collision,
    /// Touched the ground line.
    Ground,
    /// Flew above the top boundary.
    Ceiling,
}

impl DeathCause {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeathCause::Collision => "collision",
            DeathCause::Ground => "ground",
            DeathCause::Ceiling => "ceiling",
        }
    }
}
