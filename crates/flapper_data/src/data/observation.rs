use serde::{Deserialize, Serialize};

/// Inputs fed to a decision function once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Agent's vertical position.
    pub y: f64,
    /// Absolute distance to the tracked obstacle's gap center.
    pub gap_center_distance: f64,
    /// Absolute distance to the tracked obstacle's bottom segment.
    pub bottom_distance: f64,
}

impl Observation {
    #[must_use]
    pub fn as_array(&self) -> [f64; 3] {
        [self.y, self.gap_center_distance, self.bottom_distance]
    }
}
