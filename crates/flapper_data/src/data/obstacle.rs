use serde::{Deserialize, Serialize};

/// One pipe pair: a top segment hanging from above and a bottom segment
/// standing on the ground, separated by a vertical gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge.
    pub x: f64,
    /// Gap center height, fixed at spawn.
    pub gap_center: f64,
    /// Y of the top segment's origin (its bottom edge sits at `gap_center`).
    pub top: f64,
    /// Y of the bottom segment's top edge.
    pub bottom: f64,
    pub passed: bool,
    /// Order of creation within the generation.
    pub serial: u64,
}

impl Obstacle {
    #[must_use]
    pub fn gap_size(&self) -> f64 {
        self.bottom - self.gap_center
    }
}
