//! Scrolling pipe pairs.

use crate::config::ObstacleConfig;
use flapper_data::Obstacle;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Pixel size of one pipe segment, taken from its silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentGeometry {
    pub width: f64,
    pub height: f64,
}

/// Live obstacles of one generation, oldest first.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    config: ObstacleConfig,
    segment: SegmentGeometry,
    rng: ChaCha8Rng,
    next_serial: u64,
}

impl ObstacleField {
    #[must_use]
    pub fn new(config: ObstacleConfig, segment: SegmentGeometry, rng: ChaCha8Rng) -> Self {
        Self {
            obstacles: Vec::with_capacity(4),
            config,
            segment,
            rng,
            next_serial: 0,
        }
    }

    /// Spawns an obstacle at `x` with a gap center drawn uniformly from
    /// `[gap_center_min, gap_center_max)`.
    pub fn spawn(&mut self, x: f64) -> &Obstacle {
        let gap_center = self
            .rng
            .gen_range(self.config.gap_center_min..self.config.gap_center_max);
        self.spawn_with_gap(x, f64::from(gap_center))
    }

    /// Spawns an obstacle with a caller-chosen gap center.
    pub fn spawn_with_gap(&mut self, x: f64, gap_center: f64) -> &Obstacle {
        let obstacle = Obstacle {
            x,
            gap_center,
            top: gap_center - self.segment.height,
            bottom: gap_center + self.config.gap_size,
            passed: false,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        tracing::debug!(serial = obstacle.serial, x, gap_center, "Obstacle spawned");
        self.obstacles.push(obstacle);
        &self.obstacles[self.obstacles.len() - 1]
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Scrolls every obstacle left by one tick.
    pub fn advance_all(&mut self) {
        let velocity = self.config.scroll_velocity;
        for obstacle in &mut self.obstacles {
            advance(obstacle, velocity);
        }
    }

    /// Drops obstacles that have fully left the playfield; returns how many.
    pub fn remove_expired(&mut self) -> usize {
        let width = self.segment.width;
        let before = self.obstacles.len();
        self.obstacles.retain(|o| !is_expired(o, width));
        before - self.obstacles.len()
    }

    /// Index of the obstacle every agent observes.
    ///
    /// All agents share one horizontal position, so the foremost agent decides
    /// for everyone: once it is past the first obstacle's right edge and a
    /// second obstacle exists, the second one is tracked.
    #[must_use]
    pub fn tracked_index(&self, foremost_x: f64) -> usize {
        match self.obstacles.as_slice() {
            [first, _, ..] if foremost_x > right_edge(first, self.segment.width) => 1,
            _ => 0,
        }
    }

    #[must_use]
    pub fn tracked(&self, foremost_x: f64) -> Option<&Obstacle> {
        self.obstacles.get(self.tracked_index(foremost_x))
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    #[must_use]
    pub fn segment(&self) -> SegmentGeometry {
        self.segment
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

pub fn advance(obstacle: &mut Obstacle, velocity: f64) {
    obstacle.x -= velocity;
}

#[must_use]
pub fn right_edge(obstacle: &Obstacle, width: f64) -> f64 {
    obstacle.x + width
}

/// True once the right edge is past the left boundary.
#[must_use]
pub fn is_expired(obstacle: &Obstacle, width: f64) -> bool {
    right_edge(obstacle, width) < 0.0
}
