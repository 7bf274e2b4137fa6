//! Scrolling ground strip. Cosmetic only: nothing in the simulation reads it.

use serde::{Deserialize, Serialize};

/// Two ground tiles leapfrogging each other to the left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
    width: f64,
    velocity: f64,
}

impl Ground {
    #[must_use]
    pub fn new(y: f64, width: f64, velocity: f64) -> Self {
        Self {
            y,
            x1: 0.0,
            x2: width,
            width,
            velocity,
        }
    }

    pub fn advance(&mut self) {
        self.x1 -= self.velocity;
        self.x2 -= self.velocity;

        if self.x1 + self.width < 0.0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0.0 {
            self.x2 = self.x1 + self.width;
        }
    }

    #[must_use]
    pub fn offsets(&self) -> (f64, f64) {
        (self.x1, self.x2)
    }
}
