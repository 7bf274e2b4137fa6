//! Occupancy bitmaps for pixel-accurate collision.
//!
//! Sprites are not rectangles, so the engine compares silhouettes rather than
//! bounding boxes. The masks themselves come from whatever owns the artwork,
//! through [`SilhouetteProvider`].

use crate::error::{Result, SimError};
use flapper_data::{Agent, AgentId};

/// Alpha values above this count as solid, matching sprite mask conventions.
pub const ALPHA_THRESHOLD: u8 = 127;

/// Row-major occupancy bitmap with its origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// An empty mask.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// A fully solid rectangle.
    #[must_use]
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width as usize) * (height as usize)],
        }
    }

    /// Builds a mask from one alpha byte per pixel.
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if alpha.len() != expected {
            return Err(SimError::mask_unavailable(format!(
                "alpha buffer has {} bytes, expected {expected} for {width}x{height}",
                alpha.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits: alpha.iter().map(|&a| a > ALPHA_THRESHOLD).collect(),
        })
    }

    /// An ellipse inscribed in the `width` x `height` box.
    #[must_use]
    pub fn ellipse(width: u32, height: u32) -> Self {
        let mut mask = Self::new(width, height);
        let rx = f64::from(width) / 2.0;
        let ry = f64::from(height) / 2.0;
        for y in 0..height {
            for x in 0..width {
                let dx = (f64::from(x) + 0.5 - rx) / rx;
                let dy = (f64::from(y) + 0.5 - ry) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Upside-down copy, used to derive a top pipe from a bottom pipe.
    #[must_use]
    pub fn flipped_vertical(&self) -> Self {
        let w = self.width as usize;
        let mut bits = Vec::with_capacity(self.bits.len());
        for row in self.bits.chunks(w.max(1)).rev() {
            bits.extend_from_slice(row);
        }
        Self {
            width: self.width,
            height: self.height,
            bits,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.bits[idx] = solid;
        }
    }

    /// Number of solid cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// First solid cell shared with `other` placed at `offset` relative to
    /// this mask's origin, in this mask's coordinates.
    #[must_use]
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(i32, i32)> {
        let (ox, oy) = (i64::from(offset.0), i64::from(offset.1));
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = i64::from(self.width).min(ox + i64::from(other.width));
        let y1 = i64::from(self.height).min(oy + i64::from(other.height));

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32) && other.get((x - ox) as u32, (y - oy) as u32) {
                    return Some((x as i32, y as i32));
                }
            }
        }
        None
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

/// Which half of a pipe pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Top,
    Bottom,
}

/// Supplies silhouettes on demand.
///
/// Agent masks may change with the animation frame; the engine asks again
/// every tick and never caches them.
pub trait SilhouetteProvider {
    fn agent_mask(&self, id: AgentId, agent: &Agent) -> Option<&Mask>;
    fn segment_mask(&self, segment: Segment) -> Option<&Mask>;
}

/// Looks up an agent mask, turning absence into an error.
pub fn require_agent_mask<'a, S: SilhouetteProvider + ?Sized>(
    provider: &'a S,
    id: AgentId,
    agent: &Agent,
) -> Result<&'a Mask> {
    provider
        .agent_mask(id, agent)
        .ok_or_else(|| SimError::mask_unavailable(format!("no silhouette for {id}")))
}

/// Looks up a pipe segment mask, turning absence into an error.
pub fn require_segment_mask<S: SilhouetteProvider + ?Sized>(
    provider: &S,
    segment: Segment,
) -> Result<&Mask> {
    provider
        .segment_mask(segment)
        .ok_or_else(|| SimError::mask_unavailable(format!("no silhouette for {segment:?} pipe")))
}

/// Built-in shapes sized like the doubled classic sprites.
#[derive(Debug, Clone)]
pub struct ProceduralSilhouettes {
    bird: Mask,
    pipe_top: Mask,
    pipe_bottom: Mask,
}

impl ProceduralSilhouettes {
    pub const BIRD_SIZE: (u32, u32) = (68, 48);
    pub const PIPE_SIZE: (u32, u32) = (104, 640);
    const PIPE_LIP: u32 = 48;
    const PIPE_INSET: u32 = 4;

    #[must_use]
    pub fn new() -> Self {
        let (bw, bh) = Self::BIRD_SIZE;
        let (pw, ph) = Self::PIPE_SIZE;

        let mut pipe_bottom = Mask::new(pw, ph);
        for y in 0..ph {
            let (from, to) = if y < Self::PIPE_LIP {
                (0, pw)
            } else {
                (Self::PIPE_INSET, pw - Self::PIPE_INSET)
            };
            for x in from..to {
                pipe_bottom.set(x, y, true);
            }
        }

        Self {
            bird: Mask::ellipse(bw, bh),
            pipe_top: pipe_bottom.flipped_vertical(),
            pipe_bottom,
        }
    }
}

impl Default for ProceduralSilhouettes {
    fn default() -> Self {
        Self::new()
    }
}

impl SilhouetteProvider for ProceduralSilhouettes {
    fn agent_mask(&self, _id: AgentId, _agent: &Agent) -> Option<&Mask> {
        Some(&self.bird)
    }

    fn segment_mask(&self, segment: Segment) -> Option<&Mask> {
        match segment {
            Segment::Top => Some(&self.pipe_top),
            Segment::Bottom => Some(&self.pipe_bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_alpha_threshold() {
        let mask = Mask::from_alpha(2, 2, &[0, 127, 128, 255]).unwrap();
        assert!(!mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(0, 1));
        assert!(mask.get(1, 1));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_from_alpha_rejects_wrong_length() {
        assert!(matches!(
            Mask::from_alpha(3, 3, &[255; 4]),
            Err(SimError::MaskUnavailable { .. })
        ));
    }

    #[test]
    fn test_overlap_of_touching_rects() {
        let a = Mask::filled(10, 10);
        let b = Mask::filled(5, 5);
        assert_eq!(a.overlap(&b, (9, 9)), Some((9, 9)));
        assert_eq!(a.overlap(&b, (10, 0)), None);
        assert_eq!(a.overlap(&b, (-5, 0)), None);
        assert_eq!(a.overlap(&b, (-4, -4)), Some((0, 0)));
    }

    #[test]
    fn test_overlap_respects_shape_not_box() {
        let circle = Mask::ellipse(20, 20);
        let dot = Mask::filled(1, 1);
        // Corner of the bounding box is outside the ellipse.
        assert_eq!(circle.overlap(&dot, (0, 0)), None);
        assert!(circle.overlap(&dot, (10, 10)).is_some());
    }

    #[test]
    fn test_flip_moves_rows() {
        let mut mask = Mask::new(3, 4);
        mask.set(1, 0, true);
        let flipped = mask.flipped_vertical();
        assert!(flipped.get(1, 3));
        assert!(!flipped.get(1, 0));
        assert_eq!(flipped.flipped_vertical(), mask);
    }

    #[test]
    fn test_out_of_range_reads_are_empty() {
        let mask = Mask::filled(2, 2);
        assert!(!mask.get(2, 0));
        assert!(!mask.get(0, 5));
    }

    #[test]
    fn test_procedural_pipe_has_lip_near_gap() {
        let shapes = ProceduralSilhouettes::new();
        let bottom = shapes.segment_mask(Segment::Bottom).unwrap();
        let top = shapes.segment_mask(Segment::Top).unwrap();
        assert!(bottom.get(0, 0));
        assert!(!bottom.get(0, 100));
        assert!(top.get(0, 639));
        assert!(!top.get(0, 0));
        assert_eq!((top.width(), top.height()), ProceduralSilhouettes::PIPE_SIZE);
    }

    struct Blind;

    impl SilhouetteProvider for Blind {
        fn agent_mask(&self, _id: AgentId, _agent: &Agent) -> Option<&Mask> {
            None
        }
        fn segment_mask(&self, _segment: Segment) -> Option<&Mask> {
            None
        }
    }

    #[test]
    fn test_missing_masks_become_errors() {
        let agent = Agent::new(0.0, 0.0);
        assert!(require_agent_mask(&Blind, AgentId(0), &agent).is_err());
        assert!(require_segment_mask(&Blind, Segment::Top).is_err());
    }
}
