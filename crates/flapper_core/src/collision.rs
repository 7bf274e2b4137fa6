//! Agent versus pipe overlap tests.

use crate::error::Result;
use crate::mask::{require_agent_mask, require_segment_mask, Mask, Segment, SilhouetteProvider};
use flapper_data::{Agent, AgentId, Obstacle};

/// Pixel coordinate of a position. Ties go to the even neighbour, the
/// rounding sprite blitting uses.
#[must_use]
pub fn pixel(v: f64) -> i32 {
    v.round_ties_even() as i32
}

/// Offset of a segment origin relative to the agent origin.
#[must_use]
pub fn segment_offset(agent: &Agent, obstacle: &Obstacle, segment: Segment) -> (i32, i32) {
    let seg_y = match segment {
        Segment::Top => obstacle.top,
        Segment::Bottom => obstacle.bottom,
    };
    (
        pixel(obstacle.x) - pixel(agent.x),
        pixel(seg_y) - pixel(agent.y),
    )
}

/// True when the agent silhouette touches either pipe segment.
///
/// Pure function of positions and masks; calling it never changes state.
#[must_use]
pub fn collides(
    agent: &Agent,
    agent_mask: &Mask,
    obstacle: &Obstacle,
    top_mask: &Mask,
    bottom_mask: &Mask,
) -> bool {
    let top = agent_mask.overlap(top_mask, segment_offset(agent, obstacle, Segment::Top));
    let bottom = agent_mask.overlap(bottom_mask, segment_offset(agent, obstacle, Segment::Bottom));
    top.is_some() || bottom.is_some()
}

/// [`collides`] with masks fetched from a provider.
pub fn collides_with<S: SilhouetteProvider + ?Sized>(
    provider: &S,
    id: AgentId,
    agent: &Agent,
    obstacle: &Obstacle,
) -> Result<bool> {
    let agent_mask = require_agent_mask(provider, id, agent)?;
    let top = require_segment_mask(provider, Segment::Top)?;
    let bottom = require_segment_mask(provider, Segment::Bottom)?;
    Ok(collides(agent, agent_mask, obstacle, top, bottom))
}
