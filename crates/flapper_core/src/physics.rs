//! Agent kinematics.
//!
//! Motion is the discrete rule `d = v*t + g*t²`, where `t` counts ticks since
//! the last jump and `v` is the impulse of that jump. Displacement is capped at
//! `max_fall_step` downward and sharpened by `lift_bias` while rising.

use crate::config::{PhysicsConfig, TiltModel};
use flapper_data::Agent;

/// Gives the agent an upward impulse and restarts its jump arc.
pub fn apply_jump(agent: &mut Agent, config: &PhysicsConfig) {
    agent.velocity = config.jump_impulse;
    agent.ticks_since_jump = 0;
    agent.jump_baseline = agent.y;
}

/// Vertical displacement for the current arc after `ticks` ticks.
#[must_use]
pub fn displacement(velocity: f64, ticks: u32, config: &PhysicsConfig) -> f64 {
    let t = f64::from(ticks);
    let mut d = velocity * t + config.gravity_coefficient * t * t;
    if d >= config.max_fall_step {
        d = config.max_fall_step;
    }
    if d < 0.0 {
        d -= config.lift_bias;
    }
    d
}

/// Advances one tick and returns the displacement that was applied.
pub fn advance(agent: &mut Agent, config: &PhysicsConfig) -> f64 {
    agent.ticks_since_jump = agent.ticks_since_jump.saturating_add(1);
    let d = displacement(agent.velocity, agent.ticks_since_jump, config);
    agent.y += d;
    update_tilt(agent, d, config);
    d
}

fn update_tilt(agent: &mut Agent, d: f64, config: &PhysicsConfig) {
    let near_apex = agent.y < agent.jump_baseline + config.apex_window;
    if d < 0.0 || near_apex {
        if agent.tilt < config.tilt_max {
            agent.tilt = config.tilt_max;
        }
        return;
    }

    match config.tilt_model {
        TiltModel::Classic => {
            if agent.tilt < config.tilt_floor {
                agent.tilt -= config.tilt_decay_rate;
            }
        }
        TiltModel::Decaying => {
            if agent.tilt > config.tilt_floor {
                agent.tilt = (agent.tilt - config.tilt_decay_rate).max(config.tilt_floor);
            }
        }
    }
}
