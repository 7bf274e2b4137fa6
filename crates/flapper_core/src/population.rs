//! The living members of one generation and the per-tick culling protocol.
//!
//! Each member is an ECS entity holding its [`AgentId`], kinematic state,
//! fitness and decision function together, so culling one member can never
//! hand its fitness to a neighbour. Deaths are marked during the scan and
//! compacted afterwards in a single pass.

use crate::brain::DecisionFunction;
use crate::collision::collides;
use crate::config::{FitnessConfig, PhysicsConfig, WorldConfig};
use crate::error::{Result, SimError};
use crate::mask::{require_agent_mask, require_segment_mask, Segment, SilhouetteProvider};
use crate::obstacles::ObstacleField;
use crate::physics;
use flapper_data::{Agent, AgentId, AgentSnapshot, DeathCause, Fitness, Observation};
use serde::Serialize;

/// Wrapper that keeps decision functions from clashing with other component types.
pub struct Policy<D>(pub D);

/// When and why a member left the generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Death {
    pub id: AgentId,
    pub cause: DeathCause,
    pub tick: u64,
}

/// Final record of one member, handed back with its decision function.
#[derive(Debug, Clone)]
pub struct AgentResult<D> {
    pub id: AgentId,
    pub policy: D,
    pub fitness: f64,
    /// `None` when the member was still alive as the generation ended.
    pub death: Option<Death>,
}

/// Everything one tick needs from outside the population.
pub struct TickContext<'a, S: ?Sized> {
    pub world: &'a WorldConfig,
    pub physics: &'a PhysicsConfig,
    pub fitness: &'a FitnessConfig,
    pub silhouettes: &'a S,
    pub tick: u64,
}

/// What happened to the population during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Set when some obstacle was passed for the first time.
    pub spawn_requested: bool,
    pub passed: u32,
    pub deaths: Vec<Death>,
}

pub struct Population<D> {
    ecs: hecs::World,
    retired: Vec<AgentResult<D>>,
    size: usize,
}

impl<D> Population<D>
where
    D: DecisionFunction + Send + Sync + 'static,
{
    /// Builds a population; members get ids in iteration order.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = (D, Agent)>,
    {
        let mut ecs = hecs::World::new();
        let mut size = 0;
        for (idx, (policy, agent)) in members.into_iter().enumerate() {
            ecs.spawn((AgentId(idx as u32), agent, Fitness::default(), Policy(policy)));
            size += 1;
        }
        Self {
            ecs,
            retired: Vec::with_capacity(size),
            size,
        }
    }

    /// Members still being simulated.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.ecs.len() as usize
    }

    /// Members at generation start.
    #[must_use]
    pub fn initial_size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.ecs.is_empty()
    }

    /// Members already removed, in order of death.
    #[must_use]
    pub fn retired(&self) -> &[AgentResult<D>] {
        &self.retired
    }

    /// Horizontal position of the agent furthest to the right.
    #[must_use]
    pub fn foremost_x(&self) -> Option<f64> {
        self.ecs
            .query::<&Agent>()
            .iter()
            .map(|(_, a)| a.x)
            .reduce(f64::max)
    }

    /// Adds `amount` to every living member's fitness.
    pub fn reward_all(&mut self, amount: f64) {
        for (_, fitness) in self.ecs.query_mut::<&mut Fitness>() {
            fitness.0 += amount;
        }
    }

    /// Runs observe, decide, move, collide and bounds for one tick.
    ///
    /// Obstacles are advanced here so collisions see their new positions.
    /// Spawning, scoring and expiry are left to the caller.
    pub fn step<S>(&mut self, obstacles: &mut ObstacleField, ctx: &TickContext<S>) -> Result<TickReport>
    where
        S: SilhouetteProvider + ?Sized,
    {
        let mut report = TickReport::default();
        let tracked = self
            .foremost_x()
            .and_then(|x| obstacles.tracked(x))
            .map(|o| (o.gap_center, o.bottom));

        let mut members: Vec<_> = self
            .ecs
            .query_mut::<(&AgentId, &mut Agent, &mut Fitness, &Policy<D>)>()
            .into_iter()
            .collect();
        members.sort_by_key(|(_h, (id, ..))| **id);

        // Observe and act.
        for (_h, (id, agent, fitness, policy)) in members.iter_mut() {
            let observation = observe(agent, tracked);
            let action = policy
                .0
                .evaluate(&observation)
                .map_err(|source| SimError::PolicyFailed { agent: **id, source })?;
            if !action.is_finite() {
                return Err(SimError::NonFiniteAction {
                    agent: **id,
                    value: action,
                });
            }
            if action > ctx.fitness.jump_threshold {
                physics::apply_jump(agent, ctx.physics);
            }
            physics::advance(agent, ctx.physics);
            fitness.0 += ctx.fitness.survival_reward;
        }

        // Collisions and passes.
        obstacles.advance_all();
        let top_mask = require_segment_mask(ctx.silhouettes, Segment::Top)?;
        let bottom_mask = require_segment_mask(ctx.silhouettes, Segment::Bottom)?;
        let mut culled = Vec::new();

        for obstacle in obstacles.obstacles_mut() {
            for (handle, (id, agent, fitness, _)) in members.iter_mut() {
                if !agent.alive {
                    continue;
                }
                let agent_mask = require_agent_mask(ctx.silhouettes, **id, agent)?;
                if collides(agent, agent_mask, obstacle, top_mask, bottom_mask) {
                    fitness.0 -= ctx.fitness.collision_penalty;
                    agent.alive = false;
                    culled.push((*handle, Death {
                        id: **id,
                        cause: DeathCause::Collision,
                        tick: ctx.tick,
                    }));
                }
            }

            let overtaken = members
                .iter()
                .any(|(_, (_, agent, ..))| agent.alive && obstacle.x < agent.x);
            if !obstacle.passed && overtaken {
                obstacle.passed = true;
                report.spawn_requested = true;
                report.passed += 1;
                tracing::debug!(serial = obstacle.serial, tick = ctx.tick, "Obstacle passed");
            }
        }

        // Ground and ceiling.
        for (handle, (id, agent, ..)) in members.iter_mut() {
            if !agent.alive {
                continue;
            }
            let height = f64::from(require_agent_mask(ctx.silhouettes, **id, agent)?.height());
            let cause = if agent.y + height >= ctx.world.ground_y {
                Some(DeathCause::Ground)
            } else if agent.y < ctx.world.ceiling_y {
                Some(DeathCause::Ceiling)
            } else {
                None
            };
            if let Some(cause) = cause {
                agent.alive = false;
                culled.push((*handle, Death {
                    id: **id,
                    cause,
                    tick: ctx.tick,
                }));
            }
        }
        drop(members);

        for (handle, death) in culled {
            self.retire(handle, death);
            report.deaths.push(death);
        }
        Ok(report)
    }

    fn retire(&mut self, handle: hecs::Entity, death: Death) {
        match self.ecs.remove::<(AgentId, Fitness, Policy<D>)>(handle) {
            Ok((id, fitness, policy)) => {
                tracing::debug!(
                    agent = %id,
                    cause = death.cause.as_str(),
                    fitness = fitness.0,
                    tick = death.tick,
                    "Agent culled"
                );
                self.retired.push(AgentResult {
                    id,
                    policy: policy.0,
                    fitness: fitness.0,
                    death: Some(death),
                });
            }
            Err(e) => tracing::error!(agent = %death.id, error = %e, "Culled agent missing components"),
        }
        let _ = self.ecs.despawn(handle);
    }

    /// Read-only view of living members, ordered by id.
    #[must_use]
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        let mut query = self.ecs.query::<(&AgentId, &Agent, &Fitness)>();
        let mut out: Vec<AgentSnapshot> = query
            .iter()
            .map(|(_h, (id, agent, fitness))| AgentSnapshot {
                id: *id,
                x: agent.x,
                y: agent.y,
                tilt: agent.tilt,
                fitness: fitness.0,
            })
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }

    /// Current fitness of a member, alive or retired.
    #[must_use]
    pub fn fitness_of(&self, id: AgentId) -> Option<f64> {
        if let Some(r) = self.retired.iter().find(|r| r.id == id) {
            return Some(r.fitness);
        }
        self.ecs
            .query::<(&AgentId, &Fitness)>()
            .iter()
            .find(|(_, (member, _))| **member == id)
            .map(|(_, (_, fitness))| fitness.0)
    }

    /// Consumes the population, returning every member sorted by id.
    #[must_use]
    pub fn into_results(mut self) -> Vec<AgentResult<D>> {
        let handles: Vec<hecs::Entity> = self.ecs.iter().map(|e| e.entity()).collect();
        let mut results = std::mem::take(&mut self.retired);
        for handle in handles {
            if let Ok((id, fitness, policy)) = self.ecs.remove::<(AgentId, Fitness, Policy<D>)>(handle) {
                results.push(AgentResult {
                    id,
                    policy: policy.0,
                    fitness: fitness.0,
                    death: None,
                });
            }
        }
        results.sort_by_key(|r| r.id);
        results
    }
}

/// Observation for one agent against the tracked obstacle's gap.
#[must_use]
pub fn observe(agent: &Agent, tracked: Option<(f64, f64)>) -> Observation {
    let (gap_center, bottom) = tracked.unwrap_or((agent.y, agent.y));
    Observation {
        y: agent.y,
        gap_center_distance: (agent.y - gap_center).abs(),
        bottom_distance: (agent.y - bottom).abs(),
    }
}
