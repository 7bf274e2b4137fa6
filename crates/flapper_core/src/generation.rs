//! Generation lifecycle: start, tick, terminate.
//!
//! A [`GenerationController`] outlives generations and owns the generation
//! counter, the silhouette provider and run metrics. Each
//! [`GenerationRun`] owns its population, obstacles and score exclusively.

use crate::brain::DecisionFunction;
use crate::clock::TickClock;
use crate::config::AppConfig;
use crate::error::Result;
use crate::ground::Ground;
use crate::mask::{require_segment_mask, Segment, SilhouetteProvider};
use crate::metrics::Metrics;
use crate::obstacles::{ObstacleField, SegmentGeometry};
use crate::population::{AgentResult, Population, TickContext};
use flapper_data::{Agent, DeathCause, ObstacleSnapshot, WorldSnapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Why a generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every agent died.
    Extinct,
    /// Stopped at a tick boundary by the caller or the tick cap.
    Cancelled,
    /// A tick failed partway through. Fitness values are not comparable
    /// across members and must not be used for selection.
    Aborted,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    Finished(Termination),
}

/// State of one generation in progress.
pub struct GenerationRun<D> {
    generation: u64,
    score: u32,
    clock: TickClock,
    population: Population<D>,
    obstacles: ObstacleField,
    ground: Ground,
    finished: Option<Termination>,
}

impl<D> GenerationRun<D>
where
    D: DecisionFunction + Send + Sync + 'static,
{
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    #[must_use]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    #[must_use]
    pub fn population(&self) -> &Population<D> {
        &self.population
    }

    #[must_use]
    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// Mutable access for scripted scenarios, e.g. forcing a gap height.
    pub fn obstacles_mut(&mut self) -> &mut ObstacleField {
        &mut self.obstacles
    }

    #[must_use]
    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    #[must_use]
    pub fn finished(&self) -> Option<Termination> {
        self.finished
    }

    /// Stops the generation at the current tick boundary.
    pub fn cancel(&mut self) {
        if self.finished.is_none() {
            self.finished = Some(Termination::Cancelled);
        }
    }

    /// Read-only view for a renderer.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.clock.tick(),
            generation: self.generation,
            score: self.score,
            agents: self.population.snapshots(),
            obstacles: self
                .obstacles
                .obstacles()
                .iter()
                .map(|o| ObstacleSnapshot {
                    x: o.x,
                    top: o.top,
                    bottom: o.bottom,
                    passed: o.passed,
                })
                .collect(),
            ground_offsets: self.ground.offsets(),
        }
    }
}

/// Everything the evolution driver gets back from a generation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome<D> {
    pub generation: u64,
    pub score: u32,
    pub ticks: u64,
    pub termination: Termination,
    /// One entry per member, sorted by id.
    pub results: Vec<AgentResult<D>>,
}

impl<D> GenerationOutcome<D> {
    #[must_use]
    pub fn best_fitness(&self) -> Option<f64> {
        self.results.iter().map(|r| r.fitness).reduce(f64::max)
    }

    #[must_use]
    pub fn mean_fitness(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        Some(self.results.iter().map(|r| r.fitness).sum::<f64>() / self.results.len() as f64)
    }

    /// True when a tick failed; the fitness values are partial.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.termination == Termination::Aborted
    }

    /// Moves the member with the highest fitness out of the outcome.
    ///
    /// An aborted generation has no best member.
    #[must_use]
    pub fn into_best(self) -> Option<AgentResult<D>> {
        if self.is_aborted() {
            return None;
        }
        self.results
            .into_iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }
}

/// Drives generations against one silhouette provider and configuration.
pub struct GenerationController<S> {
    config: AppConfig,
    silhouettes: S,
    generation: u64,
    metrics: Metrics,
}

impl<S: SilhouetteProvider> GenerationController<S> {
    /// Validates `config` and prepares to run generations.
    pub fn new(config: AppConfig, silhouettes: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            silhouettes,
            generation: 0,
            metrics: Metrics::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn silhouettes(&self) -> &S {
        &self.silhouettes
    }

    /// Number of generations started so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Agent at the configured start position.
    #[must_use]
    pub fn spawn_agent(&self) -> Agent {
        Agent::new(self.config.world.agent_start_x, self.config.world.agent_start_y)
    }

    /// Begins a new generation from `(decision function, initial state)` pairs.
    ///
    /// Score starts at zero, every fitness at zero, and one obstacle is placed
    /// at the spawn position.
    pub fn start_generation<D, I>(&mut self, members: I) -> Result<GenerationRun<D>>
    where
        D: DecisionFunction + Send + Sync + 'static,
        I: IntoIterator<Item = (D, Agent)>,
    {
        let top = require_segment_mask(&self.silhouettes, Segment::Top)?;
        let segment = SegmentGeometry {
            width: f64::from(top.width()),
            height: f64::from(top.height()),
        };

        self.generation += 1;
        let rng = match self.config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(
                seed.wrapping_add(self.generation).wrapping_add(0x5EED),
            ),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut obstacles = ObstacleField::new(self.config.obstacles.clone(), segment, rng);
        obstacles.spawn(self.config.world.spawn_x);

        let population = Population::new(members);
        tracing::info!(
            generation = self.generation,
            population = population.initial_size(),
            "Generation started"
        );

        let finished = population.is_extinct().then_some(Termination::Extinct);
        Ok(GenerationRun {
            generation: self.generation,
            score: 0,
            clock: TickClock::new(self.config.target_fps),
            population,
            obstacles,
            ground: Ground::new(
                self.config.world.ground_y,
                self.config.world.ground_width,
                self.config.obstacles.scroll_velocity,
            ),
            finished,
        })
    }

    /// [`Self::start_generation`] with every agent at the start position.
    pub fn start_generation_with_policies<D, I>(&mut self, policies: I) -> Result<GenerationRun<D>>
    where
        D: DecisionFunction + Send + Sync + 'static,
        I: IntoIterator<Item = D>,
    {
        let start = self.spawn_agent();
        self.start_generation(policies.into_iter().map(|p| (p, start.clone())))
    }

    /// Advances `run` by one tick.
    ///
    /// Order: observe and act, scroll and collide, bounds, pass rewards and
    /// respawn, expiry, extinction check. An error leaves the run unusable.
    pub fn tick<D>(&self, run: &mut GenerationRun<D>) -> Result<TickStatus>
    where
        D: DecisionFunction + Send + Sync + 'static,
    {
        if let Some(t) = run.finished {
            return Ok(TickStatus::Finished(t));
        }
        if run.population.is_extinct() {
            run.finished = Some(Termination::Extinct);
            return Ok(TickStatus::Finished(Termination::Extinct));
        }

        let started = Instant::now();
        let tick = run.clock.advance();

        if run.obstacles.is_empty() {
            tracing::debug!(tick, "No obstacle ahead, spawning one");
            run.obstacles.spawn(self.config.world.spawn_x);
        }

        let ctx = TickContext {
            world: &self.config.world,
            physics: &self.config.physics,
            fitness: &self.config.fitness,
            silhouettes: &self.silhouettes,
            tick,
        };
        let report = match run.population.step(&mut run.obstacles, &ctx) {
            Ok(report) => report,
            Err(e) => {
                run.finished = Some(Termination::Aborted);
                tracing::error!(generation = run.generation, tick, error = %e, "Generation aborted");
                return Err(e);
            }
        };

        for death in &report.deaths {
            let counter = match death.cause {
                DeathCause::Collision => "deaths.collision",
                DeathCause::Ground | DeathCause::Ceiling => "deaths.bounds",
            };
            self.metrics.increment_counter(counter);
        }

        if report.spawn_requested {
            run.score += 1;
            run.population.reward_all(self.config.fitness.pass_bonus);
            run.obstacles.spawn(self.config.world.spawn_x);
            self.metrics.add_to_counter("obstacles.passed", u64::from(report.passed));
        }

        run.obstacles.remove_expired();
        run.ground.advance();

        self.metrics.record_tick(
            started.elapsed(),
            run.population.alive_count(),
            run.obstacles.len(),
        );

        if run.population.is_extinct() {
            run.finished = Some(Termination::Extinct);
            return Ok(TickStatus::Finished(Termination::Extinct));
        }
        if let Some(max) = self.config.population.max_ticks {
            if tick >= max {
                run.finished = Some(Termination::Cancelled);
                return Ok(TickStatus::Finished(Termination::Cancelled));
            }
        }
        Ok(TickStatus::Running)
    }

    /// Ticks until the generation ends or `should_stop` says so at a tick
    /// boundary, then hands back the outcome.
    pub fn run_to_end<D, F>(&self, mut run: GenerationRun<D>, mut should_stop: F) -> Result<GenerationOutcome<D>>
    where
        D: DecisionFunction + Send + Sync + 'static,
        F: FnMut(&GenerationRun<D>) -> bool,
    {
        loop {
            if should_stop(&run) {
                run.cancel();
            }
            if let TickStatus::Finished(_) = self.tick(&mut run)? {
                return Ok(self.finish(run));
            }
        }
    }

    /// Closes a run and returns its final fitness per member.
    ///
    /// A run that never reached a terminal state counts as cancelled. A run
    /// whose tick failed keeps `Termination::Aborted`, and its results hand
    /// the policies back without a usable ranking.
    #[must_use]
    pub fn finish<D>(&self, run: GenerationRun<D>) -> GenerationOutcome<D>
    where
        D: DecisionFunction + Send + Sync + 'static,
    {
        let termination = run.finished.unwrap_or(Termination::Cancelled);
        let outcome = GenerationOutcome {
            generation: run.generation,
            score: run.score,
            ticks: run.clock.tick(),
            termination,
            results: run.population.into_results(),
        };
        tracing::info!(
            generation = outcome.generation,
            score = outcome.score,
            ticks = outcome.ticks,
            termination = ?outcome.termination,
            best_fitness = outcome.best_fitness().unwrap_or(0.0),
            "Generation finished"
        );
        outcome
    }
}
