#![allow(dead_code)]

use flapper_lib::model::config::AppConfig;
use flapper_lib::model::generation::{GenerationController, GenerationRun};
use flapper_lib::model::mask::ProceduralSilhouettes;
use flapper_lib::model::state::{Agent, Observation};

/// Scripted decision function.
pub type Script = Box<dyn Fn(&Observation) -> f64 + Send + Sync>;

pub fn never() -> Script {
    Box::new(|_: &Observation| 0.0)
}

pub fn always() -> Script {
    Box::new(|_: &Observation| 1.0)
}

/// Jumps whenever the agent has sunk below `line`.
pub fn hover(line: f64) -> Script {
    Box::new(move |obs: &Observation| if obs.y > line { 1.0 } else { 0.0 })
}

pub struct SimBuilder {
    config: AppConfig,
    members: Vec<(Script, Option<f64>)>,
    first_obstacle: Option<(Option<f64>, f64)>,
}

impl SimBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(42);
        Self {
            config,
            members: Vec::new(),
            first_obstacle: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Agent at the configured start position.
    pub fn with_agent(mut self, script: Script) -> Self {
        self.members.push((script, None));
        self
    }

    /// Agent at the start column but at height `y`.
    pub fn with_agent_at(mut self, script: Script, y: f64) -> Self {
        self.members.push((script, Some(y)));
        self
    }

    pub fn with_agents<F>(mut self, count: usize, factory: F) -> Self
    where
        F: Fn() -> Script,
    {
        for _ in 0..count {
            self.members.push((factory(), None));
        }
        self
    }

    /// Replaces the random first gap with `gap_center` at the spawn position.
    pub fn with_gap(mut self, gap_center: f64) -> Self {
        self.first_obstacle = Some((None, gap_center));
        self
    }

    /// Replaces the first obstacle with one at `x` around `gap_center`.
    pub fn with_obstacle_at(mut self, x: f64, gap_center: f64) -> Self {
        self.first_obstacle = Some((Some(x), gap_center));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> (GenerationController<ProceduralSilhouettes>, GenerationRun<Script>) {
        let start_x = self.config.world.agent_start_x;
        let start_y = self.config.world.agent_start_y;
        let spawn_x = self.config.world.spawn_x;

        let mut controller =
            GenerationController::new(self.config, ProceduralSilhouettes::new()).unwrap();
        let members = self
            .members
            .into_iter()
            .map(|(script, y)| (script, Agent::new(start_x, y.unwrap_or(start_y))));
        let mut run = controller.start_generation(members).unwrap();

        if let Some((x, gap_center)) = self.first_obstacle {
            let field = run.obstacles_mut();
            field.clear();
            field.spawn_with_gap(x.unwrap_or(spawn_x), gap_center);
        }
        (controller, run)
    }
}

impl Default for SimBuilder {
    fn default() -> Self {
        Self::new()
    }
}
