//! Multi-generation runner.
//!
//! Every generation gets freshly sampled [`FeedForward`] policies; selection
//! and breeding are left to whoever consumes the history log.

pub mod shutdown;

pub use shutdown::ShutdownManager;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tokio::sync::watch;
use uuid::Uuid;

use crate::model::brain::FeedForward;
use crate::model::config::AppConfig;
use crate::model::generation::{GenerationController, GenerationOutcome, TickStatus};
use crate::model::history::{GenerationRecord, HistoryLogger};
use crate::model::mask::ProceduralSilhouettes;
use crate::model::state::WorldSnapshot;

/// Hidden layer widths of the sampled policies.
pub const HIDDEN_LAYERS: &[usize] = &[6];

/// Unpaced runs yield to the runtime this often so the signal task can run.
const YIELD_EVERY: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// As fast as possible.
    #[default]
    Headless,
    /// One tick per frame at `target_fps`, publishing a snapshot each tick.
    Paced,
}

pub struct App {
    controller: GenerationController<ProceduralSilhouettes>,
    history: HistoryLogger,
    shutdown: ShutdownManager,
    snapshots: watch::Sender<Option<WorldSnapshot>>,
    rng: ChaCha8Rng,
    run_id: Uuid,
    fingerprint: String,
    mode: RunMode,
}

impl App {
    /// Validates `config` and opens the history log under `log_dir`, if any.
    pub fn new(config: AppConfig, mode: RunMode, log_dir: Option<&Path>) -> Result<Self> {
        let history = match log_dir {
            Some(dir) => HistoryLogger::new_at(dir)
                .with_context(|| format!("opening history log in {}", dir.display()))?,
            None => HistoryLogger::new_dummy(),
        };
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let fingerprint = config.fingerprint();
        let controller = GenerationController::new(config, ProceduralSilhouettes::new())?;
        let (snapshots, _) = watch::channel(None);
        let run_id = Uuid::new_v4();

        tracing::info!(%run_id, fingerprint = %fingerprint, ?mode, "Run initialized");
        Ok(Self {
            controller,
            history,
            shutdown: ShutdownManager::new(),
            snapshots,
            rng,
            run_id,
            fingerprint,
            mode,
        })
    }

    pub fn controller(&self) -> &GenerationController<ProceduralSilhouettes> {
        &self.controller
    }

    pub fn shutdown(&self) -> &ShutdownManager {
        &self.shutdown
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn history_path(&self) -> &Path {
        self.history.path()
    }

    /// Latest world snapshot, updated every tick in paced mode.
    pub fn subscribe(&self) -> watch::Receiver<Option<WorldSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Runs up to `generations` generations, stopping early on shutdown.
    ///
    /// Each finished generation is appended to the history log and returned.
    pub async fn run(&mut self, generations: u64) -> Result<Vec<GenerationRecord>> {
        let mut records = Vec::new();
        for _ in 0..generations {
            if self.shutdown.is_shutdown_requested() {
                break;
            }
            let outcome = self.run_generation().await?;
            let record = GenerationRecord::from_outcome(self.run_id, &outcome, &self.fingerprint);
            self.history.log_generation(&record)?;
            records.push(record);
        }
        Ok(records)
    }

    /// Samples a population and ticks it until extinction, the tick cap, or
    /// shutdown.
    pub async fn run_generation(&mut self) -> Result<GenerationOutcome<FeedForward>> {
        let size = self.controller.config().population.size;
        let policies: Vec<FeedForward> = (0..size)
            .map(|_| FeedForward::new_random_with_rng(HIDDEN_LAYERS, &mut self.rng))
            .collect();
        let mut run = self.controller.start_generation_with_policies(policies)?;

        let mut pacer = match self.mode {
            RunMode::Paced => Some(tokio::time::interval(run.clock().interval())),
            RunMode::Headless => None,
        };

        loop {
            if self.shutdown.is_shutdown_requested() {
                run.cancel();
            }
            match pacer.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None if run.tick() % YIELD_EVERY == 0 => tokio::task::yield_now().await,
                None => {}
            }

            let status = self.controller.tick(&mut run)?;
            if self.mode == RunMode::Paced {
                self.snapshots.send_replace(Some(run.snapshot()));
            }
            if let TickStatus::Finished(_) = status {
                break;
            }
        }

        Ok(self.controller.finish(run))
    }
}
