//! # Flapper Core
//!
//! Tick-driven simulation of a bird population flying through scrolling pipe
//! gaps, each bird steered by an external decision function.
//!
//! This crate contains the deterministic simulation logic:
//! - Agent kinematics with jump impulses and a clamped fall
//! - Procedurally spawned, scrolling obstacles
//! - Pixel-accurate silhouette collision
//! - Population culling that keeps agent, policy and fitness together
//! - Generation bookkeeping (score, pass bonuses, termination)
//!
//! ## Example
//!
//! ```
//! use flapper_core::config::AppConfig;
//! use flapper_core::generation::GenerationController;
//! use flapper_core::mask::ProceduralSilhouettes;
//! use flapper_data::Observation;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! let mut controller = GenerationController::new(config, ProceduralSilhouettes::new()).unwrap();
//!
//! // Jump whenever the bird sinks below the gap center.
//! let policy = |obs: &Observation| if obs.y > 300.0 { 1.0_f64 } else { 0.0 };
//! let run = controller.start_generation_with_policies(vec![policy; 10]).unwrap();
//! let outcome = controller.run_to_end(run, |r| r.tick() >= 300).unwrap();
//! assert_eq!(outcome.results.len(), 10);
//! ```

/// Decision function capability and a reference feed-forward policy
pub mod brain;
/// Fixed-rate tick counter
pub mod clock;
/// Agent versus pipe overlap tests
pub mod collision;
/// Configuration management for simulation parameters
pub mod config;
/// Engine error type
pub mod error;
/// Generation lifecycle and scoring
pub mod generation;
/// Cosmetic ground scroll
pub mod ground;
/// Occupancy bitmaps and the silhouette provider seam
pub mod mask;
/// Run metrics and structured logging
pub mod metrics;
/// Scrolling obstacle field
pub mod obstacles;
/// Agent kinematics
pub mod physics;
/// Living members of a generation and the culling protocol
pub mod population;

pub use brain::{DecisionFunction, FeedForward};
pub use error::SimError;
pub use generation::{GenerationController, GenerationOutcome, GenerationRun, Termination, TickStatus};
pub use mask::{Mask, ProceduralSilhouettes, Segment, SilhouetteProvider};
pub use metrics::{init_logging, Metrics};
