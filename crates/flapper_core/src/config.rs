//! Configuration management for simulation parameters.
//!
//! Every numeric constant the engine uses lives here, mapped to sections of
//! `config.toml`. Defaults reproduce the classic playfield.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! target_fps = 30
//!
//! [world]
//! ground_y = 730.0
//! seed = 42
//!
//! [obstacles]
//! gap_size = 200.0
//! scroll_velocity = 5.0
//!
//! [fitness]
//! pass_bonus = 5.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Playfield geometry and spawn positions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub ground_y: f64,
    pub ceiling_y: f64,
    pub agent_start_x: f64,
    pub agent_start_y: f64,
    /// Where the first obstacle appears and where replacements re-enter.
    pub spawn_x: f64,
    /// Width of one ground tile; purely cosmetic.
    pub ground_width: f64,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_y: 730.0,
            ceiling_y: 0.0,
            agent_start_x: 230.0,
            agent_start_y: 350.0,
            spawn_x: 600.0,
            ground_width: 672.0,
            seed: None,
        }
    }
}

/// How the visual tilt evolves while an agent is falling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TiltModel {
    /// Tilt snaps to `tilt_max` and only decays once already below
    /// `tilt_floor`, which never happens from a standing start.
    #[default]
    Classic,
    /// Tilt falls by `tilt_decay_rate` per tick until it reaches `tilt_floor`.
    Decaying,
}

/// Agent kinematics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub jump_impulse: f64,
    pub gravity_coefficient: f64,
    pub max_fall_step: f64,
    /// Extra upward displacement added while the agent is rising.
    pub lift_bias: f64,
    pub tilt_max: f64,
    pub tilt_decay_rate: f64,
    pub tilt_floor: f64,
    /// Distance below the jump baseline still treated as "near the apex".
    pub apex_window: f64,
    pub tilt_model: TiltModel,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            jump_impulse: -10.5,
            gravity_coefficient: 1.5,
            max_fall_step: 16.0,
            lift_bias: 2.0,
            tilt_max: 25.0,
            tilt_decay_rate: 20.0,
            tilt_floor: -90.0,
            apex_window: 50.0,
            tilt_model: TiltModel::Classic,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ObstacleConfig {
    pub gap_size: f64,
    pub scroll_velocity: f64,
    /// Inclusive lower bound of the gap center draw.
    pub gap_center_min: i32,
    /// Exclusive upper bound of the gap center draw.
    pub gap_center_max: i32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            gap_size: 200.0,
            scroll_velocity: 5.0,
            gap_center_min: 50,
            gap_center_max: 450,
        }
    }
}

/// Reward shaping handed to the evolution driver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FitnessConfig {
    pub survival_reward: f64,
    pub pass_bonus: f64,
    pub collision_penalty: f64,
    /// Decision outputs strictly above this trigger a jump.
    pub jump_threshold: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            survival_reward: 0.1,
            pass_bonus: 5.0,
            collision_penalty: 1.0,
            jump_threshold: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    pub size: usize,
    pub generations: u64,
    /// Hard cap on ticks per generation; `None` runs until extinction.
    pub max_ticks: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 50,
            generations: 50,
            max_ticks: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub obstacles: ObstacleConfig,
    pub fitness: FitnessConfig,
    pub population: PopulationConfig,
    pub target_fps: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            physics: PhysicsConfig::default(),
            obstacles: ObstacleConfig::default(),
            fitness: FitnessConfig::default(),
            population: PopulationConfig::default(),
            target_fps: 30,
        }
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(
            self.world.ground_y > self.world.ceiling_y,
            "Ground line must sit below the ceiling"
        );
        anyhow::ensure!(
            self.world.agent_start_y >= self.world.ceiling_y
                && self.world.agent_start_y < self.world.ground_y,
            "Agents must start between ceiling and ground"
        );
        anyhow::ensure!(
            self.world.ground_width > 0.0,
            "Ground tile width must be positive"
        );

        // Physics validation
        anyhow::ensure!(
            self.physics.max_fall_step > 0.0,
            "Max fall step must be positive"
        );
        anyhow::ensure!(
            self.physics.gravity_coefficient >= 0.0,
            "Gravity coefficient must be non-negative"
        );
        anyhow::ensure!(
            self.physics.lift_bias >= 0.0,
            "Lift bias must be non-negative"
        );
        anyhow::ensure!(
            self.physics.tilt_decay_rate >= 0.0,
            "Tilt decay rate must be non-negative"
        );
        anyhow::ensure!(
            self.physics.tilt_floor < self.physics.tilt_max,
            "Tilt floor must be below max tilt"
        );

        // Obstacle validation
        anyhow::ensure!(self.obstacles.gap_size > 0.0, "Gap size must be positive");
        anyhow::ensure!(
            self.obstacles.scroll_velocity > 0.0,
            "Scroll velocity must be positive"
        );
        anyhow::ensure!(
            self.obstacles.gap_center_min < self.obstacles.gap_center_max,
            "Gap center range is empty"
        );

        // Fitness validation
        anyhow::ensure!(
            self.fitness.survival_reward >= 0.0,
            "Survival reward must be non-negative"
        );
        anyhow::ensure!(
            self.fitness.collision_penalty >= 0.0,
            "Collision penalty must be non-negative"
        );

        // Population validation
        anyhow::ensure!(self.population.size > 0, "Population must not be empty");
        anyhow::ensure!(
            self.population.size <= 100_000,
            "Population too large (max 100000)"
        );

        // Target FPS validation
        anyhow::ensure!(self.target_fps > 0, "Target FPS must be positive");
        anyhow::ensure!(self.target_fps <= 240, "Target FPS too high (max 240)");

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Hash of the sections that change simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(format!("{:?}", self.obstacles).as_bytes());
        hasher.update(format!("{:?}", self.fitness).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_playfield_size_keys_are_ignored() {
        let config = AppConfig::from_toml("[world]\nwidth = 500.0\nheight = 800.0\n").unwrap();
        assert_eq!(config.world, WorldConfig::default());
    }

    #[test]
    fn test_invalid_gap_range() {
        let config = AppConfig {
            obstacles: ObstacleConfig {
                gap_center_min: 300,
                gap_center_max: 300,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_scroll_velocity() {
        let config = AppConfig {
            obstacles: ObstacleConfig {
                scroll_velocity: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ground_above_ceiling() {
        let config = AppConfig {
            world: WorldConfig {
                ground_y: -10.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_target_fps() {
        let config = AppConfig {
            target_fps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("[obstacles]\ngap_size = 150.0\n").unwrap();
        assert_eq!(config.obstacles.gap_size, 150.0);
        assert_eq!(config.obstacles.scroll_velocity, 5.0);
        assert_eq!(config.physics.jump_impulse, -10.5);
        assert_eq!(config.target_fps, 30);
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        assert!(AppConfig::from_toml("target_fps = 0\n").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("definitely/not/here/config.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.obstacles.gap_size = 180.0;
        assert_ne!(config1.fingerprint(), config2.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_population_size() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        config2.population.size = 7;
        assert_eq!(config1.fingerprint(), config2.fingerprint());
    }
}
