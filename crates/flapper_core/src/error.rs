//! Errors surfaced by the simulation engine.
//!
//! The engine itself has no failure modes: deaths, obstacle expiry and an
//! empty population are ordinary state transitions. Everything here is a
//! fault in an external collaborator that aborts the running generation.

use flapper_data::AgentId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// The decision function returned an error.
    #[error("Decision function for {agent} failed: {source}")]
    PolicyFailed {
        agent: AgentId,
        #[source]
        source: anyhow::Error,
    },

    /// The decision function produced NaN or infinity.
    #[error("Decision function for {agent} produced a non-finite action: {value}")]
    NonFiniteAction { agent: AgentId, value: f64 },

    /// The silhouette provider had no mask for an entity.
    #[error("Silhouette mask unavailable: {what}")]
    MaskUnavailable { what: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn mask_unavailable<S: Into<String>>(what: S) -> Self {
        Self::MaskUnavailable { what: what.into() }
    }

    /// The agent whose decision function failed, if any.
    #[must_use]
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Self::PolicyFailed { agent, .. } | Self::NonFiniteAction { agent, .. } => Some(*agent),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for SimError {
    fn from(e: anyhow::Error) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}
