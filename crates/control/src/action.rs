//! Population control decisions

// pcdvc modules
use pcdvc_swarm::{CellId, ParticleId};

// crate modules
use crate::error::Error;

/// A structural change requested for one particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Halve the particle, creating a new one nearby with the other half
    Split(ParticleId),
    /// Remove the particle, sharing its weight with the rest of the cell
    Delete(ParticleId),
}

impl ControlAction {
    /// The particle the action applies to
    pub fn particle(&self) -> ParticleId {
        match self {
            Self::Split(id) | Self::Delete(id) => *id,
        }
    }

    /// Action is a split
    pub fn is_split(&self) -> bool {
        matches!(self, Self::Split(_))
    }

    /// Action is a deletion
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

impl std::fmt::Display for ControlAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Split(id) => write!(f, "split {id}"),
            Self::Delete(id) => write!(f, "delete {id}"),
        }
    }
}

/// An action that was refused, and why
#[derive(Debug, PartialEq)]
pub struct Rejection {
    /// Cell the action was applied to
    pub cell: CellId,
    /// The refused action
    pub action: ControlAction,
    /// Reason for the refusal, always a recoverable error
    pub reason: Error,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {} rejected ({})", self.cell, self.action, self.reason)
    }
}
