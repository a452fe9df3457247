//! Result and Error types for pcdvc-control

// pcdvc modules
use pcdvc_swarm::{CellId, ParticleId};

/// Type alias for `Result<T, control::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `pcdvc-control` crate
///
/// Errors about a single action are recoverable. The action is rejected, the
/// rest of the cell batch continues, and the rejection is recorded in the
/// pass summary. Anything else aborts the pass.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Deletion refused, it would remove the last particle of the cell
    #[error("deleting {particle} would leave {cell} empty")]
    DeleteUnderflow { cell: CellId, particle: ParticleId },

    /// Split refused, the cell is already at its particle cap
    #[error("splitting {particle} would take {cell} over the cap of {cap} particles")]
    SplitOverflow {
        cell: CellId,
        particle: ParticleId,
        cap: usize,
    },

    /// Deletion of an inflow particle while `in_flow` is off
    #[error("{particle} in {cell} is an inflow particle and inflow deletion is disabled")]
    InflowProtected { cell: CellId, particle: ParticleId },

    /// Action names a particle the cell does not hold
    #[error("{particle} is not held by {cell}")]
    ParticleNotFound { cell: CellId, particle: ParticleId },

    /// The reserved handles for the cell are used up
    #[error("no particle handles left to split {particle} in {cell}")]
    HandlesExhausted { cell: CellId, particle: ParticleId },

    /// Weights do not line up with the particles of the cell
    #[error("{cell} holds {expected} particles but {found} weights were given")]
    WeightCountMismatch {
        cell: CellId,
        expected: usize,
        found: usize,
    },

    /// Weights with no positive finite mean, or a negative entry
    #[error("weights of {cell} do not have a positive finite mean")]
    UndefinedWeights { cell: CellId },

    /// A committed batch would have left the cell empty
    #[error("population control would leave {cell} empty")]
    EmptiedCell { cell: CellId },

    /// Failure in the coverage estimate
    #[error("coverage estimate failed")]
    CoverageError(#[from] pcdvc_dvc::Error),

    /// Failure in the particle store
    #[error("swarm operation failed")]
    SwarmError(#[from] pcdvc_swarm::Error),
}

impl Error {
    /// Only the action is rejected, the pass carries on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DeleteUnderflow { .. }
                | Self::SplitOverflow { .. }
                | Self::InflowProtected { .. }
                | Self::ParticleNotFound { .. }
                | Self::HandlesExhausted { .. }
        )
    }
}
