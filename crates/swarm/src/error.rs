//! Result and Error types for pcdvc-swarm

// crate modules
use crate::{CellId, ParticleId};

/// Type alias for `Result<T, swarm::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `pcdvc-swarm` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Cell bounds that are flat, inverted, or not finite along an axis
    #[error("extent has no volume along axis {axis} (min {min}, max {max})")]
    InvalidExtent { axis: usize, min: f64, max: f64 },

    /// Particle seeded outside the extent of its cell
    #[error("particle at {position:?} lies outside {cell}")]
    ParticleOutsideCell { cell: CellId, position: [f64; 3] },

    /// No such cell in the geometry
    #[error("{0} not found")]
    CellNotFound(CellId),

    /// No cell holds the particle
    #[error("{0} not found")]
    ParticleNotFound(ParticleId),

    /// Weights given for a cell do not line up with its particles
    #[error("{cell} holds {expected} particles but {found} weights were given")]
    WeightCountMismatch {
        cell: CellId,
        expected: usize,
        found: usize,
    },

    /// Weights must be finite and non-negative
    #[error("particle weight must be finite and non-negative, found {0}")]
    NegativeWeight(f64),

    /// Not enough unused particle handles left to reserve
    #[error("cannot reserve {requested} more particle handles")]
    IdSpaceExhausted { requested: usize },
}
