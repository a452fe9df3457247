//! Result and Error types for pcdvc-dvc

// pcdvc modules
use pcdvc_swarm::CellId;

/// Type alias for `Result<T, dvc::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `pcdvc-dvc` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Weights are undefined for a cell without particles, which means
    /// something upstream has already gone wrong
    #[error("{cell} holds no particles")]
    DegenerateCell { cell: CellId },

    /// Failure in the particle store
    #[error("swarm operation failed")]
    SwarmError(#[from] pcdvc_swarm::Error),
}
