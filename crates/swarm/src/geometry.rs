//! Read-only cell geometry provider

// crate modules
use crate::{CellId, Extent};

/// Provides the bounding geometry of every cell in a mesh
///
/// Meshes are owned elsewhere. The weighting only needs to know how many
/// cells there are and the extent of each one, so anything able to answer
/// those two questions can seed a [Swarm](crate::Swarm).
///
/// Implemented for plain lists of [Extent] where cell `i` is entry `i`.
pub trait CellGeometry {
    /// Number of cells in the mesh
    fn num_cells(&self) -> usize;

    /// Bounding geometry of a cell, `None` if the cell does not exist
    fn extent(&self, cell: CellId) -> Option<Extent>;
}

impl CellGeometry for [Extent] {
    fn num_cells(&self) -> usize {
        self.len()
    }

    fn extent(&self, cell: CellId) -> Option<Extent> {
        self.get(cell.0).copied()
    }
}

impl CellGeometry for Vec<Extent> {
    fn num_cells(&self) -> usize {
        self.as_slice().num_cells()
    }

    fn extent(&self, cell: CellId) -> Option<Extent> {
        self.as_slice().extent(cell)
    }
}
