//! Module for the cell-partitioned particle store

// crate modules
use crate::error::{Error, Result};
use crate::{CellGeometry, CellId, CellPopulation, Particle, ParticleId};

// external crates
use log::trace;
use nalgebra::Vector3;

/// Particle store partitioned by cell ownership
///
/// Every particle belongs to exactly one [CellPopulation], so work on
/// different cells never touches shared state. Particle handles are unique
/// across the whole swarm and are never reused.
///
/// ```rust
/// # use pcdvc_swarm::{CellId, Extent, Swarm};
/// let geometry = vec![Extent::unit()];
/// let mut swarm = Swarm::new(&geometry).unwrap();
///
/// let id = swarm.insert(CellId(0), [0.5, 0.5, 0.5]).unwrap();
/// assert_eq!(swarm.len(), 1);
///
/// // particles outside the cell are refused
/// assert!(swarm.insert(CellId(0), [2.0, 0.5, 0.5]).is_err());
///
/// swarm.remove(id).unwrap();
/// assert!(swarm.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Swarm {
    cells: Vec<CellPopulation>,
    next_id: u64,
}

impl Swarm {
    /// Empty swarm with one population per cell of the geometry
    pub fn new<G: CellGeometry + ?Sized>(geometry: &G) -> Result<Self> {
        let cells = (0..geometry.num_cells())
            .map(|i| {
                let id = CellId(i);
                geometry
                    .extent(id)
                    .map(|extent| CellPopulation::new(id, extent))
                    .ok_or(Error::CellNotFound(id))
            })
            .collect::<Result<Vec<CellPopulation>>>()?;

        Ok(Self { cells, next_id: 0 })
    }

    /// Number of cells
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Total number of particles across all cells
    pub fn len(&self) -> usize {
        self.cells.iter().map(|c| c.len()).sum()
    }

    /// No particles in any cell
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// All cell populations
    pub fn cells(&self) -> &[CellPopulation] {
        &self.cells
    }

    /// All cell populations, mutably
    pub fn cells_mut(&mut self) -> &mut [CellPopulation] {
        &mut self.cells
    }

    /// Population of a single cell
    pub fn cell(&self, id: CellId) -> Result<&CellPopulation> {
        self.cells.get(id.0).ok_or(Error::CellNotFound(id))
    }

    /// Population of a single cell, mutably
    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut CellPopulation> {
        self.cells.get_mut(id.0).ok_or(Error::CellNotFound(id))
    }

    /// Seed a particle in a cell
    pub fn insert(
        &mut self,
        cell: CellId,
        position: impl Into<Vector3<f64>>,
    ) -> Result<ParticleId> {
        self.insert_particle(cell, position.into(), false)
    }

    /// Seed a particle injected at an inflow boundary
    pub fn insert_inflow(
        &mut self,
        cell: CellId,
        position: impl Into<Vector3<f64>>,
    ) -> Result<ParticleId> {
        self.insert_particle(cell, position.into(), true)
    }

    /// Remove a particle from whichever cell holds it
    ///
    /// The weight of the removed particle is not redistributed, population
    /// control does that for its own deletions.
    pub fn remove(&mut self, id: ParticleId) -> Result<Particle> {
        self.cells
            .iter_mut()
            .find_map(|cell| cell.take(id))
            .ok_or(Error::ParticleNotFound(id))
    }

    /// Find a particle and the cell that holds it
    pub fn particle(&self, id: ParticleId) -> Option<(CellId, &Particle)> {
        self.cells
            .iter()
            .find_map(|cell| cell.particle(id).map(|p| (cell.id(), p)))
    }

    /// Reserve a contiguous range of `n` unused particle handles
    ///
    /// Fails without reserving anything if the handle space would run out.
    pub fn reserve_ids(&mut self, n: usize) -> Result<IdBlock> {
        let end = u64::try_from(n)
            .ok()
            .and_then(|n| self.next_id.checked_add(n))
            .ok_or(Error::IdSpaceExhausted { requested: n })?;

        let block = IdBlock {
            next: self.next_id,
            end,
        };
        self.next_id = end;
        Ok(block)
    }

    fn insert_particle(
        &mut self,
        cell: CellId,
        position: Vector3<f64>,
        inflow: bool,
    ) -> Result<ParticleId> {
        let id = ParticleId(self.next_id);
        let population = self.cell_mut(cell)?;
        population.push(Particle {
            inflow,
            ..Particle::new(id, position)
        })?;

        // only consume the handle once the particle is accepted
        self.next_id += 1;
        trace!("Inserted {id} into {cell}");
        Ok(id)
    }
}

/// A contiguous range of particle handles reserved from a [Swarm]
///
/// Blocks are handed out before parallel work starts so that each cell can
/// create particles without coordinating with the others. The handles a cell
/// receives depend only on its position, not on thread scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdBlock {
    next: u64,
    end: u64,
}

impl IdBlock {
    /// Take the next handle, `None` once the block is used up
    pub fn next_id(&mut self) -> Option<ParticleId> {
        if self.next >= self.end {
            return None;
        }
        let id = ParticleId(self.next);
        self.next += 1;
        Some(id)
    }

    /// Handles left in the block
    pub fn remaining(&self) -> usize {
        (self.end - self.next) as usize
    }

    /// Split into consecutive blocks of the given sizes
    ///
    /// Blocks are handed out in order. Once the handles run out the remaining
    /// blocks are short or empty.
    ///
    /// ```rust
    /// # use pcdvc_swarm::{Extent, ParticleId, Swarm};
    /// let mut swarm = Swarm::new(&vec![Extent::unit()]).unwrap();
    /// let mut blocks = swarm.reserve_ids(5).unwrap().partition(&[3, 0, 4]);
    ///
    /// assert_eq!(blocks.len(), 3);
    /// assert_eq!(blocks[0].remaining(), 3);
    /// assert_eq!(blocks[1].next_id(), None);
    /// assert_eq!(blocks[2].remaining(), 2);
    /// assert_eq!(blocks[2].next_id(), Some(ParticleId(3)));
    /// ```
    pub fn partition(self, sizes: &[usize]) -> Vec<IdBlock> {
        let mut next = self.next;
        sizes
            .iter()
            .map(|&size| {
                let end = next.saturating_add(size as u64).min(self.end);
                let block = IdBlock { next, end };
                next = end;
                block
            })
            .collect()
    }
}
