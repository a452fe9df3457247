//! Module for the particles owned by a single cell

// crate modules
use crate::error::{Error, Result};
use crate::{Extent, Particle, ParticleId};

// pcdvc modules
use pcdvc_utils::{f, ValueExt};

/// Opaque handle identifying a cell, the index into its geometry provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub usize);

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "cell {}", self.0)
    }
}

/// The set of particles currently held by one cell
///
/// The global swarm is partitioned by cell, so a [CellPopulation] is the unit
/// of work for the weighting and population control. Each one is only ever
/// mutated by a single worker and no locking is needed across cells.
///
/// Particle order is insertion order. Weights returned by the coverage
/// estimate and consumed by the controller are aligned with this order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPopulation {
    id: CellId,
    extent: Extent,
    /// Member particles
    pub particles: Vec<Particle>,
}

impl CellPopulation {
    /// Empty cell covering an extent
    pub fn new(id: CellId, extent: Extent) -> Self {
        Self {
            id,
            extent,
            particles: Vec::new(),
        }
    }

    /// Handle of the cell
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Bounding geometry of the cell
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Volume of the cell
    pub fn volume(&self) -> f64 {
        self.extent.volume()
    }

    /// Number of particles in the cell
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Cell holds no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current particle weights, in particle order
    pub fn weights(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.weight).collect()
    }

    /// Sum of the current particle weights
    pub fn total_weight(&self) -> f64 {
        self.particles.iter().map(|p| p.weight).sum()
    }

    /// Mean particle weight, `None` for an empty cell
    pub fn mean_weight(&self) -> Option<f64> {
        match self.particles.len() {
            0 => None,
            n => Some(self.total_weight() / n as f64),
        }
    }

    /// Find a member particle
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    /// Position of a member particle in the particle order
    pub fn position_of(&self, id: ParticleId) -> Option<usize> {
        self.particles.iter().position(|p| p.id == id)
    }

    /// Overwrite all weights, in particle order
    ///
    /// Lengths must match and every weight must be finite and non-negative,
    /// otherwise nothing is changed.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.particles.len() {
            return Err(Error::WeightCountMismatch {
                cell: self.id,
                expected: self.particles.len(),
                found: weights.len(),
            });
        }

        if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(Error::NegativeWeight(*w));
        }

        for (particle, weight) in self.particles.iter_mut().zip(weights) {
            particle.weight = *weight;
        }
        Ok(())
    }

    /// Add a particle that must lie inside the cell extent
    pub(crate) fn push(&mut self, particle: Particle) -> Result<()> {
        if !self.extent.contains(&particle.position) {
            return Err(Error::ParticleOutsideCell {
                cell: self.id,
                position: [particle.position.x, particle.position.y, particle.position.z],
            });
        }
        self.particles.push(particle);
        Ok(())
    }

    /// Take a particle out of the cell, keeping the order of the others
    pub(crate) fn take(&mut self, id: ParticleId) -> Option<Particle> {
        let index = self.position_of(id)?;
        Some(self.particles.remove(index))
    }
}

impl std::fmt::Display for CellPopulation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("{} [{}] {{\n", self.id, self.extent);
        for p in &self.particles {
            s += &f!(
                "    {:>8} {:>11} {:>11} {:>11} {:>11}{}\n",
                p.id.0,
                p.position[0].sci(4, 2),
                p.position[1].sci(4, 2),
                p.position[2].sci(4, 2),
                p.weight.sci(4, 2),
                if p.inflow { " (inflow)" } else { "" }
            );
        }
        s += "}";
        write!(f, "{}", s)
    }
}
