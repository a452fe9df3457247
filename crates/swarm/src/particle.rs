//! Module for particle-related data and implementations

// external crates
use nalgebra::Vector3;

/// Opaque handle identifying a particle in a [Swarm](crate::Swarm)
///
/// Handles are ordered, which is what breaks exact distance ties in the
/// coverage estimate. The lowest handle always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub u64);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "particle {}", self.0)
    }
}

/// A material point carrying a position and an integration weight
///
/// The `weight` is the effective volume the particle represents. It is
/// overwritten every time the coverage of its cell is recomputed, and moved
/// between particles when the population of the cell is adjusted.
///
/// Particles injected at an inflow boundary carry the `inflow` flag so that
/// the population policy can decide whether they may be deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Unique handle
    pub id: ParticleId,
    /// Global (x, y, z) coordinates
    pub position: Vector3<f64>,
    /// Integration weight, never negative
    pub weight: f64,
    /// Particle was injected at an inflow boundary
    pub inflow: bool,
}

impl Particle {
    /// New particle with no weight assigned yet
    pub fn new(id: ParticleId, position: impl Into<Vector3<f64>>) -> Self {
        Self {
            id,
            position: position.into(),
            weight: 0.0,
            inflow: false,
        }
    }

    /// Squared distance to a point, cheaper than the distance for comparisons
    pub fn distance_squared(&self, point: &Vector3<f64>) -> f64 {
        (self.position - point).norm_squared()
    }
}
