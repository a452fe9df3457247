//! Discrete Voronoi coverage of a single cell

// crate modules
use crate::error::{Error, Result};

// pcdvc modules
use pcdvc_config::{Config, Normalisation};
use pcdvc_swarm::{CellId, CellPopulation, Particle, ParticleId};

// external crates
use log::{debug, trace};
use nalgebra::Vector3;

/// Result of sampling the discrete Voronoi regions of a cell
///
/// All lists are aligned with the particle order of the
/// [CellPopulation] they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    /// The cell that was sampled
    pub cell: CellId,
    /// Particle handles, in particle order
    pub particles: Vec<ParticleId>,
    /// Normalised weight of each particle
    pub weights: Vec<f64>,
    /// Number of sub-cell samples claimed by each particle
    pub samples: Vec<usize>,
    /// Centroid of the samples claimed by each particle
    ///
    /// A particle that claimed nothing has its own position as a centroid.
    pub centroids: Vec<Vector3<f64>>,
}

impl Coverage {
    /// Number of particles covered
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// No particles covered, never true for a successful estimate
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weight of a particle by handle
    pub fn weight(&self, id: ParticleId) -> Option<f64> {
        self.index_of(id).map(|i| self.weights[i])
    }

    /// Centroid of the region of a particle by handle
    pub fn centroid(&self, id: ParticleId) -> Option<&Vector3<f64>> {
        self.index_of(id).map(|i| &self.centroids[i])
    }

    fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.particles.iter().position(|p| *p == id)
    }
}

/// Weights of every particle in a cell, in particle order
///
/// Shorthand for the weights of a full [compute_coverage()] estimate.
///
/// ```rust
/// # use pcdvc_config::{Config, Settings};
/// # use pcdvc_dvc::compute_weights;
/// # use pcdvc_swarm::{CellId, Extent, Swarm};
/// let config = Config::new(Settings::new(2).with_resolution(10)).unwrap();
///
/// let mut swarm = Swarm::new(&vec![Extent::unit()]).unwrap();
/// swarm.insert(CellId(0), [0.25, 0.5, 0.5]).unwrap();
/// swarm.insert(CellId(0), [0.75, 0.5, 0.5]).unwrap();
///
/// // each particle owns one half of the cell
/// let weights = compute_weights(swarm.cell(CellId(0)).unwrap(), &config).unwrap();
/// assert_eq!(weights, vec![0.5, 0.5]);
/// ```
pub fn compute_weights(cell: &CellPopulation, config: &Config) -> Result<Vec<f64>> {
    Ok(compute_coverage(cell, config)?.weights)
}

/// Estimate the volume each particle covers by sampling a regular sub-grid
///
/// The cell is split into `resolution_x × resolution_y × resolution_z` equal
/// sub-cells. Every sub-cell centroid is given to its nearest particle, and
/// each particle's weight is its share of the samples scaled to the
/// normalisation target (the cell volume, or 1).
///
/// An exact distance tie goes to the particle with the lowest handle, so a
/// sample is never shared and repeated calls give identical results.
///
/// Cost is `O(samples × particles)` for the cell.
pub fn compute_coverage(cell: &CellPopulation, config: &Config) -> Result<Coverage> {
    if cell.is_empty() {
        return Err(Error::DegenerateCell { cell: cell.id() });
    }

    let [rx, ry, rz] = config.resolution();
    let extent = cell.extent();
    let step = extent
        .lengths()
        .component_div(&Vector3::new(rx as f64, ry as f64, rz as f64));

    let n = cell.len();
    let mut samples = vec![0_usize; n];
    let mut sums = vec![Vector3::<f64>::zeros(); n];

    for k in 0..rz {
        for j in 0..ry {
            for i in 0..rx {
                let offset = Vector3::new(i as f64 + 0.5, j as f64 + 0.5, k as f64 + 0.5);
                let point = extent.min() + offset.component_mul(&step);
                let owner = nearest(&cell.particles, &point);
                samples[owner] += 1;
                sums[owner] += point;
            }
        }
    }

    let target = match config.normalisation() {
        Normalisation::CellVolume => cell.volume(),
        Normalisation::Unit => 1.0,
    };
    let total = config.samples_per_cell() as f64;

    let weights = samples
        .iter()
        .map(|&count| count as f64 / total * target)
        .collect::<Vec<f64>>();

    let centroids = cell
        .particles
        .iter()
        .zip(samples.iter().zip(&sums))
        .map(|(particle, (&count, sum))| match count {
            0 => particle.position,
            _ => *sum / count as f64,
        })
        .collect::<Vec<Vector3<f64>>>();

    let uncovered = samples.iter().filter(|&&c| c == 0).count();
    if uncovered > 0 {
        debug!(
            "{}: {uncovered}/{n} particles received no samples",
            cell.id()
        );
    }
    trace!("{}: samples per particle {samples:?}", cell.id());

    Ok(Coverage {
        cell: cell.id(),
        particles: cell.particles.iter().map(|p| p.id).collect(),
        weights,
        samples,
        centroids,
    })
}

/// Recompute the coverage of a cell and store the weights on its particles
pub fn assign_weights(cell: &mut CellPopulation, config: &Config) -> Result<Coverage> {
    let coverage = compute_coverage(cell, config)?;
    cell.set_weights(&coverage.weights)?;
    Ok(coverage)
}

/// Index of the particle nearest to a point, lowest handle on exact ties
fn nearest(particles: &[Particle], point: &Vector3<f64>) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    let mut best_id = ParticleId(u64::MAX);

    for (index, particle) in particles.iter().enumerate() {
        let distance = particle.distance_squared(point);
        if distance < best_distance || (distance == best_distance && particle.id < best_id) {
            best = index;
            best_distance = distance;
            best_id = particle.id;
        }
    }

    best
}
