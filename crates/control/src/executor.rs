//! Applying split and delete decisions to a cell

// crate modules
use crate::action::{ControlAction, Rejection};
use crate::error::{Error, Result};

// pcdvc modules
use pcdvc_config::Config;
use pcdvc_dvc::Coverage;
use pcdvc_swarm::{CellId, CellPopulation, Extent, IdBlock, Particle, ParticleId};

// external crates
use log::{trace, warn};
use nalgebra::Vector3;

/// Offsets shorter than this fraction of the cell diagonal count as zero
const OFFSET_TOLERANCE: f64 = 1.0e-12;

/// Outcome of applying a batch of actions to one cell
#[derive(Debug, PartialEq)]
pub struct CellReport {
    /// The cell the batch was applied to
    pub cell: CellId,
    /// Handles of particles created by splits, in creation order
    pub created: Vec<ParticleId>,
    /// Handles of deleted particles, in deletion order
    pub deleted: Vec<ParticleId>,
    /// Actions that were refused
    pub rejections: Vec<Rejection>,
}

impl CellReport {
    fn new(cell: CellId) -> Self {
        Self {
            cell,
            created: Vec::new(),
            deleted: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Number of successful splits
    pub fn splits(&self) -> usize {
        self.created.len()
    }

    /// Number of successful deletions
    pub fn deletions(&self) -> usize {
        self.deleted.len()
    }
}

/// Apply population control actions to a cell, in order
///
/// **Split** halves the weight of a particle and creates a new particle with
/// the other half. The new particle sits at
/// `position + centroid_position_ratio × offset`, where the offset points to
/// the centroid of the particle's region in `coverage`. If that offset is zero
/// (or no coverage is given) the offset to the cell centre is used instead,
/// and then half the cell length along x. The result is clamped into the cell.
/// New handles are taken from `ids`.
///
/// **Delete** removes a particle and shares its weight equally between the
/// particles left in the cell at that moment.
///
/// A refused action leaves the cell as it was and is recorded in the report:
///
/// - deleting the last particle of the cell (`DeleteUnderflow`)
/// - deleting an inflow particle while `in_flow` is off (`InflowProtected`)
/// - splitting past the particle cap (`SplitOverflow`)
/// - unknown particles or running out of handles
///
/// The batch is staged on a copy of the cell and only committed at the end,
/// so the cell is never seen half-updated and never left empty.
pub fn apply(
    cell: &mut CellPopulation,
    actions: &[ControlAction],
    coverage: Option<&Coverage>,
    ids: &mut IdBlock,
    config: &Config,
) -> Result<CellReport> {
    let mut staged = cell.particles.clone();
    let mut report = CellReport::new(cell.id());

    for action in actions {
        let outcome = match *action {
            ControlAction::Split(id) => {
                let centroid = coverage.and_then(|c| c.centroid(id));
                split(&mut staged, cell.id(), cell.extent(), id, centroid, ids, config)
                    .map(|new| report.created.push(new))
            }
            ControlAction::Delete(id) => {
                delete(&mut staged, cell.id(), id, config).map(|_| report.deleted.push(id))
            }
        };

        match outcome {
            Ok(()) => trace!("{}: applied {action}", cell.id()),
            Err(reason) if reason.is_recoverable() => {
                warn!("{}: {action} rejected, {reason}", cell.id());
                report.rejections.push(Rejection {
                    cell: cell.id(),
                    action: *action,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    if staged.is_empty() {
        return Err(Error::EmptiedCell { cell: cell.id() });
    }

    cell.particles = staged;
    Ok(report)
}

/// Split one particle in the staged set, returning the new handle
fn split(
    staged: &mut Vec<Particle>,
    cell: CellId,
    extent: &Extent,
    particle: ParticleId,
    centroid: Option<&Vector3<f64>>,
    ids: &mut IdBlock,
    config: &Config,
) -> Result<ParticleId> {
    let index = staged
        .iter()
        .position(|p| p.id == particle)
        .ok_or(Error::ParticleNotFound { cell, particle })?;

    let cap = config.particle_cap();
    if staged.len() >= cap {
        return Err(Error::SplitOverflow {
            cell,
            particle,
            cap,
        });
    }

    let id = ids
        .next_id()
        .ok_or(Error::HandlesExhausted { cell, particle })?;

    let parent = &mut staged[index];
    let offset = split_offset(&parent.position, centroid, extent);
    let position = extent.clamp(&(parent.position + offset * config.centroid_position_ratio()));

    let half = parent.weight * 0.5;
    parent.weight = half;

    let child = Particle {
        id,
        position,
        weight: half,
        inflow: parent.inflow,
    };
    staged.push(child);

    Ok(id)
}

/// Direction and length of the displacement for a split particle
fn split_offset(
    position: &Vector3<f64>,
    centroid: Option<&Vector3<f64>>,
    extent: &Extent,
) -> Vector3<f64> {
    let tolerance = extent.lengths().norm() * OFFSET_TOLERANCE;

    centroid
        .map(|c| c - position)
        .into_iter()
        .chain(std::iter::once(extent.centre() - position))
        .find(|offset| offset.norm() > tolerance)
        .unwrap_or_else(|| Vector3::new(extent.lengths().x * 0.5, 0.0, 0.0))
}

/// Delete one particle from the staged set, sharing out its weight
fn delete(
    staged: &mut Vec<Particle>,
    cell: CellId,
    particle: ParticleId,
    config: &Config,
) -> Result<()> {
    let index = staged
        .iter()
        .position(|p| p.id == particle)
        .ok_or(Error::ParticleNotFound { cell, particle })?;

    if staged.len() == 1 {
        return Err(Error::DeleteUnderflow { cell, particle });
    }

    if staged[index].inflow && !config.in_flow() {
        return Err(Error::InflowProtected { cell, particle });
    }

    let removed = staged.remove(index);
    let share = removed.weight / staged.len() as f64;
    for p in staged.iter_mut() {
        p.weight += share;
    }

    Ok(())
}
