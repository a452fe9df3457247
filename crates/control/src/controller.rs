//! Deciding which particles of a cell to split or delete

// crate modules
use crate::action::ControlAction;
use crate::error::{Error, Result};

// pcdvc modules
use pcdvc_config::Config;
use pcdvc_swarm::{CellPopulation, ParticleId};
use pcdvc_utils::SliceExt;

// external crates
use itertools::Itertools;
use log::{debug, trace};

/// Relative volume of one particle against the cell mean
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: ParticleId,
    weight: f64,
    relative: f64,
    inflow: bool,
}

/// Population control decisions for a cell
///
/// `weights` must be aligned with the particle order of the cell, as returned
/// by the coverage estimate. Each particle's relative volume is its weight
/// divided by the mean weight of the cell.
///
/// - Relative volume above `upper_volume_threshold` marks a split candidate.
///   The largest excess goes first, and at most `max_splits` are kept.
/// - Relative volume below `lower_volume_threshold` marks a deletion
///   candidate. The largest shortfall goes first, and at most `max_deletions`
///   are kept. Inflow particles are never candidates when `in_flow` is off.
/// - With `in_flow` on, a cell that would hold fewer particles than the
///   repopulation target after its deletions also splits its largest
///   remaining particles, sharing the same `max_splits` budget. Nothing is
///   deleted from a cell that is already below the target.
///
/// Exact ties are ordered by particle handle. Splits come first in the output
/// followed by deletions, and the output only depends on the inputs.
///
/// ```rust
/// # use pcdvc_config::{Config, Settings};
/// # use pcdvc_control::{evaluate, ControlAction};
/// # use pcdvc_swarm::{CellId, Extent, Swarm};
/// let config = Config::new(Settings {
///     upper_volume_threshold: 1.5,
///     ..Settings::new(2)
/// })
/// .unwrap();
///
/// let mut swarm = Swarm::new(&vec![Extent::unit()]).unwrap();
/// let big = swarm.insert(CellId(0), [0.25, 0.5, 0.5]).unwrap();
/// swarm.insert(CellId(0), [0.75, 0.5, 0.5]).unwrap();
/// swarm.insert(CellId(0), [0.9, 0.5, 0.5]).unwrap();
///
/// // mean weight is 1/3, so the first particle is twice the mean
/// let cell = swarm.cell(CellId(0)).unwrap();
/// let actions = evaluate(cell, &[2.0 / 3.0, 0.25, 1.0 / 12.0], &config).unwrap();
///
/// assert_eq!(actions[0], ControlAction::Split(big));
/// ```
pub fn evaluate(
    cell: &CellPopulation,
    weights: &[f64],
    config: &Config,
) -> Result<Vec<ControlAction>> {
    let candidates = relative_volumes(cell, weights)?;

    let upper = config.upper_volume_threshold();
    let lower = config.lower_volume_threshold();

    let splits = candidates
        .iter()
        .filter(|c| c.relative > upper)
        .sorted_by(|a, b| {
            (b.relative - upper)
                .total_cmp(&(a.relative - upper))
                .then(a.id.cmp(&b.id))
        })
        .take(config.max_splits())
        .map(|c| c.id)
        .collect::<Vec<ParticleId>>();

    // nothing is deleted while a cell is below its repopulation target
    let drained = config.in_flow() && cell.len() < config.repopulation_target();
    let max_deletions = if drained { 0 } else { config.max_deletions() };

    let deletions = candidates
        .iter()
        .filter(|c| c.relative < lower)
        .filter(|c| config.in_flow() || !c.inflow)
        .sorted_by(|a, b| {
            (lower - b.relative)
                .total_cmp(&(lower - a.relative))
                .then(a.id.cmp(&b.id))
        })
        .take(max_deletions)
        .map(|c| c.id)
        .collect::<Vec<ParticleId>>();

    let refills = repopulation(cell, &candidates, &splits, &deletions, config);

    debug!(
        "{}: {} splits, {} refills, {} deletions from {} particles",
        cell.id(),
        splits.len(),
        refills.len(),
        deletions.len(),
        cell.len()
    );

    let actions = splits
        .into_iter()
        .chain(refills)
        .map(ControlAction::Split)
        .chain(deletions.into_iter().map(ControlAction::Delete))
        .collect::<Vec<ControlAction>>();

    for action in &actions {
        trace!("{}: {action}", cell.id());
    }

    Ok(actions)
}

/// Check the inputs and compute the relative volume of every particle
fn relative_volumes(cell: &CellPopulation, weights: &[f64]) -> Result<Vec<Candidate>> {
    if cell.is_empty() {
        return Err(pcdvc_dvc::Error::DegenerateCell { cell: cell.id() }.into());
    }

    if weights.len() != cell.len() {
        return Err(Error::WeightCountMismatch {
            cell: cell.id(),
            expected: cell.len(),
            found: weights.len(),
        });
    }

    let undefined = || Error::UndefinedWeights { cell: cell.id() };
    let mean = weights.try_mean().map_err(|_| undefined())?;
    if mean <= 0.0 || weights.iter().any(|w| *w < 0.0) {
        return Err(undefined());
    }

    Ok(cell
        .particles
        .iter()
        .zip(weights)
        .map(|(p, &weight)| Candidate {
            id: p.id,
            weight,
            relative: weight / mean,
            inflow: p.inflow,
        })
        .collect())
}

/// Extra splits for a cell that has been drained below its target
///
/// The largest particles not already chosen for a split or deletion are
/// split until the target is reached, counting the batch's own splits and
/// deletions, or the split budget runs out.
fn repopulation(
    cell: &CellPopulation,
    candidates: &[Candidate],
    splits: &[ParticleId],
    deletions: &[ParticleId],
    config: &Config,
) -> Vec<ParticleId> {
    let target = config.repopulation_target();
    let remaining = cell.len().saturating_sub(deletions.len());
    if !config.in_flow() || remaining >= target {
        return Vec::new();
    }

    let budget = config.max_splits().saturating_sub(splits.len());
    let needed = target.saturating_sub(remaining).saturating_sub(splits.len());

    candidates
        .iter()
        .filter(|c| !splits.contains(&c.id) && !deletions.contains(&c.id))
        .sorted_by(|a, b| b.weight.total_cmp(&a.weight).then(a.id.cmp(&b.id)))
        .take(budget.min(needed))
        .map(|c| c.id)
        .collect()
}
