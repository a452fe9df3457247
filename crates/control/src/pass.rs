//! Running weighting and population control over a whole swarm

// standard library
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// crate modules
use crate::action::Rejection;
use crate::controller::evaluate;
use crate::error::Result;
use crate::executor::{apply, CellReport};

// pcdvc modules
use pcdvc_config::Config;
use pcdvc_dvc::{compute_coverage, Coverage};
use pcdvc_swarm::{CellPopulation, IdBlock, Swarm};
use pcdvc_utils::f;

// external crates
use log::{info, warn};
use rayon::prelude::*;

/// Cooperative cancellation flag shared with whoever drives the pass
///
/// Cheap to clone, every clone refers to the same flag. The pass checks it
/// before starting each cell, so cancelling never interrupts a cell part way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask any pass holding this token to stop at the next cell boundary
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Diagnostics for a complete pass over the swarm
#[derive(Debug, Default, PartialEq)]
pub struct PassSummary {
    /// Cells that went through population control
    pub cells: usize,
    /// Cells left untouched because the pass was cancelled
    pub skipped: usize,
    /// Successful splits across all cells
    pub splits: usize,
    /// Successful deletions across all cells
    pub deletions: usize,
    /// Every refused action
    pub rejections: Vec<Rejection>,
    /// Particles in the swarm at the end of the pass
    pub particles: usize,
    /// The pass stopped early
    pub cancelled: bool,
}

impl PassSummary {
    fn record(&mut self, report: CellReport) {
        self.cells += 1;
        self.splits += report.splits();
        self.deletions += report.deletions();
        self.rejections.extend(report.rejections);
    }
}

impl std::fmt::Display for PassSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = "PassSummary {\n".to_string();
        s += &f!("    cells: {} ({} skipped)\n", self.cells, self.skipped);
        s += &f!("    splits: {}\n", self.splits);
        s += &f!("    deletions: {}\n", self.deletions);
        s += &f!("    rejected: {}\n", self.rejections.len());
        s += &f!("    particles: {}\n", self.particles);
        s += &f!("    cancelled: {}\n}}", self.cancelled);
        write!(f, "{}", s)
    }
}

/// Recompute the weights of every cell in parallel
///
/// All coverage estimates are computed before any weight is written, so an
/// empty cell anywhere fails the call and leaves every weight as it was.
///
/// This is plain discrete Voronoi weighting with no population control.
pub fn update_weights(swarm: &mut Swarm, config: &Config) -> Result<Vec<Coverage>> {
    let coverages = swarm
        .cells()
        .par_iter()
        .map(|cell| compute_coverage(cell, config))
        .collect::<pcdvc_dvc::Result<Vec<Coverage>>>()?;

    swarm
        .cells_mut()
        .par_iter_mut()
        .zip(coverages.par_iter())
        .try_for_each(|(cell, coverage)| cell.set_weights(&coverage.weights))?;

    Ok(coverages)
}

/// One full weighting and population control pass
///
/// 1. Weights of every cell are recomputed in parallel. A cell without
///    particles is fatal and the swarm is left unchanged.
/// 2. Once every weight is known, each cell is evaluated and its actions are
///    applied, again in parallel with one worker per cell.
///
/// Handles for new particles are reserved per cell before step 2, so the
/// result does not depend on how the cells were scheduled. Each cell gets no
/// more handles than it could use, the smallest of `max_splits`, the particle
/// cap, and its current population.
///
/// Refused actions are collected in the [PassSummary]. Cancellation is
/// checked before each cell, cells that have already been committed stay
/// committed and the rest are left untouched.
///
/// ```rust
/// # use pcdvc_config::{Config, Settings};
/// # use pcdvc_control::{run_pass, CancelToken};
/// # use pcdvc_swarm::{CellId, Extent, Swarm};
/// let config = Config::new(Settings::new(4).with_resolution(8)).unwrap();
///
/// let mut swarm = Swarm::new(&vec![Extent::unit(), Extent::unit()]).unwrap();
/// for x in [0.2, 0.4, 0.6, 0.8] {
///     swarm.insert(CellId(0), [x, 0.5, 0.5]).unwrap();
///     swarm.insert(CellId(1), [x, x, 0.5]).unwrap();
/// }
///
/// let summary = run_pass(&mut swarm, &config, &CancelToken::new()).unwrap();
/// assert_eq!(summary.cells, 2);
/// assert_eq!(summary.particles, swarm.len());
/// ```
pub fn run_pass(swarm: &mut Swarm, config: &Config, cancel: &CancelToken) -> Result<PassSummary> {
    if cancel.is_cancelled() {
        warn!("Pass cancelled before it started");
        return Ok(cancelled_summary(swarm));
    }

    let coverages = update_weights(swarm, config)?;

    // barrier, every weight is known from here on
    if cancel.is_cancelled() {
        warn!("Pass cancelled after weighting");
        return Ok(cancelled_summary(swarm));
    }

    // a cell never splits more particles than it holds
    let per_cell = config.max_splits().min(config.particle_cap());
    let sizes = swarm
        .cells()
        .iter()
        .map(|cell| per_cell.min(cell.len()))
        .collect::<Vec<usize>>();
    let blocks = swarm.reserve_ids(sizes.iter().sum())?.partition(&sizes);

    let reports = swarm
        .cells_mut()
        .par_iter_mut()
        .zip(coverages.par_iter())
        .zip(blocks.into_par_iter())
        .map(|((cell, coverage), mut ids)| {
            if cancel.is_cancelled() {
                return None;
            }
            Some(control_cell(cell, coverage, &mut ids, config))
        })
        .collect::<Vec<Option<Result<CellReport>>>>();

    let mut summary = PassSummary::default();
    for report in reports {
        match report {
            Some(report) => summary.record(report?),
            None => summary.skipped += 1,
        }
    }

    summary.particles = swarm.len();
    summary.cancelled = summary.skipped > 0;

    if summary.cancelled {
        warn!("Pass cancelled with {} cells skipped", summary.skipped);
    }
    info!(
        "Pass complete: {} splits, {} deletions, {} rejected, {} particles",
        summary.splits,
        summary.deletions,
        summary.rejections.len(),
        summary.particles
    );

    Ok(summary)
}

/// Evaluate then apply the actions for a single cell
fn control_cell(
    cell: &mut CellPopulation,
    coverage: &Coverage,
    ids: &mut IdBlock,
    config: &Config,
) -> Result<CellReport> {
    let actions = evaluate(cell, &coverage.weights, config)?;
    apply(cell, &actions, Some(coverage), ids, config)
}

fn cancelled_summary(swarm: &Swarm) -> PassSummary {
    PassSummary {
        skipped: swarm.num_cells(),
        particles: swarm.len(),
        cancelled: true,
        ..Default::default()
    }
}
