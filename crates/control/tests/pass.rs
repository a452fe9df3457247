//! Integration tests for full weighting and population control passes

use pcdvc_config::{Config, Normalisation, Settings};
use pcdvc_control::{run_pass, update_weights, CancelToken, Error};
use pcdvc_swarm::{CellId, Extent, ParticleId, Swarm};
use rstest::{fixture, rstest};

/// A row of unit cells along x with `counts[i]` particles in cell `i`
///
/// Particles are packed into the lower corner of each cell so that weights
/// are very uneven and population control has work to do.
fn row_of_cells(counts: &[usize]) -> Swarm {
    let geometry = (0..counts.len())
        .map(|i| {
            let x = i as f64;
            Extent::new([x, 0.0, 0.0], [x + 1.0, 1.0, 1.0]).unwrap()
        })
        .collect::<Vec<Extent>>();

    let mut swarm = Swarm::new(&geometry).unwrap();
    for (i, &n) in counts.iter().enumerate() {
        for j in 0..n {
            let t = 0.05 + 0.3 * (j as f64 + 0.5) / n as f64;
            let position = [i as f64 + t, t * t + 0.01, 0.5 * t];
            swarm.insert(CellId(i), position).unwrap();
        }
    }
    swarm
}

#[fixture]
fn config() -> Config {
    Config::new(Settings {
        upper_volume_threshold: 3.0,
        ..Settings::new(6).with_resolution(8)
    })
    .unwrap()
}

#[rstest]
fn weights_sum_to_each_cell_volume(config: Config) {
    let mut swarm = row_of_cells(&[1, 3, 7, 12]);
    update_weights(&mut swarm, &config).unwrap();

    for cell in swarm.cells() {
        assert!((cell.total_weight() - cell.volume()).abs() < 1e-9);
    }
}

#[test]
fn unit_weights_per_cell() {
    let config = Config::new(Settings {
        normalisation: Normalisation::Unit,
        ..Settings::new(4).with_resolution(5)
    })
    .unwrap();

    let geometry = vec![Extent::new([0.0, 0.0, 0.0], [3.0, 3.0, 3.0]).unwrap()];
    let mut swarm = Swarm::new(&geometry).unwrap();
    for x in [0.5, 1.5, 2.5] {
        swarm.insert(CellId(0), [x, 1.0, 1.0]).unwrap();
    }
    update_weights(&mut swarm, &config).unwrap();
    assert!((swarm.cells()[0].total_weight() - 1.0).abs() < 1e-9);
}

#[rstest]
fn pass_keeps_every_cell_populated_and_weighted(config: Config) {
    let mut swarm = row_of_cells(&[1, 2, 5, 9]);
    let before = swarm
        .cells()
        .iter()
        .map(|c| c.len())
        .collect::<Vec<usize>>();

    let summary = run_pass(&mut swarm, &config, &CancelToken::new()).unwrap();

    assert_eq!(summary.cells, 4);
    assert!(!summary.cancelled);
    assert_eq!(summary.particles, swarm.len());
    assert!(summary.splits > 0);

    for (cell, n) in swarm.cells().iter().zip(before) {
        assert!(!cell.is_empty());
        // total weight survives splits and deletions
        assert!((cell.total_weight() - cell.volume()).abs() < 1e-9);
        // structural changes stay within the per-cell caps
        assert!(cell.len() <= n + config.max_splits());
        assert!(cell.len() + config.max_deletions() >= n);
        // new particles stay inside their cell
        assert!(cell.particles.iter().all(|p| cell.extent().contains(&p.position)));
    }
}

#[rstest]
fn repeated_passes_stay_within_bounds(config: Config) {
    let mut swarm = row_of_cells(&[1, 1, 2]);
    for _ in 0..6 {
        let summary = run_pass(&mut swarm, &config, &CancelToken::new()).unwrap();
        assert_eq!(summary.particles, swarm.len());
    }

    for cell in swarm.cells() {
        assert!(!cell.is_empty(), "{} was emptied", cell.id());
        assert!(cell.len() <= config.particle_cap());
        assert!((cell.total_weight() - cell.volume()).abs() < 1e-9);
    }
}

#[rstest]
fn passes_are_reproducible(config: Config) {
    let mut a = row_of_cells(&[2, 4, 8, 3, 1]);
    let mut b = a.clone();

    for _ in 0..3 {
        let sa = run_pass(&mut a, &config, &CancelToken::new()).unwrap();
        let sb = run_pass(&mut b, &config, &CancelToken::new()).unwrap();
        assert_eq!(sa, sb);
    }

    assert_eq!(a.cells(), b.cells());
}

#[rstest]
fn empty_cell_aborts_without_changes(config: Config) {
    let mut swarm = row_of_cells(&[3, 0, 2]);
    let before = swarm.clone();

    let result = run_pass(&mut swarm, &config, &CancelToken::new());

    assert_eq!(
        result,
        Err(Error::CoverageError(pcdvc_dvc::Error::DegenerateCell {
            cell: CellId(1)
        }))
    );
    assert_eq!(swarm.cells(), before.cells());
}

#[rstest]
fn cancelled_pass_leaves_the_swarm_alone(config: Config) {
    let mut swarm = row_of_cells(&[1, 4, 6]);
    let before = swarm.clone();

    let token = CancelToken::new();
    let handle = token.clone();
    handle.cancel();

    let summary = run_pass(&mut swarm, &config, &token).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.cells, 0);
    assert_eq!(swarm.cells(), before.cells());
}

#[test]
fn no_splits_allowed() {
    let config = Config::new(Settings {
        max_splits: 0,
        ..Settings::new(6).with_resolution(4)
    })
    .unwrap();

    let mut swarm = row_of_cells(&[1, 2]);
    let summary = run_pass(&mut swarm, &config, &CancelToken::new()).unwrap();

    assert_eq!(summary.splits, 0);
    assert_eq!(swarm.len(), 3 - summary.deletions);
}

#[rstest]
#[case::unlimited_splits(None)]
#[case::unlimited_splits_and_cap(Some(usize::MAX))]
fn unbounded_split_budget(#[case] particle_cap: Option<usize>) {
    let config = Config::new(Settings {
        max_splits: usize::MAX,
        particle_cap,
        ..Settings::new(6).with_resolution(4)
    })
    .unwrap();

    let mut swarm = row_of_cells(&[1, 2]);
    let summary = run_pass(&mut swarm, &config, &CancelToken::new()).unwrap();

    // each particle can be split at most once per pass
    assert!(summary.splits <= 3);
    assert_eq!(summary.particles, swarm.len());

    // only one handle per existing particle was set aside
    let id = swarm.insert(CellId(0), [0.5, 0.5, 0.5]).unwrap();
    assert_eq!(id, ParticleId(6));
}
