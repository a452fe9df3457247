//! Integration tests for population control decisions

use pcdvc_config::{Config, Settings};
use pcdvc_control::{evaluate, ControlAction, Error};
use pcdvc_swarm::{CellId, CellPopulation, Extent, ParticleId, Swarm};
use rstest::{fixture, rstest};

/// Unit cell with `n` particles spread along the x axis
fn line_of(n: usize) -> CellPopulation {
    let mut swarm = Swarm::new(&vec![Extent::unit()]).unwrap();
    for i in 0..n {
        let x = (i as f64 + 0.5) / n as f64;
        swarm.insert(CellId(0), [x, 0.5, 0.5]).unwrap();
    }
    swarm.cell(CellId(0)).unwrap().clone()
}

fn ids(cell: &CellPopulation) -> Vec<ParticleId> {
    cell.particles.iter().map(|p| p.id).collect()
}

#[fixture]
fn skewed() -> Vec<f64> {
    let mut weights = vec![0.01; 9];
    weights.push(0.91);
    weights
}

#[test]
fn equal_weights_need_no_action() {
    let config = Config::new(Settings {
        lower_volume_threshold: 0.6,
        upper_volume_threshold: 25.0,
        ..Settings::new(10)
    })
    .unwrap();

    let cell = line_of(10);
    let actions = evaluate(&cell, &[0.1; 10], &config).unwrap();
    assert!(actions.is_empty());
}

#[rstest]
fn single_split_for_the_large_particle(skewed: Vec<f64>) {
    let config = Config::new(Settings {
        upper_volume_threshold: 5.0,
        max_splits: 1,
        ..Settings::new(10)
    })
    .unwrap();

    let cell = line_of(10);
    let actions = evaluate(&cell, &skewed, &config).unwrap();

    let splits = actions
        .iter()
        .filter(|a| a.is_split())
        .collect::<Vec<&ControlAction>>();
    assert_eq!(splits, vec![&ControlAction::Split(ids(&cell)[9])]);
}

#[rstest]
fn only_the_split_without_deletions(skewed: Vec<f64>) {
    let config = Config::new(Settings {
        upper_volume_threshold: 5.0,
        max_splits: 1,
        max_deletions: 0,
        ..Settings::new(10)
    })
    .unwrap();

    let cell = line_of(10);
    let actions = evaluate(&cell, &skewed, &config).unwrap();
    assert_eq!(actions, vec![ControlAction::Split(ids(&cell)[9])]);
}

#[rstest]
fn smallest_particles_are_deleted_first() {
    let config = Config::new(Settings {
        max_deletions: 2,
        in_flow: false,
        ..Settings::new(5)
    })
    .unwrap();

    // mean is 0.2, the three small ones are all below 0.6 relative
    let cell = line_of(5);
    let weights = [0.1, 0.02, 0.5, 0.06, 0.32];
    let actions = evaluate(&cell, &weights, &config).unwrap();

    let ids = ids(&cell);
    assert_eq!(
        actions,
        vec![ControlAction::Delete(ids[1]), ControlAction::Delete(ids[3])]
    );
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 3)]
#[case(3, 0)]
#[case(5, 5)]
fn caps_are_never_exceeded(#[case] max_splits: usize, #[case] max_deletions: usize) {
    let config = Config::new(Settings {
        lower_volume_threshold: 0.9,
        upper_volume_threshold: 1.1,
        max_splits,
        max_deletions,
        in_flow: false,
        ..Settings::new(12)
    })
    .unwrap();

    // half the particles far too big, half far too small
    let cell = line_of(12);
    let weights = (0..12)
        .map(|i| if i % 2 == 0 { 0.15 } else { 0.01 + 0.001 * i as f64 })
        .collect::<Vec<f64>>();

    let actions = evaluate(&cell, &weights, &config).unwrap();
    let splits = actions.iter().filter(|a| a.is_split()).count();
    let deletions = actions.iter().filter(|a| a.is_delete()).count();

    assert_eq!(splits, max_splits.min(6));
    assert_eq!(deletions, max_deletions.min(6));
}

#[rstest]
fn evaluation_is_deterministic(skewed: Vec<f64>) {
    let config = Config::new(Settings {
        upper_volume_threshold: 2.0,
        ..Settings::new(10)
    })
    .unwrap();

    let cell = line_of(10);
    let first = evaluate(&cell, &skewed, &config).unwrap();
    let second = evaluate(&cell, &skewed, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn inflow_particles_are_kept_when_inflow_is_off() {
    let config = Config::new(Settings {
        in_flow: false,
        ..Settings::new(3)
    })
    .unwrap();

    let mut swarm = Swarm::new(&vec![Extent::unit()]).unwrap();
    let seeded = swarm.insert(CellId(0), [0.2, 0.5, 0.5]).unwrap();
    let injected = swarm.insert_inflow(CellId(0), [0.5, 0.5, 0.5]).unwrap();
    swarm.insert(CellId(0), [0.8, 0.5, 0.5]).unwrap();
    let cell = swarm.cell(CellId(0)).unwrap();

    // both small particles are well below the lower threshold
    let actions = evaluate(cell, &[0.05, 0.05, 0.9], &config).unwrap();
    assert_eq!(actions, vec![ControlAction::Delete(seeded)]);
    assert!(!actions.contains(&ControlAction::Delete(injected)));
}

#[test]
fn inflow_particles_may_go_when_inflow_is_on() {
    // a target of 2 leaves room for one deletion without a refill
    let config = Config::new(Settings::new(2)).unwrap();

    let mut swarm = Swarm::new(&vec![Extent::unit()]).unwrap();
    let injected = swarm.insert_inflow(CellId(0), [0.5, 0.5, 0.5]).unwrap();
    swarm.insert(CellId(0), [0.8, 0.5, 0.5]).unwrap();
    swarm.insert(CellId(0), [0.2, 0.5, 0.5]).unwrap();
    let cell = swarm.cell(CellId(0)).unwrap();

    let actions = evaluate(cell, &[0.02, 0.49, 0.49], &config).unwrap();
    assert_eq!(actions, vec![ControlAction::Delete(injected)]);
}

#[test]
fn empty_cell_is_degenerate() {
    let config = Config::new(Settings::new(3)).unwrap();
    let cell = CellPopulation::new(CellId(2), Extent::unit());
    assert_eq!(
        evaluate(&cell, &[], &config),
        Err(Error::CoverageError(pcdvc_dvc::Error::DegenerateCell {
            cell: CellId(2)
        }))
    );
}

#[test]
fn weights_must_match_particles() {
    let config = Config::new(Settings::new(3)).unwrap();
    let cell = line_of(3);
    assert!(matches!(
        evaluate(&cell, &[0.5, 0.5], &config),
        Err(Error::WeightCountMismatch {
            expected: 3,
            found: 2,
            ..
        })
    ));
}

#[test]
fn drained_cell_is_refilled_up_to_the_target() {
    let config = Config::new(Settings {
        max_splits: 5,
        ..Settings::new(10)
    })
    .unwrap();

    // five particles against a target of 8, two of them tiny
    let cell = line_of(5);
    let actions = evaluate(&cell, &[0.05, 0.05, 0.3, 0.3, 0.3], &config).unwrap();

    let ids = ids(&cell);
    assert_eq!(
        actions,
        vec![
            ControlAction::Split(ids[2]),
            ControlAction::Split(ids[3]),
            ControlAction::Split(ids[4]),
        ]
    );
}
