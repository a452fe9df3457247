//! Integration tests for settings validation

use pcdvc_config::{Config, Error, Normalisation, Settings};
use rstest::{fixture, rstest};

#[fixture]
fn defaults() -> Settings {
    Settings::new(20)
}

#[rstest]
fn default_settings_are_valid(defaults: Settings) {
    let config = Config::new(defaults).unwrap();
    assert_eq!(config.resolution(), [15, 15, 15]);
    assert_eq!(config.samples_per_cell(), 3375);
    assert_eq!(config.lower_volume_threshold(), 0.6);
    assert_eq!(config.upper_volume_threshold(), 25.0);
    assert_eq!(config.max_splits(), 3);
    assert_eq!(config.max_deletions(), 3);
    assert_eq!(config.centroid_position_ratio(), 0.01);
    assert_eq!(config.threshold(), 0.8);
    assert!(config.in_flow());
    assert_eq!(config.normalisation(), Normalisation::CellVolume);
}

#[rstest]
#[case::inverted_thresholds(
    Settings { lower_volume_threshold: 25.0, upper_volume_threshold: 0.6, ..Settings::new(20) },
    "lower_volume_threshold"
)]
#[case::zero_resolution(Settings { resolution_z: 0, ..Settings::new(20) }, "resolution_z")]
#[case::negative_lower(
    Settings { lower_volume_threshold: -0.1, ..Settings::new(20) },
    "lower_volume_threshold"
)]
#[case::ratio_zero(
    Settings { centroid_position_ratio: 0.0, ..Settings::new(20) },
    "centroid_position_ratio"
)]
#[case::ratio_one(
    Settings { centroid_position_ratio: 1.0, ..Settings::new(20) },
    "centroid_position_ratio"
)]
#[case::threshold_zero(Settings { threshold: 0.0, ..Settings::new(20) }, "threshold")]
#[case::threshold_above_one(Settings { threshold: 1.5, ..Settings::new(20) }, "threshold")]
#[case::no_particles(Settings::new(0), "particles_per_cell")]
#[case::small_cap(Settings { particle_cap: Some(5), ..Settings::new(20) }, "particle_cap")]
fn invalid_settings_name_the_field(#[case] settings: Settings, #[case] expected: &str) {
    match Config::new(settings) {
        Err(Error::InvalidConfiguration { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected InvalidConfiguration, found {other:?}"),
    }
}

#[rstest]
fn threshold_of_one_is_allowed(defaults: Settings) {
    let settings = Settings {
        threshold: 1.0,
        ..defaults
    };
    assert_eq!(Config::new(settings).unwrap().repopulation_target(), 20);
}

#[test]
fn json_settings_fill_defaults() {
    let json = r#"{
        "particles_per_cell": 12,
        "resolution_x": 4,
        "in_flow": false,
        "normalisation": "unit"
    }"#;

    let config = Config::from_json(json).unwrap();
    assert_eq!(config.resolution(), [4, 15, 15]);
    assert_eq!(config.particles_per_cell(), 12);
    assert!(!config.in_flow());
    assert_eq!(config.normalisation(), Normalisation::Unit);
    assert_eq!(config.particle_cap(), 96);
}

#[test]
fn json_requires_particles_per_cell() {
    let result = Config::from_json(r#"{"max_splits": 2}"#);
    assert!(matches!(result, Err(Error::JsonError(_))));
}

#[test]
fn json_is_validated() {
    let json = r#"{"particles_per_cell": 5, "lower_volume_threshold": 30.0}"#;
    assert!(matches!(
        Config::from_json(json),
        Err(Error::InvalidConfiguration { .. })
    ));
}

#[test]
fn try_from_settings() {
    let config = Config::try_from(Settings::new(4).with_resolution(2)).unwrap();
    assert_eq!(config.samples_per_cell(), 8);
}
