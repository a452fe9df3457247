// crate modules
use crate::error::{Error, Result};
use crate::settings::{Normalisation, Settings};

// pcdvc modules
use pcdvc_utils::{f, ValueExt};

// external crates
use log::debug;

/// Multiple of `particles_per_cell` used when no explicit cap is given
pub const DEFAULT_CAP_FACTOR: usize = 8;

/// Validated, immutable configuration shared by every pcdvc component
///
/// A [Config] can only be built from [Settings] that pass validation, so the
/// estimator, controller, and executor never re-check their parameters. The
/// fields are read through getters and cannot change after construction.
///
/// Constraints are checked in a fixed order and the first violation is
/// reported by name:
///
/// 1. `resolution_x`, `resolution_y`, `resolution_z` are at least 1
/// 2. `lower_volume_threshold` and `upper_volume_threshold` are positive
/// 3. `lower_volume_threshold` < `upper_volume_threshold`
/// 4. `centroid_position_ratio` is in (0, 1)
/// 5. `threshold` is in (0, 1]
/// 6. `particles_per_cell` is at least 1
/// 7. `particle_cap` is not below `particles_per_cell`
///
/// ```rust
/// # use pcdvc_config::{Config, Settings};
/// let config = Config::new(Settings::new(20)).unwrap();
/// assert_eq!(config.particle_cap(), 160);
///
/// // Thresholds the wrong way round are rejected
/// let inverted = Settings {
///     lower_volume_threshold: 25.0,
///     upper_volume_threshold: 0.6,
///     ..Settings::new(20)
/// };
/// assert!(Config::new(inverted).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    resolution: [usize; 3],
    lower_volume_threshold: f64,
    upper_volume_threshold: f64,
    max_deletions: usize,
    max_splits: usize,
    centroid_position_ratio: f64,
    threshold: f64,
    particles_per_cell: usize,
    in_flow: bool,
    normalisation: Normalisation,
    particle_cap: usize,
}

impl Config {
    /// Validate a set of [Settings]
    pub fn new(settings: Settings) -> Result<Self> {
        validate(&settings)?;

        let particle_cap = settings
            .particle_cap
            .unwrap_or(settings.particles_per_cell.saturating_mul(DEFAULT_CAP_FACTOR));

        let config = Self {
            resolution: [
                settings.resolution_x,
                settings.resolution_y,
                settings.resolution_z,
            ],
            lower_volume_threshold: settings.lower_volume_threshold,
            upper_volume_threshold: settings.upper_volume_threshold,
            max_deletions: settings.max_deletions,
            max_splits: settings.max_splits,
            centroid_position_ratio: settings.centroid_position_ratio,
            threshold: settings.threshold,
            particles_per_cell: settings.particles_per_cell,
            in_flow: settings.in_flow,
            normalisation: settings.normalisation,
            particle_cap,
        };

        debug!("Validated configuration:\n{config}");
        Ok(config)
    }

    /// Parse and validate settings from a JSON object
    ///
    /// Missing fields take their defaults, except for `particles_per_cell`
    /// which must always be given.
    ///
    /// ```rust
    /// # use pcdvc_config::Config;
    /// let config = Config::from_json(r#"{"particles_per_cell": 10, "max_splits": 1}"#).unwrap();
    /// assert_eq!(config.max_splits(), 1);
    /// assert_eq!(config.max_deletions(), 3);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Self::new(settings)
    }

    /// Sub-grid samples along each axis `[x, y, z]`
    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    /// Total number of coverage samples per cell
    pub fn samples_per_cell(&self) -> usize {
        self.resolution.iter().product()
    }

    /// Relative volume below which a particle may be deleted
    pub fn lower_volume_threshold(&self) -> f64 {
        self.lower_volume_threshold
    }

    /// Relative volume above which a particle is split
    pub fn upper_volume_threshold(&self) -> f64 {
        self.upper_volume_threshold
    }

    /// Deletions allowed per cell per pass
    pub fn max_deletions(&self) -> usize {
        self.max_deletions
    }

    /// Splits allowed per cell per pass
    pub fn max_splits(&self) -> usize {
        self.max_splits
    }

    /// Fraction of the offset applied to a split particle
    pub fn centroid_position_ratio(&self) -> f64 {
        self.centroid_position_ratio
    }

    /// Fraction of `particles_per_cell` below which a cell is repopulated
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Target number of particles in every cell
    pub fn particles_per_cell(&self) -> usize {
        self.particles_per_cell
    }

    /// Inflow policy flag
    pub fn in_flow(&self) -> bool {
        self.in_flow
    }

    /// What the weights of a cell sum to
    pub fn normalisation(&self) -> Normalisation {
        self.normalisation
    }

    /// Hard limit on the number of particles in a cell
    pub fn particle_cap(&self) -> usize {
        self.particle_cap
    }

    /// Smallest population a cell may hold before repopulation splits
    ///
    /// Always at least 1 since both `threshold` and `particles_per_cell` are
    /// strictly positive.
    pub fn repopulation_target(&self) -> usize {
        (self.threshold * self.particles_per_cell as f64).ceil() as usize
    }
}

impl TryFrom<Settings> for Config {
    type Error = Error;

    fn try_from(settings: Settings) -> Result<Self> {
        Self::new(settings)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [rx, ry, rz] = self.resolution;
        let mut s = "Config {\n".to_string();
        s += &f!("    resolution: {rx}x{ry}x{rz}\n");
        s += &f!(
            "    volume thresholds: [{}, {}]\n",
            self.lower_volume_threshold.sci(3, 2),
            self.upper_volume_threshold.sci(3, 2)
        );
        s += &f!(
            "    max splits/deletions: {}/{}\n",
            self.max_splits,
            self.max_deletions
        );
        s += &f!(
            "    centroid ratio: {}\n",
            self.centroid_position_ratio.sci(3, 2)
        );
        s += &f!(
            "    particles per cell: {} (threshold {}, cap {})\n",
            self.particles_per_cell,
            self.threshold,
            self.particle_cap
        );
        s += &f!("    in flow: {}\n", self.in_flow);
        s += &f!("    normalisation: {}\n}}", self.normalisation);
        write!(f, "{}", s)
    }
}

/// Check every constraint in order, stopping at the first violation
fn validate(settings: &Settings) -> Result<()> {
    for (field, value) in [
        ("resolution_x", settings.resolution_x),
        ("resolution_y", settings.resolution_y),
        ("resolution_z", settings.resolution_z),
    ] {
        if value < 1 {
            return Err(invalid(field, f!("must be at least 1, found {value}")));
        }
    }

    for (field, value) in [
        ("lower_volume_threshold", settings.lower_volume_threshold),
        ("upper_volume_threshold", settings.upper_volume_threshold),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(field, f!("must be positive, found {value}")));
        }
    }

    if settings.lower_volume_threshold >= settings.upper_volume_threshold {
        return Err(invalid(
            "lower_volume_threshold",
            f!(
                "must be below upper_volume_threshold ({} >= {})",
                settings.lower_volume_threshold,
                settings.upper_volume_threshold
            ),
        ));
    }

    let ratio = settings.centroid_position_ratio;
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(invalid(
            "centroid_position_ratio",
            f!("must be in (0, 1), found {ratio}"),
        ));
    }

    let threshold = settings.threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(invalid(
            "threshold",
            f!("must be in (0, 1], found {threshold}"),
        ));
    }

    if settings.particles_per_cell < 1 {
        return Err(invalid("particles_per_cell", "must be at least 1".into()));
    }

    if let Some(cap) = settings.particle_cap {
        if cap < settings.particles_per_cell {
            return Err(invalid(
                "particle_cap",
                f!(
                    "must not be below particles_per_cell ({cap} < {})",
                    settings.particles_per_cell
                ),
            ));
        }
    }

    Ok(())
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::InvalidConfiguration { field, reason }
}
