// external crates
use serde::{Deserialize, Serialize};

/// Target that the weights of every cell are normalised to
///
/// Particle weights are an integration volume, so by default each cell's
/// weights add up to the volume of the cell. Some integration schemes prefer
/// weights as a fraction of the cell instead, in which case they sum to one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    /// Weights of a cell sum to the cell volume
    #[default]
    CellVolume,
    /// Weights of a cell sum to 1
    Unit,
}

impl std::fmt::Display for Normalisation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::CellVolume => "cell volume",
            Self::Unit => "unit",
        };
        write!(f, "{}", s)
    }
}

/// Unvalidated parameters for discrete Voronoi weighting and population control
///
/// [Settings] is the plain, mutable form of the configuration. It may be
/// built in code or deserialised from JSON, and is turned into an immutable
/// [Config](crate::Config) once validated.
///
/// Every field except `particles_per_cell` has a default:
///
/// | Field                     | Default       |
/// | ------------------------- | ------------- |
/// | `resolution_x/y/z`        | 15            |
/// | `lower_volume_threshold`  | 0.6           |
/// | `upper_volume_threshold`  | 25.0          |
/// | `max_deletions`           | 3             |
/// | `max_splits`              | 3             |
/// | `centroid_position_ratio` | 0.01          |
/// | `threshold`               | 0.8           |
/// | `in_flow`                 | true          |
/// | `normalisation`           | CellVolume    |
/// | `particle_cap`            | none (8x ppc) |
///
/// ```rust
/// # use pcdvc_config::Settings;
/// let settings = Settings {
///     max_splits: 1,
///     ..Settings::new(20)
/// };
///
/// assert_eq!(settings.particles_per_cell, 20);
/// assert_eq!(settings.resolution_x, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Sub-grid samples along x for the coverage estimate
    #[serde(default = "default_resolution")]
    pub resolution_x: usize,
    /// Sub-grid samples along y for the coverage estimate
    #[serde(default = "default_resolution")]
    pub resolution_y: usize,
    /// Sub-grid samples along z for the coverage estimate
    #[serde(default = "default_resolution")]
    pub resolution_z: usize,

    /// Relative volume below which a particle may be deleted
    #[serde(default = "default_lower_threshold")]
    pub lower_volume_threshold: f64,
    /// Relative volume above which a particle is split
    #[serde(default = "default_upper_threshold")]
    pub upper_volume_threshold: f64,

    /// Deletions allowed per cell per pass
    #[serde(default = "default_max_changes")]
    pub max_deletions: usize,
    /// Splits allowed per cell per pass
    #[serde(default = "default_max_changes")]
    pub max_splits: usize,

    /// Fraction of the way a split particle moves towards its region centroid
    #[serde(default = "default_centroid_ratio")]
    pub centroid_position_ratio: f64,
    /// Fraction of `particles_per_cell` below which a cell is repopulated
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Target number of particles in every cell
    pub particles_per_cell: usize,
    /// Allow inflow particles to be deleted and drained cells to be refilled
    #[serde(default = "default_in_flow")]
    pub in_flow: bool,

    /// What the weights of a cell sum to
    #[serde(default)]
    pub normalisation: Normalisation,
    /// Hard limit on particles per cell, defaults to 8x `particles_per_cell`
    #[serde(default)]
    pub particle_cap: Option<usize>,
}

impl Settings {
    /// Default settings for a target number of particles per cell
    pub fn new(particles_per_cell: usize) -> Self {
        Self {
            resolution_x: default_resolution(),
            resolution_y: default_resolution(),
            resolution_z: default_resolution(),
            lower_volume_threshold: default_lower_threshold(),
            upper_volume_threshold: default_upper_threshold(),
            max_deletions: default_max_changes(),
            max_splits: default_max_changes(),
            centroid_position_ratio: default_centroid_ratio(),
            threshold: default_threshold(),
            particles_per_cell,
            in_flow: default_in_flow(),
            normalisation: Normalisation::default(),
            particle_cap: None,
        }
    }

    /// Same resolution along every axis
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution_x = resolution;
        self.resolution_y = resolution;
        self.resolution_z = resolution;
        self
    }
}

fn default_resolution() -> usize {
    15
}

fn default_lower_threshold() -> f64 {
    0.6
}

fn default_upper_threshold() -> f64 {
    25.0
}

fn default_max_changes() -> usize {
    3
}

fn default_centroid_ratio() -> f64 {
    0.01
}

fn default_threshold() -> f64 {
    0.8
}

fn default_in_flow() -> bool {
    true
}
