//! Axis-aligned bounding geometry of a cell

// crate modules
use crate::error::{Error, Result};

// pcdvc modules
use pcdvc_utils::{f, ValueExt};

// external crates
use nalgebra::Vector3;

/// Axis-aligned bounding box of a cell
///
/// Always has a strictly positive length along every axis, which is checked
/// on construction.
///
/// ```rust
/// # use pcdvc_swarm::Extent;
/// let extent = Extent::new([0.0, 0.0, 0.0], [2.0, 1.0, 0.5]).unwrap();
/// assert_eq!(extent.volume(), 1.0);
///
/// // flat boxes have no volume to share out
/// assert!(Extent::new([0.0, 0.0, 0.0], [1.0, 0.0, 1.0]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    min: Vector3<f64>,
    max: Vector3<f64>,
}

impl Extent {
    /// Build from the lower and upper corners
    pub fn new(min: impl Into<Vector3<f64>>, max: impl Into<Vector3<f64>>) -> Result<Self> {
        let (min, max) = (min.into(), max.into());
        for axis in 0..3 {
            if !(min[axis].is_finite() && max[axis].is_finite() && max[axis] > min[axis]) {
                return Err(Error::InvalidExtent {
                    axis,
                    min: min[axis],
                    max: max[axis],
                });
            }
        }
        Ok(Self { min, max })
    }

    /// The unit cube [0,1]^3
    pub fn unit() -> Self {
        Self {
            min: Vector3::zeros(),
            max: Vector3::repeat(1.0),
        }
    }

    /// Lower corner
    pub fn min(&self) -> &Vector3<f64> {
        &self.min
    }

    /// Upper corner
    pub fn max(&self) -> &Vector3<f64> {
        &self.max
    }

    /// Length along each axis
    pub fn lengths(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Geometric centre
    pub fn centre(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }

    /// Volume of the box
    pub fn volume(&self) -> f64 {
        self.lengths().product()
    }

    /// Inclusive containment check
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Nearest point inside the box
    pub fn clamp(&self, point: &Vector3<f64>) -> Vector3<f64> {
        Vector3::from_fn(|i, _| point[i].clamp(self.min[i], self.max[i]))
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let corner = |v: &Vector3<f64>| {
            f!(
                "({}, {}, {})",
                v[0].sci(3, 2),
                v[1].sci(3, 2),
                v[2].sci(3, 2)
            )
        };
        write!(f, "{} -> {}", corner(&self.min), corner(&self.max))
    }
}
