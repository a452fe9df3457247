use crate::error::{Error, Result};

/// Extends functionality for slices of float weights
///
/// Every reduction refuses to produce a value from a slice containing `NAN`
/// or infinite values, so a corrupted weight field never silently turns into
/// a mean that every comparison fails against.
pub trait SliceExt<T> {
    /// Sum of all values, failing on empty or undefined input
    ///
    /// ```rust
    /// # use pcdvc_utils::SliceExt;
    /// assert_eq!([0.25, 0.5, 0.25].try_sum(), Ok(1.0));
    /// assert!(Vec::<f64>::new().try_sum().is_err());
    /// ```
    fn try_sum(&self) -> Result<T>;

    /// Arithmetic mean of all values, failing on empty or undefined input
    ///
    /// ```rust
    /// # use pcdvc_utils::SliceExt;
    /// assert_eq!([0.25, 0.75].try_mean(), Ok(0.5));
    /// assert!([0.1, f64::NAN].try_mean().is_err());
    /// ```
    fn try_mean(&self) -> Result<T>;
}

impl SliceExt<f64> for [f64] {
    fn try_sum(&self) -> Result<f64> {
        check_defined(self)?;
        if self.is_empty() {
            return Err(Error::SliceContainsNoValues);
        }
        Ok(self.iter().sum())
    }

    fn try_mean(&self) -> Result<f64> {
        let total = self.try_sum()?;
        Ok(total / self.len() as f64)
    }
}

fn check_defined(values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::SliceContainsUndefinedValues);
    }
    Ok(())
}
