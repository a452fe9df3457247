//! Discrete Voronoi coverage weights for the particles in a cell
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod coverage;
mod error;

// Inline anything important for a nice public API
#[doc(inline)]
pub use coverage::{assign_weights, compute_coverage, compute_weights, Coverage};

#[doc(inline)]
pub use error::{Error, Result};
