//! Configuration for discrete Voronoi weighting and population control
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod settings;

// Inline anything important for a nice public API
#[doc(inline)]
pub use config::{Config, DEFAULT_CAP_FACTOR};

#[doc(inline)]
pub use settings::{Normalisation, Settings};

#[doc(inline)]
pub use error::{Error, Result};
