//! Population control for discrete Voronoi weighted particle swarms
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod action;
mod controller;
mod error;
mod executor;
mod pass;

// Inline anything important for a nice public API
#[doc(inline)]
pub use action::{ControlAction, Rejection};

#[doc(inline)]
pub use controller::evaluate;

#[doc(inline)]
pub use executor::{apply, CellReport};

#[doc(inline)]
pub use pass::{run_pass, update_weights, CancelToken, PassSummary};

#[doc(inline)]
pub use error::{Error, Result};
