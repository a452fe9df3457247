//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! For example, checked reductions over particle weights and prettier
//! formatting for scientific numbers are useful in every pcdvc crate.

// Alias for the format! macro
pub use std::format as f;

// Modules
mod error;
mod slice_ext;
mod value_ext;

// Flatten
pub use error::{Error, Result};
pub use slice_ext::SliceExt;
pub use value_ext::ValueExt;
