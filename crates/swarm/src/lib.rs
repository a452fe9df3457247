//! Particles, cells, and the cell-partitioned particle store
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod cell;
mod error;
mod extent;
mod geometry;
mod particle;
mod swarm;

// Inline anything important for a nice public API
#[doc(inline)]
pub use cell::{CellId, CellPopulation};

#[doc(inline)]
pub use extent::Extent;

#[doc(inline)]
pub use geometry::CellGeometry;

#[doc(inline)]
pub use particle::{Particle, ParticleId};

#[doc(inline)]
pub use swarm::{IdBlock, Swarm};

#[doc(inline)]
pub use error::{Error, Result};
