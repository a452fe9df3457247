//! `pcdvc` weights the particles of a particle-in-cell simulation by discrete
//! Voronoi coverage and keeps every cell's population under control
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of pcdvc crates.
#[doc(inline)]
pub use pcdvc_config as config;

#[doc(inline)]
pub use pcdvc_utils as utils;

#[cfg(feature = "control")]
#[cfg_attr(docsrs, doc(cfg(feature = "control")))]
#[doc(inline)]
pub use pcdvc_control as control;

#[cfg(feature = "dvc")]
#[cfg_attr(docsrs, doc(cfg(feature = "dvc")))]
#[doc(inline)]
pub use pcdvc_dvc as dvc;

#[cfg(feature = "swarm")]
#[cfg_attr(docsrs, doc(cfg(feature = "swarm")))]
#[doc(inline)]
pub use pcdvc_swarm as swarm;
