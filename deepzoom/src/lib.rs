//! Grid montage of equal-sized images, published as a Deep Zoom tile pyramid.
//!
//! [`run`] is the whole pipeline: list and decode the sources, [`assemble`]
//! them on a grid canvas, [`build_pyramid`] the tile levels and write the
//! [`PyramidDescriptor`]. [`plan`] computes the same outputs without IO.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod montage;
pub mod plan;
pub mod pyramid;
pub mod run;

pub use common::CancelToken;

pub use crate::config::{CellSize, DeepZoomConfig, DescriptorFormat, GridSpec, PyramidConfig};
pub use crate::descriptor::PyramidDescriptor;
pub use crate::error::{Error, Result};
pub use crate::montage::{CellPlacement, Montage, SourceImage, assemble};
pub use crate::plan::{BuildPlan, PlannedSource, plan};
pub use crate::pyramid::{LevelInfo, PyramidLayout, PyramidStats, TileBounds, build_pyramid};
pub use crate::run::{BuildSummary, list_inputs, run};

#[cfg(test)]
mod tests;
