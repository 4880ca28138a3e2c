//! Parameter types for resampler jobs.
//!
//! These structs describe *what* to cut, not *how* to cut it. They are the
//! interface between [`operations`](super::operations), which decides which
//! derivatives to produce, and the [`Resampler`](super::backend::Resampler),
//! which does the pixel work outside this crate.

use crate::types::{CropRectangle, ImageId, TargetSize};
use serde::Serialize;
use std::path::PathBuf;

/// One crop-and-resize job for the resampler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropParams {
    pub source: ImageId,
    /// Name of the target size this job produces.
    pub size_name: String,
    /// Region of the source to extract.
    pub rect: CropRectangle,
    /// Exact output dimensions the region is resized to.
    pub dest_width: u32,
    pub dest_height: u32,
    /// Where the derivative goes. `None` when the host did not report an
    /// upload path; the resampler then picks its own location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl CropParams {
    pub fn new(
        source: ImageId,
        target: &TargetSize,
        rect: CropRectangle,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            source,
            size_name: target.name.clone(),
            rect,
            dest_width: target.width,
            dest_height: target.height,
            output,
        }
    }
}
