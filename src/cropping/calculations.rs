//! Pure crop-rectangle geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## How a crop window is placed
//!
//! Each axis is handled on its own. The window on an axis is the source
//! extent scaled by a correction factor:
//!
//! ```text
//! correction_x = target_ratio / source_ratio   → window_x = height * target_ratio
//! correction_y = source_ratio / target_ratio   → window_y = width  / target_ratio
//! ```
//!
//! One of the two windows is always at least as long as its axis and ends up
//! covering it completely; the other one fits inside and carries the actual
//! crop. The window is centered on the focus point, then slid back inside the
//! image when it hangs over an edge:
//!
//! ```text
//!        focus
//!          │
//!   ┌──────┼──────┐            window centered on focus
//! ──┼──────┼──────┼──────────  source axis
//!   ^ start < 0
//!
//!   ┌─────────────┐            shifted right by -start
//! ──┼─────────────┼──────────
//!   0
//! ```
//!
//! The left clamp runs first and caps the end at the axis length; the right
//! clamp then pulls the start back by the overhang and pins the end to the
//! axis length.

use crate::types::{CropRectangle, FocusPoint, SourceImage, TargetSize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why no rectangle was produced for a target size.
///
/// These are expected outcomes (a small upload, a proportional-only size),
/// not failures: callers skip the size and carry on with the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The source has a zero side; the file is missing or unreadable.
    InvalidSource,
    /// The target has a zero side, so its ratio is undefined.
    InvalidTarget,
    /// The target is wider or taller than the source; cropping would upscale.
    TargetTooLarge,
    /// Clamping left a non-positive extent. Only reachable through
    /// floating-point drift on pathological inputs.
    DegenerateWindow,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::InvalidSource => "source image has no usable dimensions",
            SkipReason::InvalidTarget => "target size has a zero dimension",
            SkipReason::TargetTooLarge => "target is larger than the source",
            SkipReason::DegenerateWindow => "crop window collapsed after clamping",
        }
    }
}

/// A target size that was skipped, tagged with the reason.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("crop skipped: {}", .reason.describe())]
pub struct CropSkipped {
    pub reason: SkipReason,
}

impl From<SkipReason> for CropSkipped {
    fn from(reason: SkipReason) -> Self {
        Self { reason }
    }
}

pub type CropResult = Result<CropRectangle, CropSkipped>;

/// Keep only the sizes that ask for a hard crop and have both sides set.
///
/// Order is preserved and duplicates are kept; dropped entries are sizes
/// that simply don't need cropping. Applying the filter twice yields the
/// same list as applying it once.
pub fn filter_target_sizes(sizes: &[TargetSize]) -> Vec<TargetSize> {
    sizes
        .iter()
        .filter(|size| size.crop && size.dimensions().is_valid())
        .cloned()
        .collect()
}

/// Compute the crop rectangle for one target size.
///
/// Checks run in order and the first failing one decides the skip reason:
/// invalid source, invalid target, target larger than source.
///
/// # Examples
/// ```
/// # use focal_crop::cropping::compute_crop;
/// # use focal_crop::types::{FocusPoint, ImageId, SourceImage, TargetSize};
/// let source = SourceImage::new(ImageId(7), 1200, 800);
/// let focus = FocusPoint::new(25.0, 75.0).unwrap();
/// let square = TargetSize::new("thumbnail", 300, 300, true);
///
/// let rect = compute_crop(&source, focus, &square).unwrap();
/// assert_eq!((rect.x, rect.y), (0.0, 0.0));
/// assert!((rect.width - 800.0).abs() < 1e-6);
/// assert!((rect.height - 800.0).abs() < 1e-6);
/// ```
pub fn compute_crop(source: &SourceImage, focus: FocusPoint, target: &TargetSize) -> CropResult {
    let source_ratio = source.dimensions.ratio().ok_or(SkipReason::InvalidSource)?;
    crop_validated_source(source, source_ratio, focus, target)
}

/// Compute crops for every participating target size.
///
/// Sizes are filtered with [`filter_target_sizes`] first; the result holds
/// one entry per surviving size, in input order. An invalid source is
/// detected once and reported against every size.
pub fn compute_all_crops(
    source: &SourceImage,
    focus: FocusPoint,
    targets: &[TargetSize],
) -> Vec<(TargetSize, CropResult)> {
    let targets = filter_target_sizes(targets);

    let Some(source_ratio) = source.dimensions.ratio() else {
        return targets
            .into_iter()
            .map(|target| (target, Err(SkipReason::InvalidSource.into())))
            .collect();
    };

    targets
        .into_iter()
        .map(|target| {
            let result = crop_validated_source(source, source_ratio, focus, &target);
            (target, result)
        })
        .collect()
}

fn crop_validated_source(
    source: &SourceImage,
    source_ratio: f64,
    focus: FocusPoint,
    target: &TargetSize,
) -> CropResult {
    let target_ratio = target.ratio().ok_or(SkipReason::InvalidTarget)?;

    let full = source.dimensions;
    if target.width > full.width || target.height > full.height {
        return Err(SkipReason::TargetTooLarge.into());
    }

    let (x, width) = place_window(full.width as f64, focus.x(), target_ratio / source_ratio)?;
    let (y, height) = place_window(full.height as f64, focus.y(), source_ratio / target_ratio)?;

    Ok(CropRectangle {
        x,
        y,
        width,
        height,
    })
}

/// Place the window along one axis and return `(start, extent)`.
fn place_window(full: f64, focus_percent: f64, correction: f64) -> Result<(f64, f64), CropSkipped> {
    let center = focus_percent / 100.0 * full;
    let half = full * correction / 2.0;

    let mut start = center - half;
    let mut end = center + half;

    if start < 0.0 {
        end = (end - start).min(full);
        start = 0.0;
    }

    // The left shift can push the end past the axis, so this is not an else.
    if end > full {
        start = (start + full - end).max(0.0);
        end = full;
    }

    let extent = end - start;
    if !extent.is_finite() || extent <= 0.0 {
        return Err(SkipReason::DegenerateWindow.into());
    }

    Ok((start, extent))
}
