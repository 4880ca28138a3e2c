//! Value types shared by the calculator, the collaborator seams and the CLI.
//!
//! Everything here is a plain, transient value: built from caller-supplied
//! data for one invocation and never retained by the crate. All types derive
//! `Serialize`/`Deserialize` so the CLI can emit them as JSON and hosts can
//! pass them across their own boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque identifier of an uploaded image in the host system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pixel dimensions of an image.
///
/// Zero on either side marks an image that could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when either side is zero.
    pub fn ratio(self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }

    pub fn is_valid(self) -> bool {
        self.ratio().is_some()
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FocusPointError {
    #[error("focus point coordinates must be finite, got ({x}, {y})")]
    NotFinite { x: f64, y: f64 },
}

/// Percentage position of the visually important region, measured from the
/// top-left corner of the source image.
///
/// Both coordinates are always within `[0, 100]`: finite values are clamped
/// on construction and NaN/infinite values are rejected, so a `FocusPoint`
/// can be handed to the calculator without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFocusPoint")]
pub struct FocusPoint {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawFocusPoint {
    x: f64,
    y: f64,
}

impl TryFrom<RawFocusPoint> for FocusPoint {
    type Error = FocusPointError;

    fn try_from(raw: RawFocusPoint) -> Result<Self, Self::Error> {
        FocusPoint::new(raw.x, raw.y)
    }
}

impl FocusPoint {
    pub const CENTER: FocusPoint = FocusPoint { x: 50.0, y: 50.0 };

    pub fn new(x: f64, y: f64) -> Result<Self, FocusPointError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(FocusPointError::NotFinite { x, y });
        }
        Ok(Self {
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
        })
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }
}

impl Default for FocusPoint {
    fn default() -> Self {
        Self::CENTER
    }
}

impl fmt::Display for FocusPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A named output size registered by the host (e.g. `thumbnail 150x150`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSize {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Whether the host wants this size hard-cropped. Sizes without cropping
    /// are proportional resizes and are left alone.
    #[serde(default)]
    pub crop: bool,
}

impl TargetSize {
    pub fn new(name: impl Into<String>, width: u32, height: u32, crop: bool) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            crop,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn ratio(&self) -> Option<f64> {
        self.dimensions().ratio()
    }
}

/// The original upload a set of thumbnails is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    pub id: ImageId,
    pub dimensions: Dimensions,
}

impl SourceImage {
    pub fn new(id: ImageId, width: u32, height: u32) -> Self {
        Self {
            id,
            dimensions: Dimensions::new(width, height),
        }
    }
}

/// Sub-rectangle of the source image, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRectangle {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Whether the rectangle lies inside `bounds`, allowing `tolerance`
    /// pixels of floating-point drift on each edge.
    pub fn is_within(&self, bounds: Dimensions, tolerance: f64) -> bool {
        self.x >= -tolerance
            && self.y >= -tolerance
            && self.right() <= bounds.width as f64 + tolerance
            && self.bottom() <= bounds.height as f64 + tolerance
    }
}
