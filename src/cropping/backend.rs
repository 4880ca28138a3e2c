//! Collaborator traits and shared error type.
//!
//! The crate computes rectangles; everything around that belongs to the host:
//!
//! | Trait | Host responsibility |
//! |---|---|
//! | [`MetadataProvider`] | Source dimensions, registered sizes, upload path |
//! | [`FocusPointStore`] | Persisting the chosen focus point per image |
//! | [`Resampler`] | Removing stale derivatives, cutting and encoding pixels |
//!
//! A recording mock implementing all three lives in this module's tests and
//! is shared with the [`operations`](super::operations) tests.

use super::params::CropParams;
use crate::types::{FocusPoint, ImageId, SourceImage, TargetSize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Looks up image metadata in the host.
pub trait MetadataProvider: Sync {
    /// Dimensions of the original upload. A missing or unreadable file is
    /// reported as zero dimensions, not as an error.
    fn source_image(&self, id: ImageId) -> Result<SourceImage, BackendError>;

    /// All sizes currently registered, cropped or not.
    fn target_sizes(&self) -> Result<Vec<TargetSize>, BackendError>;

    /// Upload-relative path of the original file, if the host knows it.
    fn attached_file(&self, id: ImageId) -> Result<Option<PathBuf>, BackendError>;
}

/// Persists focus points keyed by image. The storage medium is up to the host.
pub trait FocusPointStore: Sync {
    fn load(&self, id: ImageId) -> Result<Option<FocusPoint>, BackendError>;

    fn save(&self, id: ImageId, focus: FocusPoint) -> Result<(), BackendError>;
}

/// Produces cropped derivatives.
pub trait Resampler: Sync {
    /// Delete a previously generated derivative. Missing files are not an error.
    fn remove_stale(&self, path: &Path) -> Result<(), BackendError>;

    /// Cut `params.rect` from the source and resize it to exactly
    /// `dest_width`×`dest_height`.
    fn crop(&self, params: &CropParams) -> Result<(), BackendError>;
}
