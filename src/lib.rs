//! # focal-crop
//!
//! Re-crop thumbnail sizes around an editor-chosen focus point instead of the
//! image center.
//!
//! An editor clicks the interesting part of an upload. That click becomes a
//! [`FocusPoint`](types::FocusPoint): two percentages measured from the
//! top-left corner. For every registered size that asks for a hard crop, this
//! crate computes the region of the original to cut out so that the region
//! has the size's aspect ratio and the focus point sits as close to its
//! center as the image edges allow.
//!
//! ```text
//!   original 1200x800, focus 25,75          thumbnail 300x300
//!   ┌───────────────────────────┐
//!   │█████████████████          │           crop 800x800 at 0,0
//!   │█████████████████          │           → resized by the host
//!   │████ ✕ ██████████          │
//!   └───────────────────────────┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`cropping`] | Rectangle geometry, collaborator traits, planning and the refocus flow |
//! | [`types`] | Value types: dimensions, focus point, target size, crop rectangle |
//! | [`naming`] | `<stem>-<W>x<H>.<ext>` paths for cropped derivatives |
//! | [`config`] | `focal-crop.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Geometry Only
//!
//! Reading files, resampling pixels and storing focus points belong to the
//! host. They sit behind the traits in [`cropping::backend`], so the same
//! planning code drives a CMS plugin, a batch job or the bundled CLI, and
//! tests run against a recording mock.
//!
//! ## Skips Are Values
//!
//! A small upload or a proportional-only size is routine, not an error.
//! [`cropping::compute_crop`] returns a
//! [`CropSkipped`](cropping::CropSkipped) with a reason and the caller moves
//! on to the next size. Only collaborator failures surface as errors.
//!
//! ## No Hidden State
//!
//! Every call takes its inputs explicitly and returns a fresh result. The
//! calculations can run on any number of threads; batch planning fans out
//! over rayon.

pub mod config;
pub mod cropping;
pub mod naming;
pub mod output;
pub mod types;
