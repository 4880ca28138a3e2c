//! Focus-point cropping — geometry plus the seams around it.
//!
//! | Part | Role |
//! |---|---|
//! | **Calculations** | Pure rectangle math: filtering sizes, placing windows |
//! | **Parameters** | Resampler job descriptions |
//! | **Backend** | Collaborator traits the host implements |
//! | **Operations** | Planning and the refocus flow on top of the traits |
//!
//! Nothing here touches pixels. The calculations are pure and safe to call
//! from any number of threads.

pub mod backend;
mod calculations;
mod params;
pub mod operations;

pub use backend::{BackendError, FocusPointStore, MetadataProvider, Resampler};
pub use calculations::{
    CropResult, CropSkipped, SkipReason, compute_all_crops, compute_crop, filter_target_sizes,
};
pub use operations::{
    CropPlan, OperationError, PlanOutcome, PlanRequest, PlannedSize, RefocusReport,
    StaleRemovalFailure, get_focus_point, plan_crops, plan_many, refocus,
};
pub use params::CropParams;
