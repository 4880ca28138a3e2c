//! High-level crop operations.
//!
//! These functions combine the calculations with the collaborators. They
//! take host data, compute rectangles, derive output paths and drive the
//! resampler.
//!
//! [`plan_crops`] and [`plan_many`] are pure; [`refocus`] and
//! [`get_focus_point`] back the two endpoints a host exposes ("set the focus
//! point and regenerate", "what is the focus point").

use super::backend::{BackendError, FocusPointStore, MetadataProvider, Resampler};
use super::calculations::{SkipReason, compute_all_crops};
use super::params::CropParams;
use crate::naming::derived_path;
use crate::types::{FocusPoint, ImageId, SourceImage, TargetSize};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Host call failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Cropping size '{size}' failed: {source}")]
    Crop { size: String, source: BackendError },
}

/// Result type for crop operations.
pub type Result<T> = std::result::Result<T, OperationError>;

/// What happens to one registered size.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    Crop(CropParams),
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedSize {
    pub target: TargetSize,
    pub outcome: PlanOutcome,
}

/// Crop decisions for every participating size of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropPlan {
    pub source: SourceImage,
    pub focus: FocusPoint,
    pub sizes: Vec<PlannedSize>,
}

impl CropPlan {
    /// Jobs to hand to the resampler, in size order.
    pub fn jobs(&self) -> impl Iterator<Item = &CropParams> {
        self.sizes.iter().filter_map(|planned| match &planned.outcome {
            PlanOutcome::Crop(params) => Some(params),
            PlanOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&TargetSize, SkipReason)> {
        self.sizes.iter().filter_map(|planned| match planned.outcome {
            PlanOutcome::Skipped { reason } => Some((&planned.target, reason)),
            PlanOutcome::Crop(_) => None,
        })
    }
}

/// Plan the crops for one image without executing them.
///
/// `attached` is the upload-relative path of the original; when it is known,
/// each job gets an output path under `upload_dir`.
pub fn plan_crops(
    source: &SourceImage,
    focus: FocusPoint,
    sizes: &[TargetSize],
    attached: Option<&Path>,
    upload_dir: &Path,
) -> CropPlan {
    let sizes = compute_all_crops(source, focus, sizes)
        .into_iter()
        .map(|(target, result)| {
            let outcome = match result {
                Ok(rect) => {
                    let output = attached.and_then(|file| {
                        derived_path(upload_dir, file, target.width, target.height)
                    });
                    PlanOutcome::Crop(CropParams::new(source.id, &target, rect, output))
                }
                Err(skipped) => PlanOutcome::Skipped {
                    reason: skipped.reason,
                },
            };
            PlannedSize { target, outcome }
        })
        .collect();

    CropPlan {
        source: *source,
        focus,
        sizes,
    }
}

/// One image in a batch plan.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub source: SourceImage,
    pub focus: FocusPoint,
    pub attached: Option<PathBuf>,
}

/// Plan many images in parallel.
///
/// Images are independent, so they fan out across the rayon pool. The
/// result is in request order.
pub fn plan_many(
    requests: &[PlanRequest],
    sizes: &[TargetSize],
    upload_dir: &Path,
) -> Vec<CropPlan> {
    requests
        .par_iter()
        .map(|req| {
            plan_crops(
                &req.source,
                req.focus,
                sizes,
                req.attached.as_deref(),
                upload_dir,
            )
        })
        .collect()
}

/// The focus point stored for `id`, or the image center when none is stored.
pub fn get_focus_point(store: &impl FocusPointStore, id: ImageId) -> Result<FocusPoint> {
    Ok(store.load(id)?.unwrap_or_default())
}

/// A stale derivative that could not be deleted before its crop was written.
#[derive(Debug)]
pub struct StaleRemovalFailure {
    pub path: PathBuf,
    pub error: BackendError,
}

/// Outcome of [`refocus`]: the plan that was executed and the stale files
/// the resampler could not remove.
#[derive(Debug)]
pub struct RefocusReport {
    pub plan: CropPlan,
    pub stale_failures: Vec<StaleRemovalFailure>,
}

/// Store a new focus point for `id` and regenerate every cropped size.
///
/// The focus point is saved before anything else, even when the source
/// turns out to be unreadable. For each planned job the stale derivative is
/// removed first, then the resampler writes the new one. A failed removal
/// does not stop the crop (the new file replaces the old one); it is
/// collected in the report. A failing crop or host lookup stops the run.
pub fn refocus(
    host: &impl MetadataProvider,
    store: &impl FocusPointStore,
    resampler: &impl Resampler,
    id: ImageId,
    focus: FocusPoint,
    upload_dir: &Path,
) -> Result<RefocusReport> {
    store.save(id, focus)?;

    let source = host.source_image(id)?;
    let sizes = host.target_sizes()?;
    let attached = host.attached_file(id)?;

    let plan = plan_crops(&source, focus, &sizes, attached.as_deref(), upload_dir);

    let mut stale_failures = Vec::new();
    for job in plan.jobs() {
        if let Some(output) = &job.output {
            if let Err(error) = resampler.remove_stale(output) {
                stale_failures.push(StaleRemovalFailure {
                    path: output.clone(),
                    error,
                });
            }
        }
        resampler.crop(job).map_err(|source| OperationError::Crop {
            size: job.size_name.clone(),
            source,
        })?;
    }

    Ok(RefocusReport {
        plan,
        stale_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cropping::backend::tests::{MockBackend, RecordedOp};

    fn sizes() -> Vec<TargetSize> {
        vec![
            TargetSize::new("thumbnail", 150, 150, true),
            TargetSize::new("medium", 300, 300, false),
            TargetSize::new("banner", 1600, 400, true),
            TargetSize::new("card", 400, 300, true),
        ]
    }

    fn focus(x: f64, y: f64) -> FocusPoint {
        FocusPoint::new(x, y).unwrap()
    }

    // =========================================================================
    // plan_crops tests
    // =========================================================================

    #[test]
    fn plan_derives_output_paths() {
        let source = SourceImage::new(ImageId(5), 1200, 800);
        let plan = plan_crops(
            &source,
            focus(50.0, 50.0),
            &sizes(),
            Some(Path::new("2024/05/beach.jpg")),
            Path::new("/srv/uploads"),
        );

        let outputs: Vec<_> = plan
            .jobs()
            .map(|job| job.output.clone().unwrap())
            .collect();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/srv/uploads/2024/05/beach-150x150.jpg"),
                PathBuf::from("/srv/uploads/2024/05/beach-400x300.jpg"),
            ]
        );
    }

    #[test]
    fn plan_reports_skipped_sizes() {
        let source = SourceImage::new(ImageId(5), 1200, 800);
        let plan = plan_crops(&source, focus(50.0, 50.0), &sizes(), None, Path::new("/up"));

        // "medium" is filtered out, "banner" is wider than the source.
        assert_eq!(plan.sizes.len(), 3);
        let skipped: Vec<_> = plan.skipped().map(|(t, r)| (t.name.as_str(), r)).collect();
        assert_eq!(skipped, vec![("banner", SkipReason::TargetTooLarge)]);
        assert!(plan.jobs().all(|job| job.output.is_none()));
    }

    #[test]
    fn plan_serializes_status_tag() {
        let source = SourceImage::new(ImageId(5), 1200, 800);
        let plan = plan_crops(&source, focus(50.0, 50.0), &sizes(), None, Path::new("/up"));
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["sizes"][0]["outcome"]["status"], "crop");
        assert_eq!(json["sizes"][1]["outcome"]["status"], "skipped");
        assert_eq!(json["sizes"][1]["outcome"]["reason"], "target_too_large");
        assert_eq!(json["focus"]["x"], 50.0);
    }

    #[test]
    fn plan_many_preserves_order() {
        let requests: Vec<_> = (0..32)
            .map(|i| PlanRequest {
                source: SourceImage::new(ImageId(i), 1000 + i as u32, 800),
                focus: focus(i as f64 * 3.0, 50.0),
                attached: None,
            })
            .collect();

        let plans = plan_many(&requests, &sizes(), Path::new("/up"));
        assert_eq!(plans.len(), 32);
        for (req, plan) in requests.iter().zip(&plans) {
            assert_eq!(plan.source, req.source);
            assert_eq!(
                *plan,
                plan_crops(&req.source, req.focus, &sizes(), None, Path::new("/up"))
            );
        }
    }

    // =========================================================================
    // get_focus_point tests
    // =========================================================================

    #[test]
    fn get_focus_point_defaults_to_center() {
        let backend = MockBackend::new();
        assert_eq!(
            get_focus_point(&backend, ImageId(1)).unwrap(),
            FocusPoint::CENTER
        );
    }

    #[test]
    fn get_focus_point_returns_stored_value() {
        let stored = focus(20.0, 80.0);
        let backend = MockBackend::new().with_stored(ImageId(1), stored);
        assert_eq!(get_focus_point(&backend, ImageId(1)).unwrap(), stored);
    }

    // =========================================================================
    // refocus tests
    // =========================================================================

    #[test]
    fn refocus_saves_then_removes_stale_before_each_crop() {
        let backend = MockBackend::new()
            .with_source(SourceImage::new(ImageId(7), 1200, 800), Some("beach.jpg"))
            .with_sizes(sizes());

        let report = refocus(
            &backend,
            &backend,
            &backend,
            ImageId(7),
            focus(25.0, 75.0),
            Path::new("/up"),
        )
        .unwrap();
        assert_eq!(report.plan.jobs().count(), 2);
        assert!(report.stale_failures.is_empty());

        let ops = backend.get_operations();
        assert_eq!(
            ops[0],
            RecordedOp::SaveFocus {
                id: ImageId(7),
                x: 25.0,
                y: 75.0
            }
        );

        let tail: Vec<_> = ops
            .iter()
            .skip_while(|op| !matches!(op, RecordedOp::RemoveStale(_)))
            .collect();
        assert_eq!(tail.len(), 4);
        assert_eq!(
            *tail[0],
            RecordedOp::RemoveStale("/up/beach-150x150.jpg".to_string())
        );
        assert!(matches!(tail[1], RecordedOp::Crop { size, .. } if size == "thumbnail"));
        assert_eq!(
            *tail[2],
            RecordedOp::RemoveStale("/up/beach-400x300.jpg".to_string())
        );
        assert!(matches!(
            tail[3],
            RecordedOp::Crop { size, dest_width: 400, dest_height: 300, .. } if size == "card"
        ));
    }

    #[test]
    fn refocus_stores_focus_for_unreadable_source_without_cropping() {
        let backend = MockBackend::new().with_sizes(sizes());

        let report = refocus(
            &backend,
            &backend,
            &backend,
            ImageId(42),
            focus(10.0, 10.0),
            Path::new("/up"),
        )
        .unwrap();

        assert!(backend.crops().is_empty());
        assert!(
            report
                .plan
                .skipped()
                .all(|(_, reason)| reason == SkipReason::InvalidSource)
        );
        assert_eq!(
            get_focus_point(&backend, ImageId(42)).unwrap(),
            focus(10.0, 10.0)
        );
    }

    #[test]
    fn refocus_without_upload_path_skips_stale_removal() {
        let backend = MockBackend::new()
            .with_source(SourceImage::new(ImageId(7), 1200, 800), None)
            .with_sizes(sizes());

        refocus(
            &backend,
            &backend,
            &backend,
            ImageId(7),
            FocusPoint::default(),
            Path::new("/up"),
        )
        .unwrap();

        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::RemoveStale(_))));
        assert_eq!(backend.crops().len(), 2);
    }

    #[test]
    fn refocus_stops_on_resampler_failure() {
        let mut backend = MockBackend::new()
            .with_source(SourceImage::new(ImageId(7), 1200, 800), Some("beach.jpg"))
            .with_sizes(sizes());
        backend.fail_crop_for = Some("thumbnail".to_string());

        let err = refocus(
            &backend,
            &backend,
            &backend,
            ImageId(7),
            FocusPoint::default(),
            Path::new("/up"),
        )
        .unwrap_err();

        assert!(matches!(&err, OperationError::Crop { size, .. } if size == "thumbnail"));
        assert!(err.to_string().contains("cannot encode thumbnail"));
        assert!(backend.crops().is_empty());
    }

    #[test]
    fn refocus_keeps_cropping_when_stale_removal_fails() {
        let mut backend = MockBackend::new()
            .with_source(SourceImage::new(ImageId(7), 1200, 800), Some("beach.jpg"))
            .with_sizes(sizes());
        backend.fail_remove_stale = true;

        let report = refocus(
            &backend,
            &backend,
            &backend,
            ImageId(7),
            FocusPoint::default(),
            Path::new("/up"),
        )
        .unwrap();

        assert_eq!(backend.crops().len(), 2);
        let failed: Vec<_> = report
            .stale_failures
            .iter()
            .map(|f| f.path.clone())
            .collect();
        assert_eq!(
            failed,
            vec![
                PathBuf::from("/up/beach-150x150.jpg"),
                PathBuf::from("/up/beach-400x300.jpg"),
            ]
        );
        assert!(matches!(
            &report.stale_failures[0].error,
            BackendError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied
        ));
    }
}
