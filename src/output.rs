//! CLI output formatting.
//!
//! Every entity follows the same two-level layout: a header line naming the
//! thing, then indented context lines.
//!
//! ## Plan
//!
//! ```text
//! #7 beach.jpg 1200x800, focus 25,75
//!     thumbnail 150x150 → crop 800x800 at 0,0
//!         Output: uploads/beach-150x150.jpg
//!     banner 1600x400 → skipped: target is larger than the source
//! 1 cropped, 1 skipped
//! ```
//!
//! ## Check
//!
//! ```text
//! Sizes
//!     thumbnail 150x150: crop
//!     medium 300x300: resize only
//!     medium_large 768x0: resize only
//! 1 of 3 sizes are cropped around the focus point
//! ```
//!
//! Format functions return `Vec<String>` and do no I/O; `print_*` wrappers
//! write them to stdout.

use crate::cropping::{CropPlan, PlanOutcome};
use crate::types::{CropRectangle, TargetSize};

/// Render a pixel coordinate without trailing zeros: `800`, `133.33`.
fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        let s = format!("{rounded:.2}");
        s.trim_end_matches('0').to_string()
    }
}

fn rect_line(rect: &CropRectangle) -> String {
    format!(
        "crop {}x{} at {},{}",
        px(rect.width),
        px(rect.height),
        px(rect.x),
        px(rect.y)
    )
}

fn size_label(size: &TargetSize) -> String {
    format!("{} {}x{}", size.name, size.width, size.height)
}

/// Format one image's crop plan.
pub fn format_plan(plan: &CropPlan, label: Option<&str>) -> Vec<String> {
    let dims = plan.source.dimensions;
    let mut header = plan.source.id.to_string();
    if let Some(label) = label {
        header.push(' ');
        header.push_str(label);
    }
    let mut lines = vec![format!(
        "{header} {}x{}, focus {}",
        dims.width, dims.height, plan.focus
    )];

    for planned in &plan.sizes {
        match &planned.outcome {
            PlanOutcome::Crop(params) => {
                lines.push(format!(
                    "    {} → {}",
                    size_label(&planned.target),
                    rect_line(&params.rect)
                ));
                if let Some(output) = &params.output {
                    lines.push(format!("        Output: {}", output.display()));
                }
            }
            PlanOutcome::Skipped { reason } => {
                lines.push(format!(
                    "    {} → skipped: {}",
                    size_label(&planned.target),
                    reason.describe()
                ));
            }
        }
    }

    let cropped = plan.jobs().count();
    let skipped = plan.skipped().count();
    lines.push(format!("{cropped} cropped, {skipped} skipped"));
    lines
}

/// Format the configured size registry.
pub fn format_sizes(sizes: &[TargetSize]) -> Vec<String> {
    let mut lines = vec!["Sizes".to_string()];
    let mut cropped = 0;

    for size in sizes {
        let mode = if !size.crop {
            "resize only"
        } else if size.ratio().is_none() {
            "ignored (zero dimension)"
        } else {
            cropped += 1;
            "crop"
        };
        lines.push(format!("    {}: {mode}", size_label(size)));
    }

    lines.push(format!(
        "{cropped} of {} sizes are cropped around the focus point",
        sizes.len()
    ));
    lines
}

pub fn print_plan(plan: &CropPlan, label: Option<&str>) {
    for line in format_plan(plan, label) {
        println!("{}", line);
    }
}

pub fn print_sizes(sizes: &[TargetSize]) {
    for line in format_sizes(sizes) {
        println!("{}", line);
    }
}
