//! CLI output formatting for the plan and build commands.
//!
//! # Information-First Display
//!
//! Output is organised around targets and source images, not files. Each
//! (target, image) pair leads with its identity; crop geometry and the
//! written path follow as indented context lines.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Sources
//! 001 Spicy_Dark (3000x2000)
//! 002 Spicy_Dark_solo: skipped
//!     Reason: failed to read ./Spicy_Dark_solo.png: No such file or directory
//!
//! Targets
//! 001 HD Landscape (1280x720)
//!     Spicy_Dark: crop 3000x1125 at (0, 438)
//! 002 HD Portrait (720x1280)
//!     Spicy_Dark: crop 1687x2000 at (657, 0)
//! ```
//!
//! ## Build
//!
//! ```text
//! Spicy_Dark (3000x2000)
//! HD Landscape / Spicy_Dark
//!     Crop: 3000x1125 at (0, 438)
//!     Output: resized/HD Landscape/Spicy_Dark.png
//! HD Portrait / Spicy_Dark: failed
//!     Reason: encode failed: ...
//!
//! 27 written, 1 failed (14 targets x 2 images), 0 sources skipped
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and, where the CLI needs it, a `print_*` wrapper that writes to stdout.
//! Format functions are pure: no I/O, no side effects.

use crate::config::RunConfig;
use crate::imaging::CropParams;
use crate::process::{BatchReport, ProcessEvent, SourceFailure, SourcePlan};
use crate::types::Target;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + name, with optional detail.
///
/// ```text
/// 001 HD Landscape (1280x720)
/// 002 Spicy_Dark
/// ```
fn entity_header(index: usize, name: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), name, d),
        None => format!("{} {}", format_index(index), name),
    }
}

/// `WxH at (x, y)`
fn crop_line(crop: &CropParams) -> String {
    format!("{}x{} at ({}, {})", crop.width, crop.height, crop.x, crop.y)
}

/// Identity of one output: `target / image`.
fn pair_label(target: &str, image: &str) -> String {
    format!("{} / {}", target, image)
}

// ============================================================================
// Config
// ============================================================================

/// Format the resolved settings a build or plan is about to use.
pub fn format_run_header(config: &RunConfig) -> Vec<String> {
    vec![
        format!("Input: {}", config.input_dir.display()),
        format!("Output: {}", config.output_dir.display()),
        format!(
            "{} images x {} targets as .{}",
            config.images.len(),
            config.targets.len(),
            config.extension
        ),
    ]
}

pub fn print_run_header(config: &RunConfig) {
    for line in format_run_header(config) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format the dry-run geometry for every source and target.
///
/// Sources are listed first so identification failures are visible before
/// the per-target crops they are missing from.
pub fn format_plan(
    targets: &[Target],
    plans: &[SourcePlan],
    skipped: &[SourceFailure],
    images: &[String],
) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];

    for (i, name) in images.iter().enumerate() {
        if let Some(plan) = plans.iter().find(|p| &p.name == name) {
            lines.push(entity_header(i + 1, name, Some(&plan.dimensions.to_string())));
        } else if let Some(failure) = skipped.iter().find(|s| &s.name == name) {
            lines.push(format!("{}: skipped", entity_header(i + 1, name, None)));
            lines.push(format!("{}Reason: {}", indent(1), failure.error));
        }
    }

    lines.push(String::new());
    lines.push("Targets".to_string());

    for (i, target) in targets.iter().enumerate() {
        lines.push(entity_header(
            i + 1,
            &target.name,
            Some(&target.display().to_string()),
        ));
        for plan in plans {
            let crop = plan
                .crops
                .iter()
                .find(|(name, _)| name == &target.name)
                .map(|(_, crop)| crop);
            match crop {
                Some(Ok(crop)) => lines.push(format!(
                    "{}{}: crop {}",
                    indent(1),
                    plan.name,
                    crop_line(crop)
                )),
                Some(Err(e)) => lines.push(format!("{}{}: {}", indent(1), plan.name, e)),
                None => {}
            }
        }
    }
    lines
}

pub fn print_plan(
    targets: &[Target],
    plans: &[SourcePlan],
    skipped: &[SourceFailure],
    images: &[String],
) {
    for line in format_plan(targets, plans, skipped, images) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::SourceLoaded { name, dimensions } => {
            vec![format!("{} ({})", name, dimensions)]
        }
        ProcessEvent::SourceSkipped { name, reason } => vec![
            format!("{}: skipped", name),
            format!("{}Reason: {}", indent(1), reason),
        ],
        ProcessEvent::PairWritten {
            target,
            image,
            crop,
            output,
        } => vec![
            pair_label(target, image),
            format!("{}Crop: {}", indent(1), crop_line(crop)),
            format!("{}Output: {}", indent(1), output.display()),
        ],
        ProcessEvent::PairFailed {
            target,
            image,
            reason,
        } => vec![
            format!("{}: failed", pair_label(target, image)),
            format!("{}Reason: {}", indent(1), reason),
        ],
    }
}

/// Format the end-of-run summary, repeating every failure.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![report.to_string()];
    for failure in &report.skipped {
        lines.push(format!("{}{}: {}", indent(1), failure.name, failure.error));
    }
    for pair in &report.pairs {
        if let Err(e) = &pair.result {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                pair_label(&pair.target, &pair.image),
                e
            ));
        }
    }
    lines
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
