//! Check-run annotations for step failures and per-feature summaries.
use crate::config::{AnnotationLevel, AnnotationPolicy};
use crate::locate::SourceLocator;
use crate::report::{FileScenarios, ReportView, StepKind, StepRecord};
use serde::Serialize;

/// Upper bound on step annotations sent with one check run.
pub const MAX_STEP_ANNOTATIONS: usize = 49;

/// One annotation in the check-run API shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub path: String,
    pub start_line: u64,
    pub end_line: u64,
    pub start_column: u64,
    pub end_column: u64,
    pub annotation_level: AnnotationLevel,
    pub title: String,
    pub message: String,
}

pub fn step_annotation(
    record: &StepRecord,
    level: AnnotationLevel,
    kind: StepKind,
    locator: &mut SourceLocator,
) -> Annotation {
    Annotation {
        path: locator.resolve(&record.file),
        start_line: record.line,
        end_line: record.line,
        start_column: 0,
        end_column: 0,
        annotation_level: level,
        title: format!("{} {}", record.title, kind.label()),
        message: format!(
            "Scenario: {}\nStep: {}\nError: \n{}",
            record.title, record.step, record.error
        ),
    }
}

/// Failed, then undefined, then pending step annotations, capped at
/// [`MAX_STEP_ANNOTATIONS`]. Undefined and pending steps are only annotated
/// when a level is configured for them.
pub fn step_annotations(
    view: &dyn ReportView,
    policy: &AnnotationPolicy,
    locator: &mut SourceLocator,
) -> Vec<Annotation> {
    let kinds = [
        (StepKind::Failed, Some(policy.on_error)),
        (StepKind::Undefined, policy.on_undefined),
        (StepKind::Pending, policy.on_pending),
    ];

    let mut annotations = Vec::new();
    for (kind, level) in kinds {
        let Some(level) = level else {
            continue;
        };
        for record in view.steps_with_status(kind) {
            annotations.push(step_annotation(&record, level, kind, locator));
        }
    }
    if annotations.len() > MAX_STEP_ANNOTATIONS {
        tracing::info!(
            total = annotations.len(),
            kept = MAX_STEP_ANNOTATIONS,
            "truncating step annotations"
        );
        annotations.truncate(MAX_STEP_ANNOTATIONS);
    }
    annotations
}

/// Notice listing every scenario of a feature with its status marker.
pub fn feature_annotation(file: &FileScenarios, locator: &mut SourceLocator) -> Annotation {
    let message = file
        .scenarios
        .iter()
        .map(|scenario| format!("{} Scenario: {}", scenario.status.emoji(), scenario.name))
        .collect::<Vec<_>>()
        .join("\n");
    Annotation {
        path: locator.resolve(&file.file),
        start_line: 0,
        end_line: 0,
        start_column: 0,
        end_column: 0,
        annotation_level: AnnotationLevel::Notice,
        title: format!("Feature: {} Report", file.name),
        message,
    }
}

pub fn feature_annotations(view: &dyn ReportView, locator: &mut SourceLocator) -> Vec<Annotation> {
    view.scenarios_by_file()
        .iter()
        .map(|file| feature_annotation(file, locator))
        .collect()
}
