//! Validated run configuration for the summarize workflow.
use crate::cli::SummarizeArgs;
use crate::report::StatusPolicy;
use crate::util::read_text;
use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conclusion reported for a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    #[value(name = "timed_out")]
    TimedOut,
    #[value(name = "action_required")]
    ActionRequired,
}

/// Severity attached to a check-run annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Notice,
    Warning,
    Failure,
}

/// Check conclusions per report condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    pub on_error: CheckConclusion,
    pub on_undefined: CheckConclusion,
    pub on_pending: CheckConclusion,
}

/// Annotation levels per step status; `None` disables that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationPolicy {
    pub on_error: AnnotationLevel,
    pub on_undefined: Option<AnnotationLevel>,
    pub on_pending: Option<AnnotationLevel>,
}

/// Options for one summarize invocation, shared by every report it reads.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub check_name: String,
    pub checks: CheckPolicy,
    pub annotations: AnnotationPolicy,
    pub show_error_count_in_title: bool,
    /// Annotation count at which the run fails; `None` never fails.
    pub fail_threshold: Option<usize>,
    pub global_summary: bool,
    pub status_policy: StatusPolicy,
    pub workspace: PathBuf,
    pub head_sha: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub github_output: Option<PathBuf>,
    pub step_summary: Option<PathBuf>,
}

impl RunConfig {
    /// Validate parsed arguments into a run configuration.
    pub fn from_args(args: &SummarizeArgs) -> Result<Self> {
        let check_name = args.name.trim();
        if check_name.is_empty() {
            return Err(anyhow!("check name must not be empty"));
        }
        let fail_threshold = parse_fail_threshold(args.number_of_test_error_to_fail_job)?;
        let head_sha = resolve_head_sha(
            args.head_sha.as_deref(),
            args.event_path.as_deref(),
            args.github_sha.as_deref(),
        )?;

        Ok(RunConfig {
            check_name: check_name.to_string(),
            checks: CheckPolicy {
                on_error: args.check_status_on_error,
                on_undefined: args.check_status_on_undefined,
                on_pending: args.check_status_on_pending,
            },
            annotations: AnnotationPolicy {
                on_error: args.annotation_status_on_error,
                on_undefined: args.annotation_status_on_undefined,
                on_pending: args.annotation_status_on_pending,
            },
            show_error_count_in_title: args.show_number_of_error_on_check_title,
            fail_threshold,
            global_summary: args.show_global_summary_report,
            status_policy: args.status_policy,
            workspace: args.workspace.clone(),
            head_sha,
            out_dir: args.out_dir.clone(),
            github_output: args.github_output.clone(),
            step_summary: args.step_summary.clone(),
        })
    }
}

/// The parts of a webhook event payload used to pick the check-run commit.
#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequest>,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    head: PullRequestHead,
}

#[derive(Debug, Deserialize)]
struct PullRequestHead {
    sha: String,
}

/// Commit for the check run: an explicit sha, else the pull request head from
/// the event payload, else the commit that triggered the workflow.
pub fn resolve_head_sha(
    explicit: Option<&str>,
    event_path: Option<&Path>,
    github_sha: Option<&str>,
) -> Result<Option<String>> {
    let non_blank = |sha: &str| Some(sha.trim()).filter(|sha| !sha.is_empty()).map(str::to_string);
    if let Some(sha) = explicit.and_then(non_blank) {
        return Ok(Some(sha));
    }
    if let Some(path) = event_path {
        let payload: EventPayload = serde_json::from_str(&read_text(path)?)
            .with_context(|| format!("parse event payload {}", path.display()))?;
        if let Some(sha) = payload
            .pull_request
            .and_then(|pull_request| non_blank(&pull_request.head.sha))
        {
            tracing::debug!(sha = %sha, "using pull request head commit");
            return Ok(Some(sha));
        }
    }
    Ok(github_sha.and_then(non_blank))
}

fn parse_fail_threshold(raw: i64) -> Result<Option<usize>> {
    match raw {
        -1 => Ok(None),
        n if n >= 0 => usize::try_from(n)
            .map(Some)
            .map_err(|_| anyhow!("failure threshold {n} is too large")),
        n => Err(anyhow!(
            "unsupported failure threshold {n}; use -1 to disable or a non-negative count"
        )),
    }
}
