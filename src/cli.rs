//! CLI argument parsing for the report summarizer.
//!
//! Every summarize option can also come from the environment so the binary
//! can be dropped into a CI step without a wrapper script.
use crate::config::{AnnotationLevel, CheckConclusion};
use crate::report::StatusPolicy;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Check name used when none is configured.
pub const DEFAULT_CHECK_NAME: &str = "Cucumber report";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "cukereport",
    version,
    about = "Summarize cucumber reports into check-run annotations",
    after_help = "Commands:\n  summarize <REPORT>...  Summarize reports, publish outputs and check-run payloads\n  inspect <REPORT>       Print the correlated view of one report as JSON\n\nExamples:\n  cukereport summarize reports/cucumber.ndjson --out-dir target/checks\n  cukereport summarize reports/*.json --annotation-status-on-undefined warning\n  cukereport inspect reports/cucumber.ndjson",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Summarize(SummarizeArgs),
    Inspect(InspectArgs),
}

/// Summarize command inputs.
#[derive(Parser, Debug)]
#[command(about = "Summarize reports and build check-run annotations")]
pub struct SummarizeArgs {
    /// Report files; `.json` files are tree reports, anything else message streams
    #[arg(required = true, value_name = "REPORT")]
    pub reports: Vec<PathBuf>,

    /// Name of the check run
    #[arg(long, env = "CUKEREPORT_NAME", default_value = DEFAULT_CHECK_NAME)]
    pub name: String,

    /// Check conclusion when at least one scenario failed
    #[arg(long, env = "CUKEREPORT_CHECK_STATUS_ON_ERROR", value_enum, default_value_t = CheckConclusion::Failure)]
    pub check_status_on_error: CheckConclusion,

    /// Check conclusion when at least one step is undefined
    #[arg(long, env = "CUKEREPORT_CHECK_STATUS_ON_UNDEFINED", value_enum, default_value_t = CheckConclusion::Success)]
    pub check_status_on_undefined: CheckConclusion,

    /// Check conclusion when at least one step is pending
    #[arg(long, env = "CUKEREPORT_CHECK_STATUS_ON_PENDING", value_enum, default_value_t = CheckConclusion::Success)]
    pub check_status_on_pending: CheckConclusion,

    /// Annotation level for failed steps
    #[arg(long, env = "CUKEREPORT_ANNOTATION_STATUS_ON_ERROR", value_enum, default_value_t = AnnotationLevel::Failure)]
    pub annotation_status_on_error: AnnotationLevel,

    /// Annotation level for undefined steps (not annotated when unset)
    #[arg(long, env = "CUKEREPORT_ANNOTATION_STATUS_ON_UNDEFINED", value_enum)]
    pub annotation_status_on_undefined: Option<AnnotationLevel>,

    /// Annotation level for pending steps (not annotated when unset)
    #[arg(long, env = "CUKEREPORT_ANNOTATION_STATUS_ON_PENDING", value_enum)]
    pub annotation_status_on_pending: Option<AnnotationLevel>,

    /// Append the failed scenario count to the check title
    #[arg(long, env = "CUKEREPORT_SHOW_ERROR_COUNT", action = ArgAction::Set, default_value_t = true)]
    pub show_number_of_error_on_check_title: bool,

    /// Fail once a report yields this many annotations (-1 never fails)
    #[arg(long, env = "CUKEREPORT_FAIL_THRESHOLD", allow_negative_numbers = true, default_value_t = -1)]
    pub number_of_test_error_to_fail_job: i64,

    /// Also emit one summary annotation per feature file
    #[arg(long, env = "CUKEREPORT_GLOBAL_SUMMARY", action = ArgAction::Set, default_value_t = false)]
    pub show_global_summary_report: bool,

    /// How step results reduce to a scenario status
    #[arg(long, env = "CUKEREPORT_STATUS_POLICY", value_enum, default_value_t = StatusPolicy::FirstMatch)]
    pub status_policy: StatusPolicy,

    /// Checkout root used to resolve feature file paths
    #[arg(long, env = "GITHUB_WORKSPACE", value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Commit the check run is attached to; defaults to the pull request head
    #[arg(long, env = "CUKEREPORT_HEAD_SHA", value_name = "SHA")]
    pub head_sha: Option<String>,

    /// Webhook event payload, read for the pull request head commit
    #[arg(long, env = "GITHUB_EVENT_PATH", value_name = "PATH")]
    pub event_path: Option<PathBuf>,

    /// Commit that triggered the workflow, used when no pull request head is known
    #[arg(long, env = "GITHUB_SHA", value_name = "SHA")]
    pub github_sha: Option<String>,

    /// Directory for check-run request bodies
    #[arg(long, env = "CUKEREPORT_OUT_DIR", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// File that output variables are appended to
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub github_output: Option<PathBuf>,

    /// File that the markdown step summary is appended to
    #[arg(long, env = "GITHUB_STEP_SUMMARY", value_name = "PATH")]
    pub step_summary: Option<PathBuf>,
}

/// Inspect command inputs.
#[derive(Parser, Debug)]
#[command(about = "Print the correlated view of one report as JSON")]
pub struct InspectArgs {
    /// Report file to read
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    /// How step results reduce to a scenario status
    #[arg(long, value_enum, default_value_t = StatusPolicy::FirstMatch)]
    pub status_policy: StatusPolicy,
}
