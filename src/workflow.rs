use crate::annotate::{feature_annotations, step_annotations, Annotation};
use crate::cli::{InspectArgs, SummarizeArgs};
use crate::config::{CheckConclusion, RunConfig};
use crate::locate::SourceLocator;
use crate::publish::{self, CheckRunOutput, CheckRunRequest};
use crate::report::{read_report, GlobalInfo, ReportFormat, ReportSnapshot};
use crate::summary::{check_conclusion, check_title, output_variables, summary_text};
use crate::util::{read_text, report_output_name};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// What summarizing one report produced.
#[derive(Debug)]
pub struct ReportOutcome {
    pub report_name: String,
    pub global: GlobalInfo,
    pub conclusion: CheckConclusion,
    pub title: String,
    pub summary: String,
    pub annotations: Vec<Annotation>,
    pub feature_annotations: Vec<Annotation>,
}

impl ReportOutcome {
    /// Whether this report's annotations reach the configured failure threshold.
    pub fn reaches_threshold(&self, threshold: Option<usize>) -> bool {
        threshold.is_some_and(|limit| self.annotations.len() >= limit)
    }
}

pub fn run_summarize(args: SummarizeArgs) -> Result<()> {
    let config = RunConfig::from_args(&args)?;
    let mut locator = SourceLocator::new(&config.workspace);
    let mut failing_tests = 0usize;
    let mut threshold_reached = false;

    for path in &args.reports {
        tracing::info!(report = %path.display(), "processing cucumber report");
        let outcome = summarize_report(path, &config, &mut locator)?;
        publish_outcome(&outcome, &config)?;
        if outcome.reaches_threshold(config.fail_threshold) {
            tracing::error!(
                report = %path.display(),
                annotations = outcome.annotations.len(),
                "{} test(s) failed",
                outcome.annotations.len()
            );
            failing_tests += outcome.annotations.len();
            threshold_reached = true;
        }
    }

    if threshold_reached {
        return Err(anyhow!("{failing_tests} test(s) failed"));
    }
    Ok(())
}

/// Read one report and build everything published for it.
pub fn summarize_report(
    path: &Path,
    config: &RunConfig,
    locator: &mut SourceLocator,
) -> Result<ReportOutcome> {
    let content = read_text(path)?;
    let format = ReportFormat::from_path(path);
    let view = read_report(format, &content, config.status_policy)
        .with_context(|| format!("read report {}", path.display()))?;

    let global = view.global_info();
    let summary = summary_text(&global);
    tracing::info!(report = %path.display(), "summary:\n{summary}");

    let annotations = step_annotations(view.as_ref(), &config.annotations, locator);
    let feature_annotations = if config.global_summary {
        feature_annotations(view.as_ref(), locator)
    } else {
        Vec::new()
    };

    Ok(ReportOutcome {
        report_name: report_output_name(path),
        conclusion: check_conclusion(&global, &config.checks),
        title: check_title(
            &config.check_name,
            &global,
            config.show_error_count_in_title,
        ),
        global,
        summary,
        annotations,
        feature_annotations,
    })
}

fn publish_outcome(outcome: &ReportOutcome, config: &RunConfig) -> Result<()> {
    if let Some(path) = &config.github_output {
        publish::append_outputs(path, &output_variables(&outcome.report_name, &outcome.global))?;
    }
    if let Some(path) = &config.step_summary {
        publish::append_step_summary(path, &outcome.title, &outcome.summary)?;
    }

    let Some(out_dir) = &config.out_dir else {
        tracing::debug!(
            report = %outcome.report_name,
            "no output directory configured; check-run payload not written"
        );
        return Ok(());
    };
    let request = CheckRunRequest::completed(
        &config.check_name,
        config.head_sha.as_deref(),
        outcome.conclusion,
        CheckRunOutput {
            title: outcome.title.clone(),
            summary: outcome.summary.clone(),
            annotations: outcome.annotations.clone(),
        },
    );
    let path = publish::check_run_path(out_dir, &outcome.report_name);
    publish::write_json(&path, &request)?;
    tracing::info!(
        path = %path.display(),
        annotations = outcome.annotations.len(),
        conclusion = ?outcome.conclusion,
        "wrote check-run payload"
    );

    if config.global_summary {
        let path = publish::summary_annotations_path(out_dir, &outcome.report_name);
        publish::write_json(&path, &outcome.feature_annotations)?;
        tracing::info!(
            path = %path.display(),
            features = outcome.feature_annotations.len(),
            "wrote feature summary annotations"
        );
    }
    Ok(())
}

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let content = read_text(&args.report)?;
    let format = ReportFormat::from_path(&args.report);
    let view = read_report(format, &content, args.status_policy)
        .with_context(|| format!("read report {}", args.report.display()))?;
    let snapshot = ReportSnapshot::capture(view.as_ref());
    let text = serde_json::to_string_pretty(&snapshot).context("serialize report view")?;
    println!("{text}");
    Ok(())
}
