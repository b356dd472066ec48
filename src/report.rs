//! Report model shared by the message-stream correlator and the tree reader.
//!
//! Both readers expose the same [`ReportView`] so the summary, output and
//! annotation code never needs to know which input format it was handed.
pub mod ndjson;
pub mod status;
pub mod tree;

pub use status::{ScenarioStatus, StatusPolicy, StepStatus};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Aggregate scenario and step counters for one report.
///
/// Field names serialize to the camelCase keys downstream tooling reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInfo {
    pub scenario_number: u64,
    pub failed_scenario_number: u64,
    pub pending_scenario_number: u64,
    pub undefined_scenario_number: u64,
    pub succeed_scenario_number: u64,
    pub steps_number: u64,
    pub failed_steps_number: u64,
    pub skipped_steps_number: u64,
    pub undefined_steps_number: u64,
    pub succeed_steps_number: u64,
    pub pending_step_number: u64,
}

impl GlobalInfo {
    /// Count one recognized step result in its bucket.
    pub fn record_step(&mut self, status: StepStatus) {
        match status {
            StepStatus::Failed => self.failed_steps_number += 1,
            StepStatus::Pending => self.pending_step_number += 1,
            StepStatus::Undefined => self.undefined_steps_number += 1,
            StepStatus::Skipped => self.skipped_steps_number += 1,
            StepStatus::Passed => self.succeed_steps_number += 1,
        }
    }

    /// Count one classified scenario run. Only failed, pending and undefined
    /// runs have a counter; successes are derived afterwards.
    pub fn record_scenario(&mut self, status: ScenarioStatus) {
        match status {
            ScenarioStatus::Failed => self.failed_scenario_number += 1,
            ScenarioStatus::Pending => self.pending_scenario_number += 1,
            ScenarioStatus::Undefined => self.undefined_scenario_number += 1,
            ScenarioStatus::Success | ScenarioStatus::Skipped => {}
        }
    }

    /// Derive the succeeded scenario count, clamped at zero.
    pub fn derive_succeeded_scenarios(&mut self) {
        self.succeed_scenario_number = self
            .scenario_number
            .saturating_sub(self.failed_scenario_number)
            .saturating_sub(self.pending_scenario_number)
            .saturating_sub(self.undefined_scenario_number);
    }

    /// Sum counters field by field.
    pub fn combine(self, other: GlobalInfo) -> GlobalInfo {
        GlobalInfo {
            scenario_number: self.scenario_number + other.scenario_number,
            failed_scenario_number: self.failed_scenario_number + other.failed_scenario_number,
            pending_scenario_number: self.pending_scenario_number + other.pending_scenario_number,
            undefined_scenario_number: self.undefined_scenario_number
                + other.undefined_scenario_number,
            succeed_scenario_number: self.succeed_scenario_number + other.succeed_scenario_number,
            steps_number: self.steps_number + other.steps_number,
            failed_steps_number: self.failed_steps_number + other.failed_steps_number,
            skipped_steps_number: self.skipped_steps_number + other.skipped_steps_number,
            undefined_steps_number: self.undefined_steps_number + other.undefined_steps_number,
            succeed_steps_number: self.succeed_steps_number + other.succeed_steps_number,
            pending_step_number: self.pending_step_number + other.pending_step_number,
        }
    }
}

/// Step statuses that produce annotation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Failed,
    Undefined,
    Pending,
}

impl StepKind {
    pub fn step_status(self) -> StepStatus {
        match self {
            StepKind::Failed => StepStatus::Failed,
            StepKind::Undefined => StepStatus::Undefined,
            StepKind::Pending => StepStatus::Pending,
        }
    }

    /// Title suffix used in step annotations.
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Failed => "Failed",
            StepKind::Undefined => "Undefined",
            StepKind::Pending => "Pending",
        }
    }
}

/// One step result ready to become an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub file: String,
    pub line: u64,
    pub title: String,
    pub step: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub name: String,
    pub status: ScenarioStatus,
}

/// Scenario listing for one feature file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileScenarios {
    pub file: String,
    pub name: String,
    pub scenarios: Vec<ScenarioEntry>,
}

/// Input problems that were tolerated while reading a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub malformed_lines: u64,
    pub orphan_step_results: u64,
    /// Step results whose status has no summary bucket, keyed by status.
    pub unrecognized_statuses: BTreeMap<String, u64>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.malformed_lines == 0
            && self.orphan_step_results == 0
            && self.unrecognized_statuses.is_empty()
    }
}

/// Read-only projections over a fully read report.
pub trait ReportView {
    fn scenarios_by_file(&self) -> Vec<FileScenarios>;

    fn global_info(&self) -> GlobalInfo;

    fn steps_with_status(&self, kind: StepKind) -> Vec<StepRecord>;

    fn diagnostics(&self) -> Diagnostics {
        Diagnostics::default()
    }

    fn failed_steps(&self) -> Vec<StepRecord> {
        self.steps_with_status(StepKind::Failed)
    }

    fn undefined_steps(&self) -> Vec<StepRecord> {
        self.steps_with_status(StepKind::Undefined)
    }

    fn pending_steps(&self) -> Vec<StepRecord> {
        self.steps_with_status(StepKind::Pending)
    }
}

/// Every projection of a report, materialized for printing or comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub global_information: GlobalInfo,
    pub list_all_scenario_by_file: Vec<FileScenarios>,
    pub failed_steps: Vec<StepRecord>,
    pub undefined_steps: Vec<StepRecord>,
    pub pending_steps: Vec<StepRecord>,
    pub diagnostics: Diagnostics,
}

impl ReportSnapshot {
    pub fn capture(view: &dyn ReportView) -> Self {
        ReportSnapshot {
            global_information: view.global_info(),
            list_all_scenario_by_file: view.scenarios_by_file(),
            failed_steps: view.failed_steps(),
            undefined_steps: view.undefined_steps(),
            pending_steps: view.pending_steps(),
            diagnostics: view.diagnostics(),
        }
    }
}

/// Input layout of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One cucumber message per line.
    Messages,
    /// A single JSON array of feature reports.
    Tree,
}

impl ReportFormat {
    /// `.json` files are tree reports; anything else is read as messages.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ReportFormat::Tree,
            _ => ReportFormat::Messages,
        }
    }
}

/// Read a report of the given format.
///
/// Message streams never fail as a whole; a tree report that is not an array
/// of feature reports is an error.
pub fn read_report(
    format: ReportFormat,
    content: &str,
    policy: StatusPolicy,
) -> Result<Box<dyn ReportView>> {
    match format {
        ReportFormat::Messages => Ok(Box::new(ndjson::read(content, policy))),
        ReportFormat::Tree => Ok(Box::new(tree::read(content, policy)?)),
    }
}
