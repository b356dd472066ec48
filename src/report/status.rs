//! Step and scenario status classification shared by both report readers.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Step result statuses that land in a summary bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    Failed,
    Pending,
    Undefined,
    Skipped,
}

impl StepStatus {
    /// Parse a status as written in the message stream (`FAILED`, `PASSED`, ...).
    pub fn from_message(raw: &str) -> Option<Self> {
        match raw {
            "PASSED" => Some(StepStatus::Passed),
            "FAILED" => Some(StepStatus::Failed),
            "PENDING" => Some(StepStatus::Pending),
            "UNDEFINED" => Some(StepStatus::Undefined),
            "SKIPPED" => Some(StepStatus::Skipped),
            _ => None,
        }
    }

    /// Parse a status as written in the tree report (`failed`, `passed`, ...).
    pub fn from_tree(raw: &str) -> Option<Self> {
        match raw {
            "passed" => Some(StepStatus::Passed),
            "failed" => Some(StepStatus::Failed),
            "pending" => Some(StepStatus::Pending),
            "undefined" => Some(StepStatus::Undefined),
            "skipped" => Some(StepStatus::Skipped),
            _ => None,
        }
    }
}

/// Execution status of one scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Success,
    Failed,
    Undefined,
    Pending,
    Skipped,
}

impl ScenarioStatus {
    /// Scenario status implied by a single step, if that step is terminal.
    fn from_step(status: StepStatus) -> Option<Self> {
        match status {
            StepStatus::Failed => Some(ScenarioStatus::Failed),
            StepStatus::Undefined => Some(ScenarioStatus::Undefined),
            StepStatus::Pending => Some(ScenarioStatus::Pending),
            StepStatus::Skipped => Some(ScenarioStatus::Skipped),
            StepStatus::Passed => None,
        }
    }

    fn severity(self) -> u8 {
        match self {
            ScenarioStatus::Success => 0,
            ScenarioStatus::Skipped => 1,
            ScenarioStatus::Pending => 2,
            ScenarioStatus::Undefined => 3,
            ScenarioStatus::Failed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioStatus::Success => "success",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Undefined => "undefined",
            ScenarioStatus::Pending => "pending",
            ScenarioStatus::Skipped => "skipped",
        }
    }

    /// Marker shown in front of a scenario in feature summary annotations.
    pub fn emoji(self) -> &'static str {
        match self {
            ScenarioStatus::Success => "✅",
            ScenarioStatus::Failed => "❌",
            ScenarioStatus::Pending => "⌛",
            ScenarioStatus::Undefined => "❓",
            ScenarioStatus::Skipped => "⏭️",
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the step results of one scenario run reduce to a single status.
///
/// `FirstMatch` scans results in execution order and lets the first
/// failed/undefined/pending/skipped result decide, which is what existing
/// report consumers expect. A skipped hook ahead of a failed step therefore
/// reports the scenario as skipped. `Worst` picks the most severe status seen
/// anywhere in the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusPolicy {
    #[default]
    FirstMatch,
    Worst,
}

impl StatusPolicy {
    /// Classify a run from its recognized step statuses in execution order.
    ///
    /// Runs with no terminal status, including runs with no results at all,
    /// are a success.
    pub fn classify<I>(self, statuses: I) -> ScenarioStatus
    where
        I: IntoIterator<Item = StepStatus>,
    {
        let mut terminal = statuses.into_iter().filter_map(ScenarioStatus::from_step);
        let status = match self {
            StatusPolicy::FirstMatch => terminal.next(),
            StatusPolicy::Worst => terminal.max_by_key(|status| status.severity()),
        };
        status.unwrap_or(ScenarioStatus::Success)
    }
}
