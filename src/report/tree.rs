//! Reader for the nested cucumber JSON report (one array of feature reports).
use crate::report::{
    FileScenarios, GlobalInfo, ReportView, ScenarioEntry, ScenarioStatus, StatusPolicy, StepKind,
    StepRecord, StepStatus,
};
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureReport {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A scenario or background element of a feature report.
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(rename = "type", default)]
    pub element_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub before: Vec<TreeStep>,
    #[serde(default)]
    pub after: Vec<TreeStep>,
    #[serde(default)]
    pub steps: Vec<TreeStep>,
}

impl Element {
    fn is_scenario(&self) -> bool {
        self.element_type == "scenario"
    }

    /// Hooks and steps in classification order: before, after, then steps.
    fn all_steps(&self) -> impl Iterator<Item = &TreeStep> {
        self.before.iter().chain(&self.after).chain(&self.steps)
    }

    fn steps_with_status(&self, status: StepStatus) -> impl Iterator<Item = &TreeStep> {
        self.all_steps()
            .filter(move |step| step.status() == Some(status))
    }

    fn has_step_with_status(&self, status: StepStatus) -> bool {
        self.steps_with_status(status).next().is_some()
    }

    fn status(&self, policy: StatusPolicy) -> ScenarioStatus {
        policy.classify(self.all_steps().filter_map(TreeStep::status))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line: u64,
    pub result: Option<TreeStepResult>,
}

impl TreeStep {
    fn status(&self) -> Option<StepStatus> {
        self.result
            .as_ref()
            .and_then(|result| StepStatus::from_tree(&result.status))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeStepResult {
    #[serde(default)]
    pub status: String,
    pub error_message: Option<String>,
}

/// A parsed tree report.
#[derive(Debug)]
pub struct TreeReport {
    features: Vec<FeatureReport>,
    policy: StatusPolicy,
}

/// Parse a tree report. The whole document must be an array of features.
pub fn read(content: &str, policy: StatusPolicy) -> Result<TreeReport> {
    let features: Vec<FeatureReport> =
        serde_json::from_str(content).context("parse cucumber JSON report")?;
    tracing::debug!(features = features.len(), "tree report parsed");
    Ok(TreeReport { features, policy })
}

fn scenarios(feature: &FeatureReport) -> impl Iterator<Item = &Element> {
    feature.elements.iter().filter(|element| element.is_scenario())
}

fn feature_global_info(feature: &FeatureReport) -> GlobalInfo {
    let count_scenarios = |status| {
        scenarios(feature)
            .filter(|scenario| scenario.has_step_with_status(status))
            .count() as u64
    };
    let count_steps = |status| {
        scenarios(feature)
            .map(|scenario| scenario.steps_with_status(status).count() as u64)
            .sum::<u64>()
    };

    let scenario_number = scenarios(feature).count() as u64;
    let failed_scenario_number = count_scenarios(StepStatus::Failed);
    let undefined_scenario_number = count_scenarios(StepStatus::Undefined);
    let pending_scenario_number = count_scenarios(StepStatus::Pending);
    // Only `steps` count towards the total; hook results still land in the
    // status buckets, so the passed remainder is clamped.
    let steps_number = scenarios(feature)
        .map(|scenario| scenario.steps.len() as u64)
        .sum::<u64>();
    let failed_steps_number = count_steps(StepStatus::Failed);
    let skipped_steps_number = count_steps(StepStatus::Skipped);
    let undefined_steps_number = count_steps(StepStatus::Undefined);
    let pending_step_number = count_steps(StepStatus::Pending);

    GlobalInfo {
        scenario_number,
        failed_scenario_number,
        pending_scenario_number,
        undefined_scenario_number,
        succeed_scenario_number: scenario_number
            .saturating_sub(failed_scenario_number)
            .saturating_sub(undefined_scenario_number)
            .saturating_sub(pending_scenario_number),
        steps_number,
        failed_steps_number,
        skipped_steps_number,
        undefined_steps_number,
        succeed_steps_number: steps_number
            .saturating_sub(failed_steps_number)
            .saturating_sub(skipped_steps_number)
            .saturating_sub(undefined_steps_number)
            .saturating_sub(pending_step_number),
        pending_step_number,
    }
}

impl ReportView for TreeReport {
    fn scenarios_by_file(&self) -> Vec<FileScenarios> {
        self.features
            .iter()
            .map(|feature| FileScenarios {
                file: feature.uri.clone(),
                name: feature.name.clone(),
                scenarios: scenarios(feature)
                    .map(|scenario| ScenarioEntry {
                        name: scenario.name.clone(),
                        status: scenario.status(self.policy),
                    })
                    .collect(),
            })
            .collect()
    }

    fn global_info(&self) -> GlobalInfo {
        self.features
            .iter()
            .map(feature_global_info)
            .fold(GlobalInfo::default(), GlobalInfo::combine)
    }

    /// One record per scenario, built from its first step with the status.
    fn steps_with_status(&self, kind: StepKind) -> Vec<StepRecord> {
        let status = kind.step_status();
        self.features
            .iter()
            .flat_map(|feature| {
                scenarios(feature).filter_map(move |scenario| {
                    let step = scenario.steps_with_status(status).next()?;
                    Some(StepRecord {
                        file: feature.uri.clone(),
                        line: step.line,
                        title: scenario.name.clone(),
                        step: step.name.clone(),
                        error: step
                            .result
                            .as_ref()
                            .and_then(|result| result.error_message.clone())
                            .unwrap_or_default(),
                    })
                })
            })
            .collect()
    }
}
