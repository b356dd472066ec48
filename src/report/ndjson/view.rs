//! Report projections over finalized identity tables.
use super::tables::IdentityTables;
use crate::report::{
    Diagnostics, FileScenarios, GlobalInfo, ReportView, ScenarioEntry, StatusPolicy, StepKind,
    StepRecord,
};

/// A fully correlated message-stream report.
#[derive(Debug)]
pub struct MessageReport {
    pub(super) tables: IdentityTables,
    pub(super) global: GlobalInfo,
    pub(super) diagnostics: Diagnostics,
    pub(super) policy: StatusPolicy,
}

impl MessageReport {
    pub fn tables(&self) -> &IdentityTables {
        &self.tables
    }
}

impl ReportView for MessageReport {
    fn scenarios_by_file(&self) -> Vec<FileScenarios> {
        self.tables
            .features
            .iter()
            .map(|feature| FileScenarios {
                file: feature.uri.clone(),
                name: feature.name.clone(),
                scenarios: feature
                    .scenario_ids
                    .iter()
                    .filter_map(|id| self.tables.scenarios.get(id))
                    .flat_map(move |scenario| {
                        scenario
                            .pickle_ids
                            .iter()
                            .filter_map(move |id| self.tables.pickles.get(id))
                            .map(move |pickle| ScenarioEntry {
                                name: scenario.name.clone(),
                                status: self.tables.pickle_status(pickle, self.policy),
                            })
                    })
                    .collect(),
            })
            .collect()
    }

    fn global_info(&self) -> GlobalInfo {
        self.global
    }

    fn steps_with_status(&self, kind: StepKind) -> Vec<StepRecord> {
        let wanted = kind.step_status();
        self.tables
            .test_steps
            .values()
            .filter(|step| step.status() == Some(wanted))
            .filter_map(|step| {
                let (pickle_step, pickle) = self.tables.step_owner(step)?;
                let file = match self.tables.pickle_scenario(pickle) {
                    Some(scenario) => scenario.uri.clone(),
                    None if !pickle.uri.is_empty() => pickle.uri.clone(),
                    None => return None,
                };
                let error = step
                    .result
                    .as_ref()
                    .and_then(|result| result.message.clone())
                    .unwrap_or_default();
                Some(StepRecord {
                    file,
                    line: pickle_step.location.line,
                    title: pickle.name.clone(),
                    step: pickle_step.text.clone(),
                    error,
                })
            })
            .collect()
    }

    fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.clone()
    }
}
