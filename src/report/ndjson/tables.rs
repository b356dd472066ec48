//! Entity records and the id-keyed tables that hold them.
//!
//! Entities reference each other by id only; every link is resolved through
//! the owning table when it is read. Tables keep registration order, which is
//! the order the view and the finalizer walk them in.
use super::envelope::{Location, TestStepResult};
use crate::report::{ScenarioStatus, StatusPolicy, StepStatus};
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub uri: String,
    pub name: String,
    pub scenario_ids: Vec<String>,
}

/// A declared scenario and the pickles expanded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub pickle_ids: IndexSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition {
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pickle {
    pub id: String,
    pub name: String,
    pub uri: String,
    /// Set only when the declared scenario was known when the pickle arrived.
    pub scenario_id: Option<String>,
    pub step_ids: Vec<String>,
    pub test_case_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickleStep {
    pub id: String,
    pub text: String,
    pub pickle_id: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub id: String,
    pub pickle_id: String,
    pub step_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStep {
    pub id: String,
    /// Unset for hook steps and for steps whose pickle step was never seen.
    pub pickle_step_id: Option<String>,
    pub result: Option<TestStepResult>,
}

impl TestStep {
    /// Recognized status of the recorded result, if any.
    pub fn status(&self) -> Option<StepStatus> {
        self.result
            .as_ref()
            .and_then(|result| StepStatus::from_message(&result.status))
    }
}

#[derive(Debug, Default)]
pub struct IdentityTables {
    pub features: Vec<Feature>,
    pub scenarios: IndexMap<String, Scenario>,
    pub step_definitions: IndexMap<String, StepDefinition>,
    pub pickles: IndexMap<String, Pickle>,
    pub pickle_steps: IndexMap<String, PickleStep>,
    pub test_cases: IndexMap<String, TestCase>,
    pub test_steps: IndexMap<String, TestStep>,
}

impl IdentityTables {
    /// Classify a test case from its step results in planned order.
    pub fn test_case_status(&self, test_case: &TestCase, policy: StatusPolicy) -> ScenarioStatus {
        let statuses = test_case
            .step_ids
            .iter()
            .filter_map(|id| self.test_steps.get(id))
            .filter_map(TestStep::status);
        policy.classify(statuses)
    }

    /// Status of a pickle's run; a pickle that was never planned is a success.
    pub fn pickle_status(&self, pickle: &Pickle, policy: StatusPolicy) -> ScenarioStatus {
        pickle
            .test_case_id
            .as_deref()
            .and_then(|id| self.test_cases.get(id))
            .map_or(ScenarioStatus::Success, |test_case| {
                self.test_case_status(test_case, policy)
            })
    }

    /// Resolve the pickle step and pickle a test step executes.
    pub fn step_owner(&self, step: &TestStep) -> Option<(&PickleStep, &Pickle)> {
        let pickle_step = self.pickle_steps.get(step.pickle_step_id.as_deref()?)?;
        let pickle = self.pickles.get(&pickle_step.pickle_id)?;
        Some((pickle_step, pickle))
    }

    pub fn pickle_scenario(&self, pickle: &Pickle) -> Option<&Scenario> {
        self.scenarios.get(pickle.scenario_id.as_deref()?)
    }
}
