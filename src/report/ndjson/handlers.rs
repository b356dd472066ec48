//! Event handlers that grow the identity tables and the running counters.
use super::envelope::{
    DecodeError, Event, FeatureChild, GherkinDocument, Location, PickleMessage, TestCaseMessage,
    TestStepFinished,
};
use super::tables::{
    Feature, IdentityTables, Pickle, PickleStep, Scenario, StepDefinition, TestCase, TestStep,
};
use crate::report::{Diagnostics, GlobalInfo, StepStatus};
use indexmap::IndexSet;

/// Correlation state for a single report read.
#[derive(Debug, Default)]
pub struct Correlator {
    pub tables: IdentityTables,
    pub global: GlobalInfo,
    pub diagnostics: Diagnostics,
}

impl Correlator {
    /// Apply one decoder item; decode failures are counted and logged.
    pub fn accept(&mut self, item: Result<Event, DecodeError>) {
        match item {
            Ok(event) => self.apply(event),
            Err(err) => {
                self.diagnostics.malformed_lines += 1;
                tracing::warn!(line = err.line_number, error = %err, "skipping malformed message");
            }
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::DocumentDeclared(document) => self.on_document_declared(document),
            Event::PickleGenerated(pickle) => self.on_pickle_generated(pickle),
            Event::TestCasePlanned(test_case) => self.on_test_case_planned(test_case),
            Event::TestStepFinished(finished) => self.on_test_step_finished(finished),
        }
    }

    fn on_document_declared(&mut self, document: GherkinDocument) {
        let Some(feature) = document.feature else {
            tracing::debug!(uri = %document.uri, "document declares no feature");
            return;
        };

        // Rule children are flattened one level into the feature.
        let mut children: Vec<&FeatureChild> = Vec::new();
        for child in &feature.children {
            match &child.rule {
                Some(rule) => children.extend(rule.children.iter()),
                None => children.push(child),
            }
        }

        let mut scenario_ids = Vec::new();
        for node in children.iter().filter_map(|child| child.scenario.as_ref()) {
            let scenario = Scenario {
                id: node.id.clone(),
                name: node.name.clone(),
                uri: document.uri.clone(),
                pickle_ids: IndexSet::new(),
            };
            self.tables.scenarios.insert(node.id.clone(), scenario);
            scenario_ids.push(node.id.clone());
        }

        for child in &children {
            let steps = match (&child.background, &child.scenario) {
                (Some(background), _) => &background.steps,
                (None, Some(scenario)) => &scenario.steps,
                (None, None) => continue,
            };
            for step in steps {
                self.tables.step_definitions.insert(
                    step.id.clone(),
                    StepDefinition {
                        location: step.location,
                    },
                );
            }
        }

        self.tables.features.push(Feature {
            uri: document.uri,
            name: feature.name,
            scenario_ids,
        });
    }

    /// Only the first ast node id links a pickle to its declared scenario, and
    /// only the first ast node id of a step links it to its definition.
    fn on_pickle_generated(&mut self, message: PickleMessage) {
        let scenario_id = message
            .ast_node_ids
            .first()
            .filter(|id| self.tables.scenarios.contains_key(id.as_str()))
            .cloned();
        if scenario_id.is_none() {
            tracing::debug!(pickle = %message.id, "pickle has no declared scenario");
        }

        let mut step_ids = Vec::with_capacity(message.steps.len());
        for step in message.steps {
            let location = step
                .ast_node_ids
                .first()
                .and_then(|id| self.tables.step_definitions.get(id))
                .and_then(|definition| definition.location)
                .unwrap_or(Location { line: 0 });
            step_ids.push(step.id.clone());
            self.tables.pickle_steps.insert(
                step.id.clone(),
                PickleStep {
                    id: step.id,
                    text: step.text,
                    pickle_id: message.id.clone(),
                    location,
                },
            );
        }

        if let Some(scenario) = scenario_id
            .as_deref()
            .and_then(|id| self.tables.scenarios.get_mut(id))
        {
            scenario.pickle_ids.insert(message.id.clone());
        }

        self.tables.pickles.insert(
            message.id.clone(),
            Pickle {
                id: message.id,
                name: message.name,
                uri: message.uri,
                scenario_id,
                step_ids,
                test_case_id: None,
            },
        );
    }

    fn on_test_case_planned(&mut self, message: TestCaseMessage) {
        self.global.scenario_number += 1;

        let mut step_ids = Vec::with_capacity(message.test_steps.len());
        for step in message.test_steps {
            let pickle_step_id = step
                .pickle_step_id
                .filter(|id| self.tables.pickle_steps.contains_key(id.as_str()));
            step_ids.push(step.id.clone());
            self.tables.test_steps.insert(
                step.id.clone(),
                TestStep {
                    id: step.id,
                    pickle_step_id,
                    result: None,
                },
            );
        }

        match self.tables.pickles.get_mut(&message.pickle_id) {
            Some(pickle) => pickle.test_case_id = Some(message.id.clone()),
            None => tracing::debug!(
                test_case = %message.id,
                pickle = %message.pickle_id,
                "test case for unknown pickle"
            ),
        }

        self.tables.test_cases.insert(
            message.id.clone(),
            TestCase {
                id: message.id,
                pickle_id: message.pickle_id,
                step_ids,
            },
        );
    }

    fn on_test_step_finished(&mut self, message: TestStepFinished) {
        let Some(step) = self.tables.test_steps.get_mut(&message.test_step_id) else {
            self.diagnostics.orphan_step_results += 1;
            tracing::debug!(step = %message.test_step_id, "dropping result for unknown test step");
            return;
        };

        self.global.steps_number += 1;
        let result = message.test_step_result;
        match StepStatus::from_message(&result.status) {
            Some(status) => self.global.record_step(status),
            None => {
                *self
                    .diagnostics
                    .unrecognized_statuses
                    .entry(result.status.clone())
                    .or_insert(0) += 1;
            }
        }
        step.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ndjson::envelope::RecordDecoder;

    fn correlate(text: &str) -> Correlator {
        let mut correlator = Correlator::default();
        for item in RecordDecoder::new(text) {
            correlator.accept(item);
        }
        correlator
    }

    #[test]
    fn document_registers_scenarios_and_step_definitions() {
        let text = r#"{"gherkinDocument":{"uri":"features/a.feature","feature":{"name":"A","children":[{"background":{"steps":[{"id":"b1","location":{"line":3}}]}},{"scenario":{"id":"sc1","name":"One","steps":[{"id":"st1","location":{"line":6}}]}},{"rule":{"children":[{"scenario":{"id":"sc2","name":"Two","steps":[{"id":"st2","location":{"line":10}}]}}]}}]}}}"#;
        let correlator = correlate(text);
        let tables = &correlator.tables;

        assert_eq!(tables.features.len(), 1);
        assert_eq!(tables.features[0].scenario_ids, vec!["sc1", "sc2"]);
        assert_eq!(tables.scenarios["sc2"].uri, "features/a.feature");
        assert_eq!(
            tables.step_definitions["b1"].location,
            Some(Location { line: 3 })
        );
        assert_eq!(
            tables.step_definitions["st2"].location,
            Some(Location { line: 10 })
        );
    }

    #[test]
    fn document_without_feature_is_ignored() {
        let correlator = correlate(r#"{"gherkinDocument":{"uri":"empty.feature"}}"#);
        assert!(correlator.tables.features.is_empty());
        assert!(correlator.diagnostics.is_clean());
    }

    #[test]
    fn pickle_step_location_defaults_to_line_zero() {
        let text = r#"{"pickle":{"id":"p1","name":"Orphan","astNodeIds":["missing"],"steps":[{"id":"ps1","text":"a step","astNodeIds":["nope"]}]}}"#;
        let correlator = correlate(text);
        let tables = &correlator.tables;

        assert_eq!(tables.pickles["p1"].scenario_id, None);
        assert_eq!(tables.pickle_steps["ps1"].location, Location { line: 0 });
        assert_eq!(tables.pickle_steps["ps1"].pickle_id, "p1");
    }

    #[test]
    fn test_case_counts_even_when_pickle_is_unknown() {
        let text = concat!(
            r#"{"testCase":{"id":"tc1","pickleId":"ghost","testSteps":[{"id":"ts1","pickleStepId":"ghost-step"}]}}"#,
            "\n",
            r#"{"testStepFinished":{"testStepId":"ts1","testStepResult":{"status":"PASSED"}}}"#,
        );
        let correlator = correlate(text);

        assert_eq!(correlator.global.scenario_number, 1);
        assert_eq!(correlator.global.steps_number, 1);
        assert_eq!(correlator.global.succeed_steps_number, 1);
        assert_eq!(correlator.tables.test_steps["ts1"].pickle_step_id, None);
    }

    #[test]
    fn orphan_result_touches_no_counter() {
        let text = r#"{"testStepFinished":{"testStepId":"nobody","testStepResult":{"status":"FAILED"}}}"#;
        let correlator = correlate(text);

        assert_eq!(correlator.global, GlobalInfo::default());
        assert_eq!(correlator.diagnostics.orphan_step_results, 1);
    }

    #[test]
    fn unrecognized_status_counts_step_but_no_bucket() {
        let text = concat!(
            r#"{"testCase":{"id":"tc1","pickleId":"p1","testSteps":[{"id":"ts1"}]}}"#,
            "\n",
            r#"{"testStepFinished":{"testStepId":"ts1","testStepResult":{"status":"AMBIGUOUS"}}}"#,
        );
        let correlator = correlate(text);

        assert_eq!(correlator.global.steps_number, 1);
        assert_eq!(
            correlator.global.failed_steps_number
                + correlator.global.succeed_steps_number
                + correlator.global.skipped_steps_number
                + correlator.global.pending_step_number
                + correlator.global.undefined_steps_number,
            0
        );
        assert_eq!(
            correlator.diagnostics.unrecognized_statuses.get("AMBIGUOUS"),
            Some(&1)
        );
    }

    #[test]
    fn records_missing_ids_are_kept_as_partial_entities() {
        let text = concat!(
            r#"{"gherkinDocument":{"uri":"features/a.feature","feature":{"name":"A","children":["#,
            r#"{"scenario":{"name":"No id","steps":[{"text":"x","location":{"line":3}}]}},"#,
            r#"{"scenario":{"id":"sc2","name":"Second","steps":[]}}]}}}"#,
            "\n",
            r#"{"testCase":{"id":"tc1","testSteps":[{"pickleStepId":"ps1"}]}}"#,
        );
        let correlator = correlate(text);

        assert_eq!(correlator.diagnostics.malformed_lines, 0);
        assert_eq!(correlator.tables.features[0].scenario_ids, vec!["", "sc2"]);
        assert!(correlator.tables.scenarios.contains_key("sc2"));
        assert_eq!(correlator.global.scenario_number, 1);
        assert_eq!(correlator.tables.test_cases["tc1"].pickle_id, "");
    }
}
