//! Scenario rollup once every step result has been applied.
use super::tables::IdentityTables;
use crate::report::{GlobalInfo, StatusPolicy};
use std::collections::HashSet;

/// Classify declared scenarios and derive the succeeded scenario count.
///
/// Test steps are walked in registration order and each declared scenario is
/// classified once, from the test case of the first pickle reached through
/// one of its steps. Other pickles of the same scenario are not consulted.
pub fn rollup_scenarios(tables: &IdentityTables, global: &mut GlobalInfo, policy: StatusPolicy) {
    let mut seen: HashSet<&str> = HashSet::new();

    for step in tables.test_steps.values() {
        let Some((_, pickle)) = tables.step_owner(step) else {
            continue;
        };
        let Some(scenario) = tables.pickle_scenario(pickle) else {
            continue;
        };
        if !seen.insert(scenario.id.as_str()) {
            continue;
        }
        let Some(test_case) = pickle
            .test_case_id
            .as_deref()
            .and_then(|id| tables.test_cases.get(id))
        else {
            continue;
        };
        global.record_scenario(tables.test_case_status(test_case, policy));
    }

    global.derive_succeeded_scenarios();
}
