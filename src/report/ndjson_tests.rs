use super::read;
use crate::report::{GlobalInfo, ReportSnapshot, ReportView, ScenarioStatus, StatusPolicy, StepRecord};
use serde_json::{json, Value};

fn stream(messages: &[Value]) -> String {
    messages
        .iter()
        .map(|message| message.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn login_document() -> Value {
    json!({"gherkinDocument": {
        "uri": "features/login.feature",
        "feature": {
            "name": "Login",
            "location": {"line": 1, "column": 1},
            "children": [{"scenario": {
                "id": "sc-valid",
                "name": "Valid user",
                "location": {"line": 3, "column": 3},
                "steps": [{"id": "st-open", "text": "the login page is open", "location": {"line": 4, "column": 5}}]
            }}]
        }
    }})
}

fn login_pickle() -> Value {
    json!({"pickle": {
        "id": "p-valid",
        "uri": "features/login.feature",
        "name": "Valid user",
        "astNodeIds": ["sc-valid"],
        "steps": [{"id": "ps-open", "text": "the login page is open", "astNodeIds": ["st-open"]}]
    }})
}

fn login_test_case() -> Value {
    json!({"testCase": {
        "id": "tc-valid",
        "pickleId": "p-valid",
        "testSteps": [{"id": "ts-open", "pickleStepId": "ps-open"}]
    }})
}

fn finished(step: &str, status: &str, message: Option<&str>) -> Value {
    let mut result = json!({"status": status, "duration": {"seconds": 0, "nanos": 1000}});
    if let Some(message) = message {
        result["message"] = json!(message);
    }
    json!({"testStepFinished": {"testStepId": step, "testCaseStartedId": "tcs", "testStepResult": result}})
}

/// One scenario outline expanded into two pickles, each with a hook and two steps.
fn outline_stream(first_row: [&str; 3], second_row: [&str; 3]) -> String {
    let document = json!({"gherkinDocument": {
        "uri": "features/cart.feature",
        "feature": {
            "name": "Cart",
            "children": [
                {"background": {"steps": [{"id": "bg-1", "location": {"line": 4}}]}},
                {"scenario": {
                    "id": "sc-add",
                    "name": "Add <item>",
                    "steps": [{"id": "st-add", "location": {"line": 7}}]
                }}
            ]
        }
    }});
    let mut messages = vec![document];
    for row in ["1", "2"] {
        messages.push(json!({"pickle": {
            "id": format!("p{row}"),
            "uri": "features/cart.feature",
            "name": format!("Add item {row}"),
            "astNodeIds": ["sc-add", format!("ex-{row}")],
            "steps": [
                {"id": format!("p{row}-bg"), "text": "an empty cart", "astNodeIds": ["bg-1"]},
                {"id": format!("p{row}-add"), "text": "I add an item", "astNodeIds": ["st-add", format!("ex-{row}")]}
            ]
        }}));
        messages.push(json!({"testCase": {
            "id": format!("tc{row}"),
            "pickleId": format!("p{row}"),
            "testSteps": [
                {"id": format!("t{row}-hook"), "hookId": "before-hook"},
                {"id": format!("t{row}-bg"), "pickleStepId": format!("p{row}-bg")},
                {"id": format!("t{row}-add"), "pickleStepId": format!("p{row}-add")}
            ]
        }}));
    }
    for (row, statuses) in [("1", first_row), ("2", second_row)] {
        for (slot, status) in ["hook", "bg", "add"].iter().zip(statuses) {
            messages.push(finished(&format!("t{row}-{slot}"), status, None));
        }
    }
    stream(&messages)
}

fn bucket_sum(info: &GlobalInfo) -> u64 {
    info.failed_steps_number
        + info.skipped_steps_number
        + info.undefined_steps_number
        + info.pending_step_number
        + info.succeed_steps_number
}

#[test]
fn failed_login_end_to_end() {
    let text = stream(&[
        json!({"meta": {"protocolVersion": "24.0.0"}}),
        login_document(),
        login_pickle(),
        login_test_case(),
        finished("ts-open", "FAILED", Some("boom")),
    ]);
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.scenario_number, 1);
    assert_eq!(info.failed_scenario_number, 1);
    assert_eq!(info.succeed_scenario_number, 0);
    assert_eq!(info.steps_number, 1);
    assert_eq!(info.failed_steps_number, 1);
    assert_eq!(
        report.failed_steps(),
        vec![StepRecord {
            file: "features/login.feature".to_string(),
            line: 4,
            title: "Valid user".to_string(),
            step: "the login page is open".to_string(),
            error: "boom".to_string(),
        }]
    );
    assert!(report.undefined_steps().is_empty());
    assert!(report.pending_steps().is_empty());

    let files = report.scenarios_by_file();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file, "features/login.feature");
    assert_eq!(files[0].name, "Login");
    assert_eq!(files[0].scenarios.len(), 1);
    assert_eq!(files[0].scenarios[0].name, "Valid user");
    assert_eq!(files[0].scenarios[0].status, ScenarioStatus::Failed);
}

#[test]
fn passing_stream_counts_successes() {
    let text = outline_stream(["PASSED"; 3], ["PASSED"; 3]);
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.scenario_number, 2);
    assert_eq!(info.succeed_scenario_number, 2);
    assert_eq!(info.steps_number, 6);
    assert_eq!(info.succeed_steps_number, 6);
    assert_eq!(bucket_sum(&info), info.steps_number);

    let files = report.scenarios_by_file();
    let statuses: Vec<_> = files[0].scenarios.iter().map(|entry| entry.status).collect();
    assert_eq!(statuses, vec![ScenarioStatus::Success, ScenarioStatus::Success]);
    assert!(files[0].scenarios.iter().all(|entry| entry.name == "Add <item>"));
}

#[test]
fn step_buckets_partition_counted_steps() {
    let text = outline_stream(
        ["PASSED", "UNDEFINED", "SKIPPED"],
        ["PASSED", "PENDING", "FAILED"],
    );
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.steps_number, 6);
    assert_eq!(bucket_sum(&info), info.steps_number);
    assert_eq!(info.undefined_steps_number, 1);
    assert_eq!(info.pending_step_number, 1);
    assert_eq!(info.failed_steps_number, 1);
    assert_eq!(info.skipped_steps_number, 1);
    assert_eq!(info.succeed_steps_number, 2);
}

#[test]
fn declared_scenario_is_classified_once() {
    // Both pickles fail, but the outline contributes a single scenario
    // classification from the first pickle reached.
    let text = outline_stream(["PASSED", "FAILED", "SKIPPED"], ["PASSED", "FAILED", "SKIPPED"]);
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.scenario_number, 2);
    assert_eq!(info.failed_scenario_number, 1);
    assert_eq!(
        info.succeed_scenario_number,
        info.scenario_number
            - info.failed_scenario_number
            - info.pending_scenario_number
            - info.undefined_scenario_number
    );

    let listed: Vec<_> = report.scenarios_by_file()[0]
        .scenarios
        .iter()
        .map(|entry| entry.status)
        .collect();
    assert_eq!(listed, vec![ScenarioStatus::Failed, ScenarioStatus::Failed]);
    assert_eq!(report.failed_steps().len(), 2);
}

#[test]
fn first_match_and_worst_policies_diverge() {
    let text = outline_stream(["PASSED", "SKIPPED", "FAILED"], ["PASSED"; 3]);

    let first_match = read(&text, StatusPolicy::FirstMatch);
    assert_eq!(
        first_match.scenarios_by_file()[0].scenarios[0].status,
        ScenarioStatus::Skipped
    );
    assert_eq!(first_match.global_info().failed_scenario_number, 0);
    assert_eq!(first_match.global_info().succeed_scenario_number, 2);

    let worst = read(&text, StatusPolicy::Worst);
    assert_eq!(
        worst.scenarios_by_file()[0].scenarios[0].status,
        ScenarioStatus::Failed
    );
    assert_eq!(worst.global_info().failed_scenario_number, 1);
    assert_eq!(worst.global_info().succeed_scenario_number, 1);
}

#[test]
fn hook_steps_count_but_never_annotate() {
    let text = outline_stream(["FAILED", "SKIPPED", "SKIPPED"], ["PASSED"; 3]);
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.failed_steps_number, 1);
    assert_eq!(info.failed_scenario_number, 1);
    assert!(report.failed_steps().is_empty());
}

#[test]
fn step_records_use_declared_lines_and_messages() {
    let text = outline_stream(["PASSED", "PASSED", "PENDING"], ["PASSED", "UNDEFINED", "SKIPPED"]);
    let report = read(&text, StatusPolicy::FirstMatch);

    let pending = report.pending_steps();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].file, "features/cart.feature");
    assert_eq!(pending[0].line, 7);
    assert_eq!(pending[0].title, "Add item 1");
    assert_eq!(pending[0].step, "I add an item");
    assert_eq!(pending[0].error, "");

    let undefined = report.undefined_steps();
    assert_eq!(undefined.len(), 1);
    assert_eq!(undefined[0].line, 4);
    assert_eq!(undefined[0].title, "Add item 2");
    assert_eq!(undefined[0].step, "an empty cart");
}

#[test]
fn orphan_result_changes_nothing() {
    let base = vec![
        login_document(),
        login_pickle(),
        login_test_case(),
        finished("ts-open", "PASSED", None),
    ];
    let mut with_orphan = base.clone();
    with_orphan.push(finished("ts-unknown", "FAILED", Some("lost")));

    let clean = read(&stream(&base), StatusPolicy::FirstMatch);
    let noisy = read(&stream(&with_orphan), StatusPolicy::FirstMatch);

    assert_eq!(clean.global_info(), noisy.global_info());
    assert!(noisy.failed_steps().is_empty());
    assert_eq!(noisy.diagnostics().orphan_step_results, 1);
}

#[test]
fn malformed_line_leaves_counters_unchanged() {
    let messages = [
        login_document(),
        login_pickle(),
        login_test_case(),
        finished("ts-open", "FAILED", Some("boom")),
    ];
    let clean = stream(&messages);
    let lines: Vec<String> = messages.iter().map(|message| message.to_string()).collect();
    let noisy = format!(
        "{}\n{}\n{{\"pickle\": oops\n{}\n\n{}\n",
        lines[0], lines[1], lines[2], lines[3]
    );

    let clean_report = read(&clean, StatusPolicy::FirstMatch);
    let noisy_report = read(&noisy, StatusPolicy::FirstMatch);

    assert_eq!(clean_report.global_info(), noisy_report.global_info());
    assert_eq!(clean_report.failed_steps(), noisy_report.failed_steps());
    assert_eq!(noisy_report.diagnostics().malformed_lines, 1);
}

#[test]
fn reading_twice_is_idempotent() {
    let text = outline_stream(["PASSED", "FAILED", "SKIPPED"], ["PASSED", "PENDING", "SKIPPED"]);
    let first = read(&text, StatusPolicy::FirstMatch);
    let second = read(&text, StatusPolicy::FirstMatch);

    assert_eq!(ReportSnapshot::capture(&first), ReportSnapshot::capture(&second));
}

#[test]
fn empty_or_garbage_input_yields_empty_report() {
    for text in ["", "\n\n  \n", "not json at all\n[1,2"] {
        let report = read(text, StatusPolicy::FirstMatch);
        assert_eq!(report.global_info(), GlobalInfo::default());
        assert!(report.scenarios_by_file().is_empty());
        assert!(report.failed_steps().is_empty());
    }
}

#[test]
fn test_case_before_pickle_leaves_steps_unattributed() {
    let text = stream(&[
        login_document(),
        login_test_case(),
        login_pickle(),
        finished("ts-open", "FAILED", Some("boom")),
    ]);
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.scenario_number, 1);
    assert_eq!(info.failed_steps_number, 1);
    // Without a resolvable pickle step the scenario cannot be classified.
    assert_eq!(info.failed_scenario_number, 0);
    assert_eq!(info.succeed_scenario_number, 1);
    assert!(report.failed_steps().is_empty());
    assert_eq!(
        report.scenarios_by_file()[0].scenarios[0].status,
        ScenarioStatus::Success
    );
    assert!(report.tables().pickles["p-valid"].test_case_id.is_none());
}

#[test]
fn unrecognized_status_is_reported_in_diagnostics() {
    let text = stream(&[
        login_document(),
        login_pickle(),
        login_test_case(),
        finished("ts-open", "AMBIGUOUS", Some("two definitions")),
    ]);
    let report = read(&text, StatusPolicy::FirstMatch);
    let info = report.global_info();

    assert_eq!(info.steps_number, 1);
    assert_eq!(bucket_sum(&info), 0);
    assert_eq!(info.succeed_scenario_number, 1);
    assert_eq!(
        report.diagnostics().unrecognized_statuses.get("AMBIGUOUS"),
        Some(&1)
    );
}
