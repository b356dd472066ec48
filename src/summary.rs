//! Summary text, output variables and check conclusion for one report.
use crate::config::{CheckConclusion, CheckPolicy};
use crate::report::GlobalInfo;

/// Scenario buckets in summary order.
pub fn scenario_buckets(info: &GlobalInfo) -> [(&'static str, u64); 4] {
    [
        ("failed", info.failed_scenario_number),
        ("undefined", info.undefined_scenario_number),
        ("pending", info.pending_scenario_number),
        ("passed", info.succeed_scenario_number),
    ]
}

/// Step buckets in summary order.
pub fn step_buckets(info: &GlobalInfo) -> [(&'static str, u64); 5] {
    [
        ("failed", info.failed_steps_number),
        ("undefined", info.undefined_steps_number),
        ("skipped", info.skipped_steps_number),
        ("pending", info.pending_step_number),
        ("passed", info.succeed_steps_number),
    ]
}

/// One indented summary line listing the non-empty buckets.
pub fn summary_line(total: u64, item_type: &str, buckets: &[(&str, u64)]) -> String {
    let counts = buckets
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| format!("{count} {label}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("    {total} {item_type} ({counts})")
}

pub fn summary_text(info: &GlobalInfo) -> String {
    format!(
        "{}\n{}",
        summary_line(info.scenario_number, "Scenarios", &scenario_buckets(info)),
        summary_line(info.steps_number, "Steps", &step_buckets(info))
    )
}

/// Output variables published for a report, `<report>_<bucket>_scenarios`
/// and `<report>_<bucket>_steps`.
pub fn output_variables(report_name: &str, info: &GlobalInfo) -> Vec<(String, u64)> {
    let scenarios = scenario_buckets(info)
        .into_iter()
        .map(|(bucket, count)| (format!("{report_name}_{bucket}_scenarios"), count));
    let steps = step_buckets(info)
        .into_iter()
        .map(|(bucket, count)| (format!("{report_name}_{bucket}_steps"), count));
    scenarios.chain(steps).collect()
}

/// Failed scenarios take precedence over undefined steps, which take
/// precedence over pending steps. A condition configured as `success` never
/// decides the conclusion.
pub fn check_conclusion(info: &GlobalInfo, policy: &CheckPolicy) -> CheckConclusion {
    let candidates = [
        (info.failed_scenario_number, policy.on_error),
        (info.undefined_steps_number, policy.on_undefined),
        (info.pending_step_number, policy.on_pending),
    ];
    candidates
        .into_iter()
        .find(|(count, conclusion)| *count > 0 && *conclusion != CheckConclusion::Success)
        .map_or(CheckConclusion::Success, |(_, conclusion)| conclusion)
}

pub fn check_title(check_name: &str, info: &GlobalInfo, show_error_count: bool) -> String {
    let errors = info.failed_scenario_number;
    if !show_error_count || errors == 0 {
        return check_name.to_string();
    }
    let plural = if errors > 1 { "s" } else { "" };
    format!("{check_name} ({errors} error{plural})")
}
