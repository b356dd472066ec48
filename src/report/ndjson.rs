//! Correlator for cucumber message streams (NDJSON).
//!
//! Messages arrive as flat records that reference each other by id. The
//! correlator rebuilds the feature → scenario → pickle → test step graph in
//! [`tables::IdentityTables`], counts step results as they stream in, and rolls
//! scenario counters up once the stream is exhausted.
pub mod envelope;
pub mod finalize;
pub mod handlers;
pub mod tables;
pub mod view;

pub use view::MessageReport;

use crate::report::StatusPolicy;
use envelope::RecordDecoder;
use handlers::Correlator;

/// Read a complete message stream.
///
/// Never fails: malformed lines and dangling references are tolerated and
/// reported through [`crate::report::ReportView::diagnostics`].
pub fn read(text: &str, policy: StatusPolicy) -> MessageReport {
    let mut correlator = Correlator::default();
    for item in RecordDecoder::new(text) {
        correlator.accept(item);
    }

    let Correlator {
        tables,
        mut global,
        diagnostics,
    } = correlator;
    finalize::rollup_scenarios(&tables, &mut global, policy);

    tracing::debug!(
        features = tables.features.len(),
        pickles = tables.pickles.len(),
        test_steps = tables.test_steps.len(),
        "message stream correlated"
    );
    if !diagnostics.is_clean() {
        tracing::warn!(
            malformed_lines = diagnostics.malformed_lines,
            orphan_step_results = diagnostics.orphan_step_results,
            unrecognized_statuses = ?diagnostics.unrecognized_statuses,
            "report read with tolerated input problems"
        );
    }

    MessageReport {
        tables,
        global,
        diagnostics,
        policy,
    }
}

#[cfg(test)]
#[path = "ndjson_tests.rs"]
mod tests;
