//! Correlate cucumber reports into per-scenario results, summaries and
//! check-run annotations.
pub mod annotate;
pub mod cli;
pub mod config;
pub mod locate;
pub mod publish;
pub mod report;
pub mod summary;
pub mod util;
pub mod workflow;
