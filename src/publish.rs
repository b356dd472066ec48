//! Publish report results to the CI environment.
//!
//! Output variables and the step summary are appended to the files the runner
//! provides. Check-run request bodies are written as JSON under an output
//! directory so a later step (or an API client) can post them.
use crate::annotate::Annotation;
use crate::config::CheckConclusion;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Body of a completed check-run creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRunRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_sha: Option<String>,
    pub status: &'static str,
    pub conclusion: CheckConclusion,
    pub output: CheckRunOutput,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
    pub annotations: Vec<Annotation>,
}

impl CheckRunRequest {
    pub fn completed(
        name: &str,
        head_sha: Option<&str>,
        conclusion: CheckConclusion,
        output: CheckRunOutput,
    ) -> Self {
        CheckRunRequest {
            name: name.to_string(),
            head_sha: head_sha.map(str::to_string),
            status: "completed",
            conclusion,
            output,
        }
    }
}

/// Append `key=value` lines to the output file.
pub fn append_outputs(path: &Path, outputs: &[(String, u64)]) -> Result<()> {
    let mut text = String::new();
    for (key, value) in outputs {
        text.push_str(&format!("{key}={value}\n"));
    }
    append_text(path, &text)
}

/// Append a titled markdown block to the step summary file.
pub fn append_step_summary(path: &Path, title: &str, summary: &str) -> Result<()> {
    append_text(path, &format!("#### {title}\n\n{summary}\n"))
}

pub fn check_run_path(out_dir: &Path, report_name: &str) -> PathBuf {
    out_dir.join(format!("{report_name}.check-run.json"))
}

pub fn summary_annotations_path(out_dir: &Path, report_name: &str) -> PathBuf {
    out_dir.join(format!("{report_name}.summary-annotations.json"))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serialize check-run JSON")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn append_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("append {}", path.display()))?;
    Ok(())
}
