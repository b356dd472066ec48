//! Resolve report uris to paths inside the workspace checkout.
use crate::util::display_path;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CLASSPATH_PREFIX: &str = "classpath:";

/// Memoizing locator for feature files under a workspace root.
///
/// The workspace is scanned once, on the first lookup.
#[derive(Debug)]
pub struct SourceLocator {
    root: PathBuf,
    files: Option<Vec<PathBuf>>,
    cache: HashMap<String, Option<String>>,
}

impl SourceLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceLocator {
            root: root.into(),
            files: None,
            cache: HashMap::new(),
        }
    }

    /// Workspace-relative path of the first file ending with `uri`, if any.
    pub fn find(&mut self, uri: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(uri) {
            return cached.clone();
        }
        let found = self.search(uri);
        match &found {
            Some(path) => tracing::debug!(uri, path = %path, "resolved report path"),
            None => tracing::debug!(uri, "no workspace file for report path"),
        }
        self.cache.insert(uri.to_string(), found.clone());
        found
    }

    /// Like [`Self::find`], falling back to the uri as written.
    pub fn resolve(&mut self, uri: &str) -> String {
        self.find(uri).unwrap_or_else(|| uri.to_string())
    }

    fn search(&mut self, uri: &str) -> Option<String> {
        let wanted = uri.strip_prefix(CLASSPATH_PREFIX).unwrap_or(uri);
        if wanted.is_empty() {
            return None;
        }
        let wanted = Path::new(wanted);
        let root = self.root.clone();
        let files = self.files.get_or_insert_with(|| {
            if !root.exists() {
                return Vec::new();
            }
            collect_files_recursive(&root).unwrap_or_else(|err| {
                tracing::warn!(root = %root.display(), error = %err, "workspace scan failed");
                Vec::new()
            })
        });
        files
            .iter()
            .find(|file| file.strip_prefix(&root).is_ok_and(|rel| rel.ends_with(wanted)))
            .map(|file| display_path(file, Some(&root)))
    }
}

/// Files under `root`, sorted. Hidden and symlinked directories are not
/// entered; unreadable directories are skipped.
fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).with_context(|| format!("read {}", root.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let (entry, file_type) =
            match entry.and_then(|entry| entry.file_type().map(|file_type| (entry, file_type))) {
                Ok(typed) => typed,
                Err(err) => {
                    tracing::debug!(dir = %root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
        let path = entry.path();
        if file_type.is_dir() {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            match collect_files_recursive(&path) {
                Ok(nested) => files.extend(nested),
                Err(err) => {
                    tracing::debug!(dir = %path.display(), error = %err, "skipping unreadable directory");
                }
            }
        } else if path.is_file() {
            // Also admits symlinks to files.
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
