//! Drift detection
//!
//! Compares freshly rendered headers with the copies on disk, so a build can
//! fail when someone edited the definitions file but forgot to regenerate.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::emit::ArtifactSet;
use crate::error::Result;

/// State of one header on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftStatus {
    UpToDate,
    Missing,
    /// On-disk copy differs; `diff` holds the changed lines (`-` on disk, `+` expected)
    Stale { diff: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    pub file_name: String,
    #[serde(flatten)]
    pub status: DriftStatus,
}

/// Result of comparing a whole artifact set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.status == DriftStatus::UpToDate)
    }

    pub fn drifted(&self) -> impl Iterator<Item = &DriftEntry> {
        self.entries.iter().filter(|e| e.status != DriftStatus::UpToDate)
    }
}

/// Compare every artifact in `artifacts` with the file of the same name in `dir`
pub fn check_drift(artifacts: &ArtifactSet, dir: &Path) -> Result<DriftReport> {
    let mut report = DriftReport::default();

    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        let status = match fs::read_to_string(&path) {
            Ok(on_disk) if on_disk == artifact.contents => DriftStatus::UpToDate,
            Ok(on_disk) => DriftStatus::Stale {
                diff: changed_lines(&on_disk, &artifact.contents),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => DriftStatus::Missing,
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(file = %artifact.file_name, ?status, "checked artifact");
        report.entries.push(DriftEntry {
            file_name: artifact.file_name.clone(),
            status,
        });
    }

    Ok(report)
}

fn changed_lines(old: &str, new: &str) -> Vec<String> {
    let diff = TextDiff::from_lines(old, new);
    diff.iter_all_changes()
        .filter_map(|change| {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => return None,
            };
            Some(format!("{}{}", sign, change.value().trim_end_matches('\n')))
        })
        .collect()
}
