//! Header Emission
//!
//! Architecture:
//! - ResolvedModel: everything is resolved before emission starts
//! - HeaderText: guard/include boilerplate shared by every header
//! - escdf: the ESCDF declaration grammar, one render function per header
//! - ArtifactSet: the rendered headers, written to disk in one pass
//!
//! Emitters never see the raw definitions document, only the resolved model.

pub mod escdf;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checksum::Checksum;
use crate::error::{Result, SpecgenError};
use crate::names::Category;
use crate::resolve::ResolvedModel;

// =============================================================================
// Artifacts
// =============================================================================

/// Which of the two headers of a category an artifact is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactKind {
    /// `#define` identifier table
    Ids,
    /// Specification records
    Specs,
}

/// One rendered header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub category: Category,
    pub kind: ArtifactKind,
    pub contents: String,
}

impl Artifact {
    pub fn checksum(&self) -> Checksum {
        Checksum::from_str(&self.contents)
    }
}

/// All headers of one generation run, in write order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn find(&self, category: Category, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.category == category && a.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Write every artifact into `dir`, creating it if needed.
    ///
    /// Stops at the first failure; files written before it are left in place.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| SpecgenError::WriteArtifact {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = dir.join(&artifact.file_name);
            fs::write(&path, &artifact.contents).map_err(|source| SpecgenError::WriteArtifact {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

// =============================================================================
// Header Text
// =============================================================================

/// Accumulates one header between its include guard lines
pub struct HeaderText {
    out: String,
}

impl HeaderText {
    pub fn open(guard: &str) -> Self {
        Self {
            out: format!("#ifndef {guard}\n#define {guard}\n\n"),
        }
    }

    pub fn include(&mut self, file_name: &str) {
        self.out.push_str(&format!("#include \"{}\" \n", file_name));
    }

    pub fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Close with `#endif` (identifier tables)
    pub fn close(mut self) -> String {
        self.out.push_str("\n#endif\n");
        self.out
    }

    /// Close with `#endif ` (specification headers)
    pub fn close_specs(mut self) -> String {
        self.out.push_str("\n#endif \n");
        self.out
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Render all six headers for `model`.
///
/// Order: the three identifier tables, then attribute, dataset and group
/// specifications. Group specs include the attribute specs, so every record
/// a group table points at is declared before it.
pub fn render(model: &ResolvedModel, prefix: &str) -> ArtifactSet {
    let mut artifacts = Vec::with_capacity(6);

    for category in Category::ALL {
        artifacts.push(Artifact {
            file_name: crate::names::id_file_name(prefix, category),
            category,
            kind: ArtifactKind::Ids,
            contents: escdf::render_ids(model.ids(category), prefix),
        });
    }

    let specs = [
        (Category::Attributes, escdf::render_attribute_specs(model, prefix)),
        (Category::Datasets, escdf::render_dataset_specs(prefix)),
        (Category::Groups, escdf::render_group_specs(model, prefix)),
    ];
    for (category, contents) in specs {
        artifacts.push(Artifact {
            file_name: crate::names::specs_file_name(prefix, category),
            category,
            kind: ArtifactKind::Specs,
            contents,
        });
    }

    ArtifactSet { artifacts }
}
