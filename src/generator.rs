//! Generation pipeline
//!
//! load → assign IDs → resolve dimensions → resolve groups → report usage →
//! render headers. Only loading can fail; everything after it records
//! diagnostics and carries on.

use std::path::Path;

use serde::Serialize;

use crate::config::SpecgenConfig;
use crate::diagnostics::Diagnostics;
use crate::emit::{self, ArtifactSet};
use crate::error::{Result, SpecgenError};
use crate::resolve::{resolve, DimensionPolicy, ResolvedModel};
use crate::schema::Definitions;

/// Knobs of a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub prefix: String,
    pub dimension_refs: DimensionPolicy,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            prefix: "escdf".to_string(),
            dimension_refs: DimensionPolicy::Validate,
        }
    }
}

impl From<&SpecgenConfig> for GenerateOptions {
    fn from(config: &SpecgenConfig) -> Self {
        Self {
            prefix: config.output.prefix.clone(),
            dimension_refs: config.generation.dimension_refs,
        }
    }
}

/// Output of a run, nothing written yet
#[derive(Debug, Clone)]
pub struct Generation {
    pub model: ResolvedModel,
    pub artifacts: ArtifactSet,
    pub diagnostics: Diagnostics,
}

impl Generation {
    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            attributes: self.model.attribute_ids.len(),
            datasets: self.model.dataset_ids.len(),
            groups: self.model.group_ids.len(),
            emitted_groups: self.model.non_empty_groups().count(),
            warnings: self.diagnostics.warning_count(),
            notes: self.diagnostics.info_count(),
        }
    }

    /// Fail a strict run that reported warnings. Notes never fail it.
    pub fn check_strict(&self, strict: bool) -> Result<()> {
        let warnings = self.diagnostics.warning_count();
        if strict && warnings > 0 {
            return Err(SpecgenError::StrictWarnings { warnings });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub attributes: usize,
    pub datasets: usize,
    pub groups: usize,
    /// Groups with at least one resolved attribute
    pub emitted_groups: usize,
    pub warnings: usize,
    pub notes: usize,
}

/// Resolve `definitions` and render every header
pub fn generate(definitions: &Definitions, options: &GenerateOptions) -> Generation {
    let mut diagnostics = Diagnostics::new();
    let model = resolve(definitions, options.dimension_refs, &mut diagnostics);
    let artifacts = emit::render(&model, &options.prefix);

    tracing::debug!(
        artifacts = artifacts.len(),
        warnings = diagnostics.warning_count(),
        "generation finished"
    );

    Generation {
        model,
        artifacts,
        diagnostics,
    }
}

/// Load the definitions file at `path` and run [`generate`] on it
pub fn generate_from_path(path: &Path, options: &GenerateOptions) -> Result<Generation> {
    let definitions = Definitions::from_path(path)?;
    Ok(generate(&definitions, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = SpecgenConfig::default();
        config.output.prefix = "mylib".to_string();
        config.generation.dimension_refs = DimensionPolicy::Legacy;

        let options = GenerateOptions::from(&config);
        assert_eq!(options.prefix, "mylib");
        assert_eq!(options.dimension_refs, DimensionPolicy::Legacy);
    }

    #[test]
    fn test_strict_fails_only_on_warnings() {
        let shared = Definitions::from_json_str(
            r#"{"Version": "1",
                "Attributes": [{"Name": "a", "Data_type": "T", "Dimensions": 0}],
                "Groups": [
                    {"Name": "g", "Attributes": ["a"]},
                    {"Name": "h", "Attributes": ["a"]}
                ]}"#,
        )
        .unwrap();
        let generation = generate(&shared, &GenerateOptions::default());
        assert_eq!(generation.diagnostics.info_count(), 1);
        assert!(generation.check_strict(true).is_ok());

        let dangling = Definitions::from_json_str(
            r#"{"Version": "1",
                "Attributes": [{"Name": "a", "Data_type": "T", "Dimensions": 0}],
                "Groups": [{"Name": "g", "Attributes": ["a", "b"]}]}"#,
        )
        .unwrap();
        let generation = generate(&dangling, &GenerateOptions::default());
        assert!(generation.check_strict(false).is_ok());
        match generation.check_strict(true) {
            Err(SpecgenError::StrictWarnings { warnings }) => assert_eq!(warnings, 1),
            other => panic!("expected strict failure, got {:?}", other),
        }
    }

    #[test]
    fn test_stats() {
        let defs = Definitions::from_json_str(
            r#"{"Version": "1",
                "Attributes": [{"Name": "a", "Data_type": "T", "Dimensions": 0}],
                "Datasets": [{"Name": "d"}],
                "Groups": [
                    {"Name": "g", "Attributes": ["a"]},
                    {"Name": "h", "Attributes": []}
                ]}"#,
        )
        .unwrap();

        let stats = generate(&defs, &GenerateOptions::default()).stats();
        assert_eq!(stats.attributes, 1);
        assert_eq!(stats.datasets, 1);
        assert_eq!(stats.groups, 2);
        assert_eq!(stats.emitted_groups, 1);
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.notes, 0);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = generate_from_path(Path::new("does/not/exist.json"), &GenerateOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
