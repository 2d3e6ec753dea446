//! Definitions document model
//!
//! Parses `attributes_def.json` into explicit entity structures. Optional
//! fields get their defaults here, so later passes never probe for keys.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecgenError};

/// The full definitions document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
    /// Version banner of the definitions file
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<AttributeDef>,

    #[serde(rename = "Datasets", default)]
    pub datasets: Vec<DatasetDef>,

    #[serde(rename = "Groups", default)]
    pub groups: Vec<GroupDef>,
}

/// A single typed attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "Name")]
    pub name: String,

    /// Type tag of the storage library (e.g. `ESCDF_DT_UINT`), emitted verbatim
    #[serde(rename = "Data_type")]
    pub data_type: String,

    /// Number of dimensions, 0 for scalars
    #[serde(rename = "Dimensions")]
    pub dimensions: u32,

    /// Attributes supplying the size of each dimension
    #[serde(rename = "Dims_definitions", default, skip_serializing_if = "Option::is_none")]
    pub dims_definitions: Option<Vec<String>>,

    #[serde(rename = "Stringlength", default)]
    pub string_length: u32,
}

impl AttributeDef {
    pub fn is_scalar(&self) -> bool {
        self.dimensions == 0
    }

    /// Dimension references, empty for scalars
    pub fn dimension_refs(&self) -> &[String] {
        self.dims_definitions.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDef {
    #[serde(rename = "Name")]
    pub name: String,
}

/// A named collection of attribute references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Attributes")]
    pub attributes: Vec<String>,
}

impl Definitions {
    /// Parse a definitions document from a JSON string.
    ///
    /// Fails on malformed JSON, missing required fields, and attributes that
    /// declare dimensions without saying where their sizes come from.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let definitions: Definitions = serde_json::from_str(content)?;
        definitions.check_structure()?;
        Ok(definitions)
    }

    /// Load and parse a definitions file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SpecgenError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "loaded definitions");
        Self::from_json_str(&content)
    }

    fn check_structure(&self) -> Result<()> {
        for attribute in &self.attributes {
            if attribute.dimensions > 0 && attribute.dims_definitions.is_none() {
                return Err(SpecgenError::MissingDimensionDefinitions {
                    attribute: attribute.name.clone(),
                    dimensions: attribute.dimensions,
                });
            }
        }
        Ok(())
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.name.as_str())
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }
}
