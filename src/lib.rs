//! ESCDF Specification Generator
//!
//! Reads the attribute definitions document of the ESCDF library and emits
//! the C headers that declare its identifier tables and static specification
//! records.
//!
//! ## Pipeline
//!
//! ```text
//! attributes_def.json
//!   └─ schema      Definitions (typed, defaults applied)
//!      └─ resolve  IdTable ×3, dimension tables, group members, usage tally
//!         └─ emit  six headers, rendered in memory
//!            └─    written to the output directory (or checked for drift)
//! ```
//!
//! ## Outputs
//!
//! ```text
//! escdf_attributes_ID.h     escdf_attributes_specs.h
//! escdf_datasets_ID.h       escdf_datasets_specs.h
//! escdf_groups_ID.h         escdf_groups_specs.h
//! ```

pub mod checksum;
pub mod config;
pub mod diagnostics;
pub mod drift;
pub mod emit;
pub mod error;
pub mod generator;
pub mod ids;
pub mod names;
pub mod order;
pub mod resolve;
pub mod schema;
pub mod usage;

pub use checksum::Checksum;
pub use config::SpecgenConfig;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use drift::{check_drift, DriftReport, DriftStatus};
pub use emit::{Artifact, ArtifactKind, ArtifactSet};
pub use error::{Result, SpecgenError};
pub use generator::{generate, generate_from_path, GenerateOptions, Generation, GenerationStats};
pub use ids::{IdEntry, IdTable};
pub use names::Category;
pub use resolve::{DimensionPolicy, ResolvedAttribute, ResolvedGroup, ResolvedModel};
pub use schema::{AttributeDef, DatasetDef, Definitions, GroupDef};
pub use usage::UsageTally;
