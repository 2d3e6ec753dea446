//! Symbol naming
//!
//! Every generated C symbol is derived from an entity name with a fixed
//! transform:
//!
//! | symbol                  | transform                 |
//! |-------------------------|---------------------------|
//! | identifier `#define`    | `NAME`                    |
//! | specification record    | `name_specs`              |
//! | dimension table         | `name_dims`               |
//! | group attribute table   | `name_attributes`         |
//!
//! Names are not sanitized. [`is_c_identifier`] lets the caller flag names
//! that would not survive the C compiler.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Entity category. Each category has its own identifier namespace and its
/// own pair of output headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Attributes,
    Datasets,
    Groups,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Attributes, Category::Datasets, Category::Groups];

    /// Name as it appears in the definitions document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attributes => "Attributes",
            Self::Datasets => "Datasets",
            Self::Groups => "Groups",
        }
    }

    /// Singular noun used in diagnostics
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Attributes => "attribute",
            Self::Datasets => "dataset",
            Self::Groups => "group",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier constant, e.g. `NUMBER_OF_SPECIES`
pub fn id_symbol(name: &str) -> String {
    name.to_uppercase()
}

/// Specification record, e.g. `number_of_species_specs`
pub fn specs_symbol(name: &str) -> String {
    format!("{}_specs", name.to_lowercase())
}

/// Dimension table of an attribute
pub fn dims_symbol(name: &str) -> String {
    format!("{}_dims", name.to_lowercase())
}

/// Attribute table of a group
pub fn attributes_symbol(name: &str) -> String {
    format!("{}_attributes", name.to_lowercase())
}

/// Name as a C string literal
pub fn quoted(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Identifier-table header, e.g. `escdf_attributes_ID.h`
pub fn id_file_name(prefix: &str, category: Category) -> String {
    format!("{}_{}_ID.h", prefix, category.as_str().to_lowercase())
}

/// Specification header, e.g. `escdf_groups_specs.h`
pub fn specs_file_name(prefix: &str, category: Category) -> String {
    format!("{}_{}_specs.h", prefix, category.as_str().to_lowercase())
}

/// Include guard for the identifier header, e.g. `ESCDF_ATTRIBUTES_ID_H`
pub fn id_guard(prefix: &str, category: Category) -> String {
    format!("{}_{}_ID_H", prefix.to_uppercase(), category.as_str().to_uppercase())
}

/// Include guard for the specification header
pub fn specs_guard(prefix: &str, category: Category) -> String {
    format!("{}_{}_SPECS_H", prefix.to_uppercase(), category.as_str().to_uppercase())
}

fn c_identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("C identifier pattern is valid")
    })
}

/// Whether every symbol derived from `name` is a valid C identifier
pub fn is_c_identifier(name: &str) -> bool {
    c_identifier_pattern().is_match(name)
}
