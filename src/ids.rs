//! Identifier assignment
//!
//! IDs are the 0-based input position of an entity within its category.
//! Categories never share a table, so an attribute and a group may both be 0.

use serde::Serialize;

use crate::names::{id_symbol, Category};

/// One entry of an identifier table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdEntry {
    pub name: String,
    pub id: usize,
}

impl IdEntry {
    /// The `#define` symbol for this entry
    pub fn symbol(&self) -> String {
        id_symbol(&self.name)
    }
}

/// Dense identifier table for one category, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdTable {
    pub category: Category,
    entries: Vec<IdEntry>,
}

impl IdTable {
    /// Assign IDs `0..n` to `names` in the order given.
    ///
    /// Duplicated names each get their own slot.
    pub fn assign<'a>(category: Category, names: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(id, name)| IdEntry { name: name.to_string(), id })
            .collect();
        Self { category, entries }
    }

    /// ID of the first entry called `name`
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.id)
    }

    pub fn entries(&self) -> &[IdEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
