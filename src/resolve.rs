//! Reference resolution
//!
//! Turns [`Definitions`] into a [`ResolvedModel`]: identifier tables,
//! attribute records in declaration order with their dimension tables, and
//! groups with their resolvable members. Every problem found along the way is
//! a diagnostic; resolution itself never fails.

use std::collections::{HashMap, HashSet};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::ids::{IdEntry, IdTable};
use crate::names::{is_c_identifier, Category};
use crate::order::declaration_order;
use crate::schema::{AttributeDef, Definitions, GroupDef};
use crate::usage::{report_usage, UsageTally};

/// How `Dims_definitions` entries are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionPolicy {
    /// Check each entry against the attribute set, warn and drop unknown ones
    #[default]
    Validate,
    /// Emit every entry verbatim, even if it names no attribute
    Legacy,
}

/// An attribute ready for emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAttribute {
    pub id: usize,
    pub name: String,
    pub data_type: String,
    pub string_length: u32,
    pub dimensions: u32,
    /// Dimension table entries; `None` emits a `NULL` pointer and no table
    pub dims: Option<Vec<String>>,
}

/// A group with its resolvable members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGroup {
    pub id: usize,
    pub name: String,
    /// Resolved attribute names in the order the group lists them
    pub members: Vec<String>,
}

impl ResolvedGroup {
    pub fn resolved_count(&self) -> usize {
        self.members.len()
    }

    /// Empty groups get no table, no record and no registration
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Everything the emitter needs, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub version: String,
    pub attribute_ids: IdTable,
    pub dataset_ids: IdTable,
    pub group_ids: IdTable,
    /// Attribute records in declaration order
    pub attributes: Vec<ResolvedAttribute>,
    /// All groups in input order, empty ones included
    pub groups: Vec<ResolvedGroup>,
    pub tally: UsageTally,
}

impl ResolvedModel {
    pub fn ids(&self, category: Category) -> &IdTable {
        match category {
            Category::Attributes => &self.attribute_ids,
            Category::Datasets => &self.dataset_ids,
            Category::Groups => &self.group_ids,
        }
    }

    /// Groups that are emitted and registered
    pub fn non_empty_groups(&self) -> impl Iterator<Item = &ResolvedGroup> {
        self.groups.iter().filter(|g| !g.is_empty())
    }
}

/// Resolve all references of a definitions document.
///
/// Diagnostics are appended in pipeline order: naming, dimensions, groups,
/// usage.
pub fn resolve(
    definitions: &Definitions,
    policy: DimensionPolicy,
    diagnostics: &mut Diagnostics,
) -> ResolvedModel {
    let attribute_ids = IdTable::assign(Category::Attributes, definitions.attribute_names());
    let dataset_ids = IdTable::assign(Category::Datasets, definitions.dataset_names());
    let group_ids = IdTable::assign(Category::Groups, definitions.group_names());

    for table in [&attribute_ids, &dataset_ids, &group_ids] {
        lint_names(table, diagnostics);
    }

    let resolver = Resolver::new(definitions);

    let attributes = resolver.resolve_attributes(&attribute_ids, policy, diagnostics);

    let mut tally = UsageTally::new(definitions.attribute_names());
    let groups = definitions
        .groups
        .iter()
        .zip(group_ids.entries())
        .map(|(group, entry)| resolver.resolve_group(group, entry, &mut tally, diagnostics))
        .collect();

    report_usage(&tally, diagnostics);

    tracing::debug!(
        attributes = attribute_ids.len(),
        datasets = dataset_ids.len(),
        groups = group_ids.len(),
        "resolved definitions"
    );

    ResolvedModel {
        version: definitions.version.clone(),
        attribute_ids,
        dataset_ids,
        group_ids,
        attributes,
        groups,
        tally,
    }
}

/// Lookup over the known attribute names
struct Resolver<'a> {
    definitions: &'a Definitions,
    known: HashSet<&'a str>,
    matcher: SkimMatcherV2,
}

impl<'a> Resolver<'a> {
    fn new(definitions: &'a Definitions) -> Self {
        let known = definitions.attribute_names().collect();
        Self {
            definitions,
            known,
            matcher: SkimMatcherV2::default(),
        }
    }

    fn is_known(&self, attribute: &str) -> bool {
        self.known.contains(attribute)
    }

    /// Closest known attribute name, for "did you mean" hints
    fn suggest(&self, missing: &str) -> Option<&'a str> {
        let mut best: Option<(i64, &'a str)> = None;
        for candidate in self.definitions.attribute_names() {
            let score = self
                .matcher
                .fuzzy_match(candidate, missing)
                .or_else(|| self.matcher.fuzzy_match(missing, candidate));
            if let Some(score) = score {
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, candidate));
                }
            }
        }
        best.map(|(_, name)| name)
    }

    fn resolve_attributes(
        &self,
        ids: &IdTable,
        policy: DimensionPolicy,
        diagnostics: &mut Diagnostics,
    ) -> Vec<ResolvedAttribute> {
        let resolved: Vec<ResolvedAttribute> = self
            .definitions
            .attributes
            .iter()
            .zip(ids.entries())
            .map(|(def, entry)| ResolvedAttribute {
                id: entry.id,
                name: def.name.clone(),
                data_type: def.data_type.clone(),
                string_length: def.string_length,
                dimensions: def.dimensions,
                dims: self.resolve_dimensions(def, policy, diagnostics),
            })
            .collect();

        let names: Vec<&str> = resolved.iter().map(|a| a.name.as_str()).collect();
        let refs: Vec<Vec<String>> = resolved
            .iter()
            .map(|a| a.dims.clone().unwrap_or_default())
            .collect();
        let order = declaration_order(&names, &refs, diagnostics);

        let mut slots: Vec<Option<ResolvedAttribute>> = resolved.into_iter().map(Some).collect();
        order.into_iter().filter_map(|idx| slots[idx].take()).collect()
    }

    fn resolve_dimensions(
        &self,
        def: &AttributeDef,
        policy: DimensionPolicy,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<String>> {
        let listed = def.dimension_refs();
        if def.dims_definitions.is_some() && listed.len() != def.dimensions as usize {
            diagnostics.dimension_count_mismatch(&def.name, def.dimensions, listed.len());
        }

        if def.is_scalar() {
            return None;
        }

        match policy {
            DimensionPolicy::Legacy => Some(listed.to_vec()),
            DimensionPolicy::Validate => {
                let mut dims = Vec::with_capacity(listed.len());
                for dim in listed {
                    if self.is_known(dim) {
                        dims.push(dim.clone());
                    } else {
                        diagnostics.unresolved_dimension(
                            &def.name,
                            dim,
                            def.dimensions,
                            self.suggest(dim),
                        );
                    }
                }
                // An empty initializer list is not valid C
                if dims.is_empty() {
                    None
                } else {
                    Some(dims)
                }
            }
        }
    }

    fn resolve_group(
        &self,
        group: &GroupDef,
        entry: &IdEntry,
        tally: &mut UsageTally,
        diagnostics: &mut Diagnostics,
    ) -> ResolvedGroup {
        let mut members = Vec::with_capacity(group.attributes.len());
        for attribute in &group.attributes {
            if self.is_known(attribute) {
                members.push(attribute.clone());
                tally.record(attribute);
            } else {
                diagnostics.unresolved_group_attribute(
                    &group.name,
                    attribute,
                    self.suggest(attribute),
                );
            }
        }

        for (attribute, times) in repeated(&members) {
            diagnostics.duplicate_group_member(&group.name, attribute, times);
        }

        if members.is_empty() {
            diagnostics.empty_group(&group.name);
        }

        ResolvedGroup {
            id: entry.id,
            name: group.name.clone(),
            members,
        }
    }
}

/// Names occurring more than once, in first-seen order, with their count
fn repeated<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<(&'a str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        let count = counts.entry(name.as_str()).or_insert(0);
        if *count == 0 {
            order.push(name.as_str());
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter_map(|name| {
            let times = counts[name];
            (times > 1).then_some((name, times))
        })
        .collect()
}

fn lint_names(table: &IdTable, diagnostics: &mut Diagnostics) {
    let kind = table.category.singular();
    let names: Vec<String> = table.entries().iter().map(|e| e.name.clone()).collect();

    for (name, times) in repeated(&names) {
        diagnostics.duplicate_name(kind, name, times);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for name in &names {
        if seen.insert(name.as_str()) && !is_c_identifier(name) {
            diagnostics.invalid_identifier(kind, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    fn definitions(json: &str) -> Definitions {
        Definitions::from_json_str(json).unwrap()
    }

    const SAMPLE: &str = r#"{
        "Version": "0.1",
        "Attributes": [
            {"Name": "A", "Data_type": "ESCDF_DT_UINT", "Dimensions": 0},
            {"Name": "B", "Data_type": "ESCDF_DT_UINT", "Dimensions": 0},
            {"Name": "grid", "Data_type": "ESCDF_DT_DOUBLE", "Dimensions": 2,
             "Dims_definitions": ["A", "B"]}
        ],
        "Groups": [
            {"Name": "first", "Attributes": ["A", "B", "X"]},
            {"Name": "ghosts", "Attributes": ["Y", "Z"]},
            {"Name": "second", "Attributes": ["A", "grid"]}
        ]
    }"#;

    #[test]
    fn test_group_resolution_filters_unknown() {
        let mut diags = Diagnostics::new();
        let model = resolve(&definitions(SAMPLE), DimensionPolicy::Validate, &mut diags);

        assert_eq!(model.groups[0].members, vec!["A", "B"]);
        assert_eq!(model.groups[0].resolved_count(), 2);

        let unresolved: Vec<_> = diags
            .with_code(DiagnosticCode::UnresolvedGroupAttribute)
            .map(|d| d.message.clone())
            .collect();
        assert_eq!(unresolved[0], "attribute X not found (referenced by group first)");
    }

    #[test]
    fn test_empty_group_still_has_an_id() {
        let mut diags = Diagnostics::new();
        let model = resolve(&definitions(SAMPLE), DimensionPolicy::Validate, &mut diags);

        assert!(model.groups[1].is_empty());
        assert_eq!(model.groups[1].id, 1);
        assert_eq!(model.group_ids.get("ghosts"), Some(1));
        let names: Vec<_> = model.non_empty_groups().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);

        let empty: Vec<_> = diags.with_code(DiagnosticCode::EmptyGroup).collect();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].subject, "ghosts");
    }

    #[test]
    fn test_usage_tally() {
        let mut diags = Diagnostics::new();
        let model = resolve(&definitions(SAMPLE), DimensionPolicy::Validate, &mut diags);

        assert_eq!(model.tally.count("A"), 2);
        assert_eq!(model.tally.count("B"), 1);
        assert_eq!(model.tally.count("grid"), 1);
        assert_eq!(diags.with_code(DiagnosticCode::SharedAttribute).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::UnreferencedAttribute).count(), 0);
    }

    #[test]
    fn test_scalar_and_dimensioned_attributes() {
        let mut diags = Diagnostics::new();
        let model = resolve(&definitions(SAMPLE), DimensionPolicy::Validate, &mut diags);

        assert_eq!(model.attributes[0].dims, None);
        assert_eq!(
            model.attributes[2].dims,
            Some(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_validate_drops_unknown_dimension() {
        let defs = definitions(
            r#"{"Version": "1", "Attributes": [
                {"Name": "n", "Data_type": "ESCDF_DT_UINT", "Dimensions": 0},
                {"Name": "v", "Data_type": "ESCDF_DT_DOUBLE", "Dimensions": 2,
                 "Dims_definitions": ["n", "nn"]}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        let model = resolve(&defs, DimensionPolicy::Validate, &mut diags);

        assert_eq!(model.attributes[1].dims, Some(vec!["n".to_string()]));
        assert_eq!(model.attributes[1].dimensions, 2);
        let unresolved: Vec<_> = diags.with_code(DiagnosticCode::UnresolvedDimension).collect();
        assert_eq!(unresolved.len(), 1);
        assert!(unresolved[0].context[0].contains("still declares 2 dimension(s)"));
        assert_eq!(unresolved[0].context[1], "did you mean n?");
    }

    #[test]
    fn test_legacy_keeps_dangling_dimension() {
        let defs = definitions(
            r#"{"Version": "1", "Attributes": [
                {"Name": "v", "Data_type": "ESCDF_DT_DOUBLE", "Dimensions": 1,
                 "Dims_definitions": ["ghost"]}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        let model = resolve(&defs, DimensionPolicy::Legacy, &mut diags);

        assert_eq!(model.attributes[0].dims, Some(vec!["ghost".to_string()]));
        assert_eq!(diags.with_code(DiagnosticCode::UnresolvedDimension).count(), 0);
    }

    #[test]
    fn test_validate_all_unknown_dimensions_emit_null() {
        let defs = definitions(
            r#"{"Version": "1", "Attributes": [
                {"Name": "v", "Data_type": "ESCDF_DT_DOUBLE", "Dimensions": 1,
                 "Dims_definitions": ["ghost"]}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        let model = resolve(&defs, DimensionPolicy::Validate, &mut diags);
        assert_eq!(model.attributes[0].dims, None);
    }

    #[test]
    fn test_dimension_count_mismatch() {
        let defs = definitions(
            r#"{"Version": "1", "Attributes": [
                {"Name": "n", "Data_type": "ESCDF_DT_UINT", "Dimensions": 0},
                {"Name": "v", "Data_type": "ESCDF_DT_DOUBLE", "Dimensions": 3,
                 "Dims_definitions": ["n"]}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        resolve(&defs, DimensionPolicy::Validate, &mut diags);
        let mismatch: Vec<_> = diags.with_code(DiagnosticCode::DimensionCountMismatch).collect();
        assert_eq!(mismatch.len(), 1);
        assert_eq!(mismatch[0].subject, "v");
    }

    #[test]
    fn test_attributes_reordered_behind_dimensions() {
        let defs = definitions(
            r#"{"Version": "1", "Attributes": [
                {"Name": "grid", "Data_type": "ESCDF_DT_DOUBLE", "Dimensions": 1,
                 "Dims_definitions": ["n"]},
                {"Name": "n", "Data_type": "ESCDF_DT_UINT", "Dimensions": 0}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        let model = resolve(&defs, DimensionPolicy::Validate, &mut diags);

        let order: Vec<_> = model.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(order, vec!["n", "grid"]);
        // IDs keep input order
        assert_eq!(model.attributes[0].id, 1);
        assert_eq!(model.attributes[1].id, 0);
    }

    #[test]
    fn test_duplicate_member_and_name_warnings() {
        let defs = definitions(
            r#"{"Version": "1",
                "Attributes": [
                    {"Name": "a", "Data_type": "T", "Dimensions": 0},
                    {"Name": "a", "Data_type": "T", "Dimensions": 0},
                    {"Name": "bad-name", "Data_type": "T", "Dimensions": 0}
                ],
                "Groups": [{"Name": "g", "Attributes": ["a", "a"]}]
            }"#,
        );
        let mut diags = Diagnostics::new();
        let model = resolve(&defs, DimensionPolicy::Validate, &mut diags);

        assert_eq!(model.groups[0].members, vec!["a", "a"]);
        assert_eq!(model.tally.count("a"), 2);
        assert_eq!(model.attributes.len(), 3);
        assert_eq!(diags.with_code(DiagnosticCode::DuplicateGroupMember).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::DuplicateName).count(), 1);

        let invalid: Vec<_> = diags.with_code(DiagnosticCode::InvalidIdentifier).collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].subject, "bad-name");
    }
}
