//! Attribute usage tally and report

use std::collections::HashMap;

use serde::Serialize;

use crate::diagnostics::Diagnostics;

/// How many group references each attribute received.
///
/// Every known attribute starts at 0. The tally is created by the group
/// resolution pass and handed back to its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTally {
    /// Unique attribute names in first-seen order
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

/// One row of the tally, for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageRow<'a> {
    pub attribute: &'a str,
    pub count: usize,
}

impl UsageTally {
    pub fn new<'a>(attributes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = Self::default();
        for name in attributes {
            if !tally.counts.contains_key(name) {
                tally.order.push(name.to_string());
                tally.counts.insert(name.to_string(), 0);
            }
        }
        tally
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.counts.contains_key(attribute)
    }

    /// Count one reference. Unknown names are ignored.
    pub fn record(&mut self, attribute: &str) {
        if let Some(count) = self.counts.get_mut(attribute) {
            *count += 1;
        }
    }

    pub fn count(&self, attribute: &str) -> usize {
        self.counts.get(attribute).copied().unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = UsageRow<'_>> {
        self.order.iter().map(|name| UsageRow {
            attribute: name,
            count: self.count(name),
        })
    }

    pub fn unreferenced(&self) -> impl Iterator<Item = &str> {
        self.rows().filter(|r| r.count == 0).map(|r| r.attribute)
    }

    /// Attributes referenced at least twice, with their count
    pub fn shared(&self) -> impl Iterator<Item = (&str, usize)> {
        self.rows().filter(|r| r.count > 1).map(|r| (r.attribute, r.count))
    }
}

/// Report unreferenced attributes (warning) and shared ones (info).
///
/// Attributes used exactly once are not mentioned.
pub fn report_usage(tally: &UsageTally, diagnostics: &mut Diagnostics) {
    for attribute in tally.unreferenced() {
        diagnostics.unreferenced_attribute(attribute);
    }
    for (attribute, count) in tally.shared() {
        diagnostics.shared_attribute(attribute, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    #[test]
    fn test_tally_counts_and_report() {
        let mut tally = UsageTally::new(["P", "Q", "R"]);
        tally.record("P");
        tally.record("Q");
        tally.record("P");
        tally.record("unknown");

        assert_eq!(tally.count("P"), 2);
        assert_eq!(tally.count("Q"), 1);
        assert_eq!(tally.count("R"), 0);
        assert!(!tally.contains("unknown"));

        let mut diags = Diagnostics::new();
        report_usage(&tally, &mut diags);

        let unreferenced: Vec<_> = diags
            .with_code(DiagnosticCode::UnreferencedAttribute)
            .map(|d| d.subject.as_str())
            .collect();
        assert_eq!(unreferenced, vec!["R"]);

        let shared: Vec<_> = diags.with_code(DiagnosticCode::SharedAttribute).collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].subject, "P");
        assert_eq!(shared[0].message, "P used 2 times.");
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_duplicate_names_share_a_row() {
        let tally = UsageTally::new(["a", "b", "a"]);
        let names: Vec<_> = tally.rows().map(|r| r.attribute).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
