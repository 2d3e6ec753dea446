//! Diagnostics
//!
//! Collects the non-fatal findings of a generation run. Nothing recorded here
//! changes the generated output; fatal problems are [`crate::SpecgenError`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Group resolution ===
    /// Group lists an attribute that is not defined
    UnresolvedGroupAttribute,
    /// Group has no resolvable attributes and is left out
    EmptyGroup,
    /// Group lists the same attribute more than once
    DuplicateGroupMember,

    // === Dimensions ===
    /// Dims_definitions entry names an undefined attribute
    UnresolvedDimension,
    /// Dimensions count differs from the number of Dims_definitions
    DimensionCountMismatch,
    /// Attributes use each other as dimensions
    DimensionCycle,

    // === Usage ===
    /// Attribute is not referenced by any group
    UnreferencedAttribute,
    /// Attribute is referenced by more than one group
    SharedAttribute,

    // === Naming ===
    /// Two entities of one category share a name
    DuplicateName,
    /// Name is not a valid C identifier
    InvalidIdentifier,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedGroupAttribute => "W001",
            Self::EmptyGroup => "W002",
            Self::UnreferencedAttribute => "W003",
            Self::UnresolvedDimension => "W004",
            Self::DimensionCountMismatch => "W005",
            Self::DimensionCycle => "W006",
            Self::DuplicateName => "W007",
            Self::DuplicateGroupMember => "W008",
            Self::InvalidIdentifier => "W009",
            Self::SharedAttribute => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::SharedAttribute => Severity::Info,

            Self::UnresolvedGroupAttribute
            | Self::EmptyGroup
            | Self::DuplicateGroupMember
            | Self::UnresolvedDimension
            | Self::DimensionCountMismatch
            | Self::DimensionCycle
            | Self::UnreferencedAttribute
            | Self::DuplicateName
            | Self::InvalidIdentifier => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Entity the finding is about (attribute or group name)
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (suggestions, cycle members)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity(), self.code, self.message)?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Ordered collection of findings from one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn unresolved_group_attribute(
        &mut self,
        group: &str,
        attribute: &str,
        suggestion: Option<&str>,
    ) {
        let mut item = DiagnosticItem::new(
            group,
            DiagnosticCode::UnresolvedGroupAttribute,
            format!("attribute {} not found (referenced by group {})", attribute, group),
        );
        if let Some(candidate) = suggestion {
            item = item.with_context(format!("did you mean {}?", candidate));
        }
        self.push(item);
    }

    pub fn empty_group(&mut self, group: &str) {
        self.push(DiagnosticItem::new(
            group,
            DiagnosticCode::EmptyGroup,
            format!("Group {} has no attributes!", group),
        ));
    }

    pub fn duplicate_group_member(&mut self, group: &str, attribute: &str, times: usize) {
        self.push(DiagnosticItem::new(
            group,
            DiagnosticCode::DuplicateGroupMember,
            format!("group {} lists attribute {} {} times", group, attribute, times),
        ));
    }

    /// An unknown `Dims_definitions` entry that was left out of the dimension
    /// table. The record keeps its `declared` count, so the table is shorter
    /// than the count consumers will read.
    pub fn unresolved_dimension(
        &mut self,
        attribute: &str,
        dimension: &str,
        declared: u32,
        suggestion: Option<&str>,
    ) {
        let mut item = DiagnosticItem::new(
            attribute,
            DiagnosticCode::UnresolvedDimension,
            format!(
                "dimension attribute {} not found (used by attribute {})",
                dimension, attribute
            ),
        )
        .with_context(format!(
            "dropped from {}_dims; the record still declares {} dimension(s) and is unsafe to consume until fixed",
            attribute, declared
        ));
        if let Some(candidate) = suggestion {
            item = item.with_context(format!("did you mean {}?", candidate));
        }
        self.push(item);
    }

    pub fn dimension_count_mismatch(&mut self, attribute: &str, declared: u32, listed: usize) {
        self.push(DiagnosticItem::new(
            attribute,
            DiagnosticCode::DimensionCountMismatch,
            format!(
                "attribute {} declares {} dimension(s) but lists {} Dims_definitions",
                attribute, declared, listed
            ),
        ));
    }

    pub fn dimension_cycle(&mut self, members: &[String]) {
        let subject = members.first().cloned().unwrap_or_default();
        self.push(
            DiagnosticItem::new(
                subject,
                DiagnosticCode::DimensionCycle,
                "attributes use each other as dimensions; declaration order cannot satisfy all of them",
            )
            .with_context(format!("cycle: {}", members.join(" -> "))),
        );
    }

    pub fn unreferenced_attribute(&mut self, attribute: &str) {
        self.push(DiagnosticItem::new(
            attribute,
            DiagnosticCode::UnreferencedAttribute,
            format!("{} is not referenced in any group!", attribute),
        ));
    }

    pub fn shared_attribute(&mut self, attribute: &str, count: usize) {
        self.push(DiagnosticItem::new(
            attribute,
            DiagnosticCode::SharedAttribute,
            format!("{} used {} times.", attribute, count),
        ));
    }

    pub fn duplicate_name(&mut self, kind: &str, name: &str, times: usize) {
        self.push(DiagnosticItem::new(
            name,
            DiagnosticCode::DuplicateName,
            format!("{} {} is defined {} times; generated symbols will collide", kind, name, times),
        ));
    }

    pub fn invalid_identifier(&mut self, kind: &str, name: &str) {
        self.push(DiagnosticItem::new(
            name,
            DiagnosticCode::InvalidIdentifier,
            format!("{} name {:?} is not a valid C identifier", kind, name),
        ));
    }

    /// Whether any warning was recorded
    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Warning)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Info)
    }

    /// Items with the given code, in the order they were recorded
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn info_count(&self) -> usize {
        self.infos().count()
    }

    /// Forward every item to the tracing subscriber
    pub fn log(&self) {
        for item in self {
            match item.severity() {
                Severity::Warning => tracing::warn!(code = %item.code, "{}", item),
                Severity::Info => tracing::info!(code = %item.code, "{}", item),
            }
        }
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in self {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!(
                "\n{} warning(s), {} note(s)\n",
                self.warning_count(),
                self.info_count()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
