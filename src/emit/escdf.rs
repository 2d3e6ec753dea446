//! ESCDF declaration grammar
//!
//! Produces the exact header text the ESCDF C library is built against,
//! trailing spaces included. `prefix` replaces `escdf` in file names, type
//! names and function names.

use crate::ids::IdTable;
use crate::names::{
    attributes_symbol, dims_symbol, id_file_name, id_guard, id_symbol, quoted, specs_file_name,
    specs_guard, specs_symbol, Category,
};
use crate::resolve::{ResolvedAttribute, ResolvedGroup, ResolvedModel};

use super::HeaderText;

/// `#define NAME id` for every entry, input order
pub fn render_ids(table: &IdTable, prefix: &str) -> String {
    let mut header = HeaderText::open(&id_guard(prefix, table.category));
    for entry in table.entries() {
        header.push(&format!("#define {} {}\n", entry.symbol(), entry.id));
    }
    header.close()
}

/// Dimension tables and specification records of all attributes
pub fn render_attribute_specs(model: &ResolvedModel, prefix: &str) -> String {
    let mut header = HeaderText::open(&specs_guard(prefix, Category::Attributes));
    header.include(&id_file_name(prefix, Category::Attributes));
    header.blank();

    for attribute in &model.attributes {
        header.push(&attribute_spec(attribute, prefix));
    }

    header.close_specs()
}

fn attribute_spec(attribute: &ResolvedAttribute, prefix: &str) -> String {
    let mut out = String::new();

    let dims_pointer = match &attribute.dims {
        None => "NULL".to_string(),
        Some(dims) => {
            let entries: Vec<String> = dims
                .iter()
                .map(|d| format!("\n  &{}", specs_symbol(d)))
                .collect();
            out.push_str(&format!(
                "const {}_attribute_specs_t *{}[] = {{ {} \n}};\n\n",
                prefix,
                dims_symbol(&attribute.name),
                entries.join(",")
            ));
            dims_symbol(&attribute.name)
        }
    };

    out.push_str(&format!(
        "const {}_attribute_specs_t {} = \n",
        prefix,
        specs_symbol(&attribute.name)
    ));
    out.push_str(&format!(
        "   {{ {}, {}, {}, {}, {}, {} }}; \n\n",
        id_symbol(&attribute.name),
        quoted(&attribute.name),
        attribute.data_type,
        attribute.string_length,
        attribute.dimensions,
        dims_pointer
    ));

    out
}

/// Datasets carry no fields yet; the header only pulls in their IDs
pub fn render_dataset_specs(prefix: &str) -> String {
    let mut header = HeaderText::open(&specs_guard(prefix, Category::Datasets));
    header.include(&id_file_name(prefix, Category::Datasets));
    header.blank();
    header.close_specs()
}

/// Attribute tables, group records and the registration routine.
///
/// All tables come first, then all records, both in input order. Empty
/// groups are skipped everywhere.
pub fn render_group_specs(model: &ResolvedModel, prefix: &str) -> String {
    let mut header = HeaderText::open(&specs_guard(prefix, Category::Groups));
    header.include(&id_file_name(prefix, Category::Groups));
    header.include(&specs_file_name(prefix, Category::Attributes));
    header.blank();
    header.include(&specs_file_name(prefix, Category::Datasets));
    header.blank();

    for group in model.non_empty_groups() {
        header.push(&group_table(group, prefix));
    }

    for group in model.non_empty_groups() {
        header.push(&group_record(group, prefix));
    }

    header.push(&registration_routine(model.non_empty_groups(), prefix));

    header.close_specs()
}

fn group_table(group: &ResolvedGroup, prefix: &str) -> String {
    let entries: Vec<String> = group
        .members
        .iter()
        .map(|m| format!("\n   &{}", specs_symbol(m)))
        .collect();
    format!(
        "const {}_attribute_specs_t *{}[] = {{ {}\n}};\n\n",
        prefix,
        attributes_symbol(&group.name),
        entries.join(",")
    )
}

fn group_record(group: &ResolvedGroup, prefix: &str) -> String {
    format!(
        "const {}_group_specs_t {} = {{\n {}, {}, {}, {} \n}};\n \n",
        prefix,
        specs_symbol(&group.name),
        id_symbol(&group.name),
        quoted(&group.name),
        group.resolved_count(),
        attributes_symbol(&group.name)
    )
}

fn registration_routine<'a>(
    groups: impl IntoIterator<Item = &'a ResolvedGroup>,
    prefix: &str,
) -> String {
    let mut out = format!("void {}_register_all_group_specs() {{ \n", prefix);
    for group in groups {
        out.push_str(&format!(
            "   {}_group_specs_register(&{}); \n",
            prefix,
            specs_symbol(&group.name)
        ));
    }
    out.push_str("}; \n");
    out
}
