//! Output formatting. Nothing here prints; every function returns the text.

use super::setup::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use smartfilter::catalog::{describe_comparison, legal_comparisons, FieldDescriptor};
use smartfilter::codec::DroppedStatement;
use smartfilter::compiler::{CompiledFilter, Limit};
use smartfilter::entity::SeriesRecord;
use smartfilter::execute::Page;
use smartfilter::model::{FilterCombination, FilterGroup, FilterStatement, FilterV2};
use std::fmt::Write;

/// JSON or YAML for structured output. `Text` falls back to JSON.
pub fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Json | OutputFormat::Text => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRow {
    pub id: i32,
    pub name: &'static str,
    pub label: &'static str,
    pub kind: String,
    pub path: &'static str,
    pub operators: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<&'static str>,
}

impl From<&FieldDescriptor> for FieldRow {
    fn from(spec: &FieldDescriptor) -> Self {
        Self {
            id: spec.field.id(),
            name: spec.name,
            label: spec.label,
            kind: format!("{:?}", spec.kind),
            path: spec.entity_path,
            operators: legal_comparisons(spec.field)
                .filter_map(describe_comparison)
                .map(|c| c.name)
                .collect(),
            values: spec
                .domain
                .map(|domain| domain.variants().iter().map(|(name, _)| *name).collect())
                .unwrap_or_default(),
        }
    }
}

pub fn fields_text(rows: &[FieldRow]) -> String {
    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:>3}  {:<width$}  {:<16}  {}",
            row.id,
            row.name,
            row.kind,
            row.operators.join(", "),
            width = width
        );
        if !row.values.is_empty() {
            let _ = writeln!(out, "     {:<width$}  values: {}", "", row.values.join(", "), width = width);
        }
    }
    out
}

/// A readable outline of a filter tree.
pub fn filter_text(filter: &FilterV2) -> String {
    let mut out = String::new();
    if let Some(name) = &filter.name {
        let _ = writeln!(out, "{}", name);
    }
    if !filter.statements.is_empty() {
        let joiner = match filter.combination {
            FilterCombination::And => "all of",
            FilterCombination::Or => "any of",
        };
        let _ = writeln!(out, "{}:", joiner);
        for statement in &filter.statements {
            let _ = writeln!(out, "  {}", statement_text(statement));
        }
    }
    if let Some(group) = &filter.group {
        group_text(&mut out, group, 0);
    }
    if let Some(sort) = filter.sort_options {
        let direction = if sort.is_ascending { "ascending" } else { "descending" };
        let _ = writeln!(out, "sort: {:?} {}", sort.sort_field, direction);
    }
    if filter.limit_to > 0 {
        let _ = writeln!(out, "limit: {}", filter.limit_to);
    }
    if out.is_empty() {
        out.push_str("(matches everything)\n");
    }
    out
}

fn group_text(out: &mut String, group: &FilterGroup, indent: usize) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{}group:", pad);
    for statement in &group.statements {
        let _ = writeln!(out, "{}  {}", pad, statement_text(statement));
    }
    for child in &group.and {
        let _ = writeln!(out, "{}  and", pad);
        group_text(out, child, indent + 2);
    }
    for child in &group.or {
        let _ = writeln!(out, "{}  or", pad);
        group_text(out, child, indent + 2);
    }
}

fn statement_text(statement: &FilterStatement) -> String {
    format!("{} {} {:?}", statement.field, statement.comparison, statement.value)
}

pub fn dropped_text(dropped: &[DroppedStatement]) -> String {
    let mut out = String::new();
    for d in dropped {
        let _ = writeln!(
            out,
            "dropped {} (field {}, operator {}, value {:?}): {:?}",
            d.location, d.field_id, d.comparison_id, d.value, d.reason
        );
    }
    out
}

pub fn check_text(compiled: &CompiledFilter, dropped: &[DroppedStatement]) -> String {
    let conditions = compiled.predicate.conditions().len();
    let joins = compiled
        .predicate
        .conditions()
        .iter()
        .filter(|c| c.needs_join())
        .count();
    let limit = match compiled.limit {
        Limit::Unlimited => "unlimited".to_string(),
        Limit::To(n) => format!("limit {}", n),
    };
    let direction = if compiled.sort.ascending { "ascending" } else { "descending" };

    let mut out = format!(
        "ok: {} conditions ({} on related records), sort {:?} {}, {}\n",
        conditions, joins, compiled.sort.field, direction, limit
    );
    if !dropped.is_empty() {
        let _ = writeln!(out, "partial: {} statements dropped", dropped.len());
        out.push_str(&dropped_text(dropped));
    }
    out
}

pub fn page_text(page: &Page<SeriesRecord>) -> String {
    let mut out = String::new();
    for series in &page.items {
        let _ = writeln!(out, "{:>6}  {}", series.id, series.name);
    }
    let _ = writeln!(
        out,
        "page {}/{} ({} matching)",
        page.page,
        page.total_pages().max(1),
        page.total_items
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfilter::catalog::{describe_field, FilterComparison, FilterField};

    #[test]
    fn field_rows_list_legal_operators_and_values() {
        let row = FieldRow::from(describe_field(FilterField::AgeRating).unwrap());
        assert_eq!(row.operators, vec!["equal", "notEqual"]);
        assert_eq!(row.path, "ageRating");
        assert!(row.values.contains(&"Teen"));
    }

    #[test]
    fn filter_outline_shows_nesting() {
        let filter = FilterV2::named("Picks")
            .with_statement(FilterStatement::new(
                FilterField::Genres,
                FilterComparison::Contains,
                "Horror",
            ))
            .with_group(FilterGroup::default().with_or(FilterGroup::all(vec![FilterStatement::new(
                FilterField::SeriesName,
                FilterComparison::BeginsWith,
                "The",
            )])));
        let text = filter_text(&filter);
        assert!(text.starts_with("Picks\nall of:\n"));
        assert!(text.contains("  or\n"));
    }

    #[test]
    fn empty_filter_outline() {
        assert_eq!(filter_text(&FilterV2::default()), "(matches everything)\n");
    }
}
