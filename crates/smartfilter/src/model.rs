//! # Filter Model
//!
//! A filter request comes in two shapes that both compile:
//!
//! - the legacy **flat** shape: a list of [`FilterStatement`]s joined by one
//!   [`FilterCombination`];
//! - the **tree** shape: a [`FilterGroup`] with direct statements, `and`
//!   children and `or` children.
//!
//! [`FilterV2`] carries both, plus the name, sort and limit that travel with
//! a saved smart filter.
//!
//! ## Group evaluation
//!
//! ```text
//! group = (all(statements) && all(and)) || any(or)
//! ```
//!
//! The `or` children are an escape hatch: one true `or` child makes the
//! group true even when its statements or `and` children fail. An empty
//! group is true.
//!
//! All types serialize with camelCase keys and numeric ids for fields,
//! comparisons, combinations and sort fields, matching the UI payloads.

use crate::catalog::{FilterComparison, FilterField};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One leaf condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStatement {
    pub field: FilterField,
    pub comparison: FilterComparison,
    /// The literal, always carried as text. The compiler parses it.
    #[serde(default)]
    pub value: String,
}

impl FilterStatement {
    pub fn new(field: FilterField, comparison: FilterComparison, value: impl Into<String>) -> Self {
        Self {
            field,
            comparison,
            value: value.into(),
        }
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterGroup {
    pub statements: Vec<FilterStatement>,
    pub and: Vec<FilterGroup>,
    pub or: Vec<FilterGroup>,
}

impl FilterGroup {
    /// A group requiring all of `statements`.
    pub fn all(statements: Vec<FilterStatement>) -> Self {
        Self {
            statements,
            ..Default::default()
        }
    }

    pub fn with_and(mut self, child: FilterGroup) -> Self {
        self.and.push(child);
        self
    }

    pub fn with_or(mut self, child: FilterGroup) -> Self {
        self.or.push(child);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.and.is_empty() && self.or.is_empty()
    }

    /// Nesting depth; a lone group has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .and
            .iter()
            .chain(self.or.iter())
            .map(FilterGroup::depth)
            .max()
            .unwrap_or(0)
    }

    /// Statements in this group and all descendants.
    pub fn statement_count(&self) -> usize {
        self.statements.len()
            + self
                .and
                .iter()
                .chain(self.or.iter())
                .map(FilterGroup::statement_count)
                .sum::<usize>()
    }

    /// This group and all descendants.
    pub fn group_count(&self) -> usize {
        1 + self
            .and
            .iter()
            .chain(self.or.iter())
            .map(FilterGroup::group_count)
            .sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind} id {id}")]
pub struct UnknownId {
    pub kind: &'static str,
    pub id: u8,
}

/// How the flat statement list combines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum FilterCombination {
    Or = 0,
    #[default]
    And = 1,
}

impl From<FilterCombination> for u8 {
    fn from(combination: FilterCombination) -> Self {
        combination as u8
    }
}

impl TryFrom<u8> for FilterCombination {
    type Error = UnknownId;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(FilterCombination::Or),
            1 => Ok(FilterCombination::And),
            _ => Err(UnknownId {
                kind: "combination",
                id,
            }),
        }
    }
}

/// Orderings a filter can request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SortField {
    #[default]
    SortName = 1,
    CreatedDate = 2,
    LastModifiedDate = 3,
    LastChapterAdded = 4,
    TimeToRead = 5,
    ReleaseYear = 6,
    ReadProgress = 7,
    AverageRating = 8,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::SortName,
        SortField::CreatedDate,
        SortField::LastModifiedDate,
        SortField::LastChapterAdded,
        SortField::TimeToRead,
        SortField::ReleaseYear,
        SortField::ReadProgress,
        SortField::AverageRating,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }
}

impl From<SortField> for u8 {
    fn from(field: SortField) -> Self {
        field.id()
    }
}

impl TryFrom<u8> for SortField {
    type Error = UnknownId;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        SortField::ALL
            .into_iter()
            .find(|field| field.id() == id)
            .ok_or(UnknownId {
                kind: "sort field",
                id,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOptions {
    pub sort_field: SortField,
    pub is_ascending: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            sort_field: SortField::SortName,
            is_ascending: true,
        }
    }
}

/// A complete filter request, as stored in a smart filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterV2 {
    pub name: Option<String>,
    pub statements: Vec<FilterStatement>,
    pub combination: FilterCombination,
    pub sort_options: Option<SortOptions>,
    /// Maximum number of results. `0` means unlimited.
    pub limit_to: u32,
    /// The nested tree built by the rich filter editor.
    pub group: Option<FilterGroup>,
}

impl FilterV2 {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_statement(mut self, statement: FilterStatement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// True when neither the flat list nor the tree holds any statement.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
            && self.group.as_ref().map_or(true, |group| group.statement_count() == 0)
    }
}
