//! Comparison operators and the kinds they are legal for.

use super::fields::{describe_field, FilterField, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A comparison operator. The discriminant is the stable wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum FilterComparison {
    Equal = 0,
    GreaterThan = 1,
    GreaterThanEqual = 2,
    LessThan = 3,
    LessThanEqual = 4,
    /// Any supplied token is a member of the collection.
    Contains = 5,
    /// Every supplied token is a member of the collection.
    MustContains = 6,
    /// Case-insensitive substring.
    Matches = 7,
    NotContains = 8,
    NotEqual = 9,
    BeginsWith = 10,
    EndsWith = 11,
    IsBefore = 12,
    IsAfter = 13,
    /// The date lies within the last N seconds.
    IsInLast = 14,
    IsNotInLast = 15,
    /// The collection has no members. The literal is ignored.
    IsEmpty = 16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown filter comparison id {0}")]
pub struct UnknownComparisonId(pub i32);

impl FilterComparison {
    pub fn id(self) -> i32 {
        self as i32
    }
}

impl From<FilterComparison> for i32 {
    fn from(comparison: FilterComparison) -> Self {
        comparison.id()
    }
}

impl TryFrom<i32> for FilterComparison {
    type Error = UnknownComparisonId;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        comparison_from_id(id).ok_or(UnknownComparisonId(id))
    }
}

impl fmt::Display for FilterComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match describe_comparison(*self) {
            Some(spec) => f.write_str(spec.label),
            None => write!(f, "comparison #{}", self.id()),
        }
    }
}

/// Static metadata about one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonDescriptor {
    pub comparison: FilterComparison,
    pub name: &'static str,
    pub label: &'static str,
    /// Value kinds this operator may be applied to.
    pub kinds: &'static [ValueKind],
}

const EQUALITY: &[ValueKind] = &[
    ValueKind::Text,
    ValueKind::Enum,
    ValueKind::Number,
    ValueKind::Date,
];
const ORDINAL: &[ValueKind] = &[ValueKind::Number, ValueKind::Date, ValueKind::Duration];
const MEMBERSHIP: &[ValueKind] = &[ValueKind::EntityCollection];
const TEXTUAL: &[ValueKind] = &[ValueKind::Text];
const TEMPORAL: &[ValueKind] = &[ValueKind::Date];

impl ComparisonDescriptor {
    const fn new(
        comparison: FilterComparison,
        name: &'static str,
        label: &'static str,
        kinds: &'static [ValueKind],
    ) -> Self {
        Self {
            comparison,
            name,
            label,
            kinds,
        }
    }

    pub fn is_legal_for(&self, kind: ValueKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Registry of all comparison operators.
pub const COMPARISONS: &[ComparisonDescriptor] = &[
    ComparisonDescriptor::new(FilterComparison::Equal, "equal", "Is", EQUALITY),
    ComparisonDescriptor::new(FilterComparison::NotEqual, "notEqual", "Is Not", EQUALITY),
    ComparisonDescriptor::new(FilterComparison::GreaterThan, "greaterThan", "Greater Than", ORDINAL),
    ComparisonDescriptor::new(
        FilterComparison::GreaterThanEqual,
        "greaterThanEqual",
        "Greater Than or Equal",
        ORDINAL,
    ),
    ComparisonDescriptor::new(FilterComparison::LessThan, "lessThan", "Less Than", ORDINAL),
    ComparisonDescriptor::new(
        FilterComparison::LessThanEqual,
        "lessThanEqual",
        "Less Than or Equal",
        ORDINAL,
    ),
    ComparisonDescriptor::new(FilterComparison::Contains, "contains", "Contains", MEMBERSHIP),
    ComparisonDescriptor::new(FilterComparison::MustContains, "mustContains", "Must Contains", MEMBERSHIP),
    ComparisonDescriptor::new(FilterComparison::NotContains, "notContains", "Does Not Contain", MEMBERSHIP),
    ComparisonDescriptor::new(FilterComparison::IsEmpty, "isEmpty", "Is Empty", MEMBERSHIP),
    ComparisonDescriptor::new(FilterComparison::Matches, "matches", "Matches", TEXTUAL),
    ComparisonDescriptor::new(FilterComparison::BeginsWith, "beginsWith", "Starts With", TEXTUAL),
    ComparisonDescriptor::new(FilterComparison::EndsWith, "endsWith", "Ends With", TEXTUAL),
    ComparisonDescriptor::new(FilterComparison::IsBefore, "isBefore", "Is Before", TEMPORAL),
    ComparisonDescriptor::new(FilterComparison::IsAfter, "isAfter", "Is After", TEMPORAL),
    ComparisonDescriptor::new(FilterComparison::IsInLast, "isInLast", "Is In Last", TEMPORAL),
    ComparisonDescriptor::new(FilterComparison::IsNotInLast, "isNotInLast", "Is Not In Last", TEMPORAL),
];

pub fn describe_comparison(comparison: FilterComparison) -> Option<&'static ComparisonDescriptor> {
    COMPARISONS.iter().find(|spec| spec.comparison == comparison)
}

pub fn comparison_from_id(id: i32) -> Option<FilterComparison> {
    COMPARISONS
        .iter()
        .find(|spec| spec.comparison.id() == id)
        .map(|spec| spec.comparison)
}

pub fn comparison_by_name(name: &str) -> Option<FilterComparison> {
    COMPARISONS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
        .map(|spec| spec.comparison)
}

/// Whether `comparison` may be applied to `field`.
///
/// Fields that are not filterable accept no operator at all.
pub fn is_legal_pair(field: FilterField, comparison: FilterComparison) -> bool {
    let (Some(field_spec), Some(comparison_spec)) =
        (describe_field(field), describe_comparison(comparison))
    else {
        return false;
    };
    field_spec.filterable && comparison_spec.is_legal_for(field_spec.kind)
}

/// Operators legal for `field`, in table order.
pub fn legal_comparisons(field: FilterField) -> impl Iterator<Item = FilterComparison> {
    COMPARISONS
        .iter()
        .map(|spec| spec.comparison)
        .filter(move |comparison| is_legal_pair(field, *comparison))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_id_has_exactly_one_row() {
        let ids: HashSet<i32> = COMPARISONS.iter().map(|spec| spec.comparison.id()).collect();
        assert_eq!(ids.len(), COMPARISONS.len());
        for id in 0..=16 {
            assert!(comparison_from_id(id).is_some(), "missing row for id {}", id);
        }
        assert!(comparison_from_id(17).is_none());
    }

    #[test]
    fn membership_operators_only_apply_to_collections() {
        for comparison in [
            FilterComparison::Contains,
            FilterComparison::MustContains,
            FilterComparison::NotContains,
            FilterComparison::IsEmpty,
        ] {
            assert!(is_legal_pair(FilterField::Genres, comparison));
            assert!(is_legal_pair(FilterField::Writers, comparison));
            assert!(!is_legal_pair(FilterField::SeriesName, comparison));
            assert!(!is_legal_pair(FilterField::ReleaseYear, comparison));
        }
    }

    #[test]
    fn text_field_rejects_ordinal_operators() {
        assert!(!is_legal_pair(FilterField::SeriesName, FilterComparison::GreaterThan));
        assert!(!is_legal_pair(FilterField::Summary, FilterComparison::LessThanEqual));
        assert!(is_legal_pair(FilterField::SeriesName, FilterComparison::Matches));
    }

    #[test]
    fn temporal_operators_only_apply_to_dates() {
        assert!(is_legal_pair(FilterField::ReadingDate, FilterComparison::IsInLast));
        assert!(is_legal_pair(FilterField::ReadingDate, FilterComparison::IsBefore));
        assert!(!is_legal_pair(FilterField::ReleaseYear, FilterComparison::IsBefore));
        assert!(!is_legal_pair(FilterField::ReadTime, FilterComparison::IsNotInLast));
    }

    #[test]
    fn durations_support_ordinal_comparison_only() {
        let legal: Vec<_> = legal_comparisons(FilterField::ReadTime).collect();
        assert_eq!(
            legal,
            vec![
                FilterComparison::GreaterThan,
                FilterComparison::GreaterThanEqual,
                FilterComparison::LessThan,
                FilterComparison::LessThanEqual,
            ]
        );
    }

    #[test]
    fn placeholder_field_accepts_nothing() {
        assert_eq!(legal_comparisons(FilterField::None).count(), 0);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(comparison_by_name("MustContains"), Some(FilterComparison::MustContains));
        assert_eq!(comparison_by_name("isinlast"), Some(FilterComparison::IsInLast));
        assert_eq!(comparison_by_name("like"), None);
    }
}
