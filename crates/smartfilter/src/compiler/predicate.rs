//! The compiled predicate tree.
//!
//! The tree keeps the shape of the filter instead of flattening it to one
//! boolean expression, so an execution adapter can push each [`Condition`]
//! down on its own (membership checks usually need a join, scalar ones do
//! not).

use super::literal::{DateLiteral, Operand};
use crate::catalog::{FilterComparison, FilterField, ValueKind};
use crate::entity::{FieldValue, Filterable};
use crate::model::FilterCombination;
use std::cmp::Ordering;

const FLOATING_POINT_TOLERANCE: f64 = 0.001;

/// One validated statement with its parsed operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FilterField,
    pub comparison: FilterComparison,
    pub kind: ValueKind,
    pub operand: Operand,
}

impl Condition {
    /// Whether evaluating this condition in storage needs a join against a
    /// related collection.
    pub fn needs_join(&self) -> bool {
        self.kind == ValueKind::EntityCollection
    }

    /// Evaluate against one entity. A missing value or a value of the wrong
    /// shape never matches, for negated operators too.
    pub fn evaluate<E: Filterable + ?Sized>(&self, entity: &E) -> bool {
        let Some(value) = entity.field_value(self.field) else {
            return false;
        };
        let comparison = self.comparison;

        match (&self.operand, value) {
            (Operand::Text { exact, folded }, FieldValue::Text(text)) => {
                text_matches(comparison, exact, folded, &text)
            }
            (Operand::Text { exact, folded }, FieldValue::Texts(texts)) => {
                if comparison == FilterComparison::NotEqual {
                    !texts.iter().any(|text| text == exact)
                } else {
                    texts
                        .iter()
                        .any(|text| text_matches(comparison, exact, folded, text))
                }
            }
            (Operand::Enum(expected), FieldValue::Enum(actual)) => match comparison {
                FilterComparison::Equal => actual == *expected,
                FilterComparison::NotEqual => actual != *expected,
                _ => false,
            },
            (Operand::Number(expected), FieldValue::Number(actual)) => match comparison {
                FilterComparison::Equal => (actual - expected).abs() < FLOATING_POINT_TOLERANCE,
                FilterComparison::NotEqual => (actual - expected).abs() >= FLOATING_POINT_TOLERANCE,
                _ => ordering_satisfies(comparison, actual.total_cmp(expected)),
            },
            (Operand::Date(literal), FieldValue::Date(Some(actual))) => {
                let ordering = match literal {
                    DateLiteral::Day(day) => actual.date_naive().cmp(day),
                    DateLiteral::Instant(instant) => actual.cmp(instant),
                };
                ordering_satisfies(comparison, ordering)
            }
            (Operand::Window { span, now }, FieldValue::Date(Some(actual))) => {
                let elapsed = *now - actual;
                match comparison {
                    FilterComparison::IsInLast => elapsed <= *span,
                    FilterComparison::IsNotInLast => elapsed > *span,
                    _ => false,
                }
            }
            (Operand::Duration(expected), FieldValue::Duration(actual)) => {
                ordering_satisfies(comparison, actual.cmp(expected))
            }
            (Operand::Members(tokens), FieldValue::Members(members)) => {
                let present = |token: &String| members.contains(token);
                match comparison {
                    FilterComparison::Contains => tokens.iter().any(present),
                    FilterComparison::MustContains => tokens.iter().all(present),
                    FilterComparison::NotContains => !tokens.iter().any(present),
                    _ => false,
                }
            }
            (Operand::Nothing, FieldValue::Members(members)) => {
                comparison == FilterComparison::IsEmpty && members.is_empty()
            }
            _ => false,
        }
    }
}

fn text_matches(comparison: FilterComparison, exact: &str, folded: &str, text: &str) -> bool {
    match comparison {
        FilterComparison::Equal => text == exact,
        FilterComparison::NotEqual => text != exact,
        FilterComparison::Matches => text.to_lowercase().contains(folded),
        FilterComparison::BeginsWith => text.to_lowercase().starts_with(folded),
        FilterComparison::EndsWith => text.to_lowercase().ends_with(folded),
        _ => false,
    }
}

/// `ordering` is `actual.cmp(literal)`.
fn ordering_satisfies(comparison: FilterComparison, ordering: Ordering) -> bool {
    match comparison {
        FilterComparison::Equal => ordering == Ordering::Equal,
        FilterComparison::NotEqual => ordering != Ordering::Equal,
        FilterComparison::GreaterThan | FilterComparison::IsAfter => ordering == Ordering::Greater,
        FilterComparison::GreaterThanEqual => ordering != Ordering::Less,
        FilterComparison::LessThan | FilterComparison::IsBefore => ordering == Ordering::Less,
        FilterComparison::LessThanEqual => ordering != Ordering::Greater,
        _ => false,
    }
}

/// A compiled group.
///
/// ```text
/// node = (combine(conditions) && all(and)) || any(or)
/// ```
///
/// `combination` only joins the direct conditions. Tree groups always use
/// `And`; the synthetic root built from a flat statement list uses the
/// request's combination. No conditions is vacuously true either way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub combination: FilterCombination,
    pub conditions: Vec<Condition>,
    pub and: Vec<Node>,
    pub or: Vec<Node>,
}

impl Node {
    pub fn evaluate<E: Filterable + ?Sized>(&self, entity: &E) -> bool {
        let direct = match self.combination {
            FilterCombination::And => self.conditions.iter().all(|c| c.evaluate(entity)),
            FilterCombination::Or => {
                self.conditions.is_empty() || self.conditions.iter().any(|c| c.evaluate(entity))
            }
        };
        (direct && self.and.iter().all(|child| child.evaluate(entity)))
            || self.or.iter().any(|child| child.evaluate(entity))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.and.is_empty() && self.or.is_empty()
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        out.extend(self.conditions.iter());
        for child in self.and.iter().chain(self.or.iter()) {
            child.collect(out);
        }
    }
}

/// An evaluable filter predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledPredicate {
    root: Node,
}

impl CompiledPredicate {
    pub(crate) fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn matches<E: Filterable + ?Sized>(&self, entity: &E) -> bool {
        self.root.evaluate(entity)
    }

    /// True when the predicate matches every entity without looking at it.
    pub fn is_trivial(&self) -> bool {
        self.root.is_empty()
    }

    /// Every condition in the tree, depth-first.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }
}
