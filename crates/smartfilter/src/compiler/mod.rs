//! # Filter Compiler
//!
//! Validates a [`FilterV2`] against the field catalog and builds a
//! [`CompiledFilter`]: a predicate tree, a sort and a limit.
//!
//! ## Rules
//!
//! 1. Every statement's operator must be legal for its field's kind,
//!    otherwise [`CompileError::IllegalOperatorForField`].
//! 2. Every literal must parse into the field's native type, otherwise
//!    [`CompileError::ValueParseError`].
//! 3. Depth, statement count and group count are bounded while walking, so
//!    a hostile shared filter cannot make compilation unbounded.
//! 4. Without an explicit sort the configured default applies; the id
//!    tiebreak in [`SortSpec`] makes every ordering total.
//! 5. `limit_to == 0` compiles to [`Limit::Unlimited`].
//!
//! Compilation is all or nothing: the first offending statement is reported
//! with its location and nothing is returned. A valid filter that matches no
//! entity is not an error.

mod literal;
mod plan;
mod predicate;

pub use literal::{DateLiteral, Operand};
pub use plan::{CompiledFilter, Limit, SortSpec};
pub use predicate::{CompiledPredicate, Condition, Node};

use crate::catalog::{describe_field, is_legal_pair};
use crate::config::EngineConfig;
use crate::error::{CompileError, StructuralLimit};
use crate::model::{FilterCombination, FilterGroup, FilterStatement, FilterV2, SortOptions};
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    pub max_depth: usize,
    pub max_statements: usize,
    pub max_groups: usize,
    pub default_sort: SortOptions,
    /// Anchor for `IsInLast` / `IsNotInLast`.
    pub now: DateTime<Utc>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl CompileOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_statements: config.max_statements,
            max_groups: config.max_groups,
            default_sort: config.default_sort(),
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Stateless apart from its options; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

struct Budget {
    statements: usize,
    groups: usize,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a full request. The flat statements join with the request's
    /// combination; a group tree, when present, is ANDed with them.
    pub fn compile(&self, filter: &FilterV2) -> Result<CompiledFilter, CompileError> {
        let mut budget = Budget {
            statements: 0,
            groups: 0,
        };

        let conditions = self.compile_statements(&filter.statements, "statements", &mut budget)?;
        let tree = filter
            .group
            .as_ref()
            .map(|group| self.compile_node(group, FilterCombination::And, "group", 1, &mut budget))
            .transpose()?;

        let root = match tree {
            None => Node {
                combination: filter.combination,
                conditions,
                ..Default::default()
            },
            Some(tree) if conditions.is_empty() => tree,
            Some(tree) => Node {
                combination: filter.combination,
                conditions,
                and: vec![tree],
                or: Vec::new(),
            },
        };

        let sort = SortSpec::from(filter.sort_options.unwrap_or(self.options.default_sort));
        let limit = Limit::from_limit_to(filter.limit_to);
        debug!(
            statements = budget.statements,
            groups = budget.groups,
            sort_field = ?sort.field,
            ascending = sort.ascending,
            ?limit,
            "compiled filter"
        );

        Ok(CompiledFilter {
            predicate: CompiledPredicate::new(root),
            sort,
            limit,
        })
    }

    /// Compile one group on its own. `combination` joins the group's direct
    /// statements; nested groups always require all of theirs.
    pub fn compile_group(
        &self,
        group: &FilterGroup,
        combination: FilterCombination,
    ) -> Result<CompiledPredicate, CompileError> {
        let mut budget = Budget {
            statements: 0,
            groups: 0,
        };
        let root = self.compile_node(group, combination, "group", 1, &mut budget)?;
        Ok(CompiledPredicate::new(root))
    }

    fn compile_node(
        &self,
        group: &FilterGroup,
        combination: FilterCombination,
        path: &str,
        depth: usize,
        budget: &mut Budget,
    ) -> Result<Node, CompileError> {
        if depth > self.options.max_depth {
            return Err(CompileError::StructuralLimitExceeded {
                limit: StructuralLimit::Depth,
                max: self.options.max_depth,
                actual: depth,
            });
        }
        budget.groups += 1;
        if budget.groups > self.options.max_groups {
            return Err(CompileError::StructuralLimitExceeded {
                limit: StructuralLimit::Groups,
                max: self.options.max_groups,
                actual: budget.groups,
            });
        }

        let conditions =
            self.compile_statements(&group.statements, &format!("{}.statements", path), budget)?;
        let mut and = Vec::with_capacity(group.and.len());
        for (i, child) in group.and.iter().enumerate() {
            let child_path = format!("{}.and[{}]", path, i);
            and.push(self.compile_node(child, FilterCombination::And, &child_path, depth + 1, budget)?);
        }
        let mut or = Vec::with_capacity(group.or.len());
        for (i, child) in group.or.iter().enumerate() {
            let child_path = format!("{}.or[{}]", path, i);
            or.push(self.compile_node(child, FilterCombination::And, &child_path, depth + 1, budget)?);
        }

        Ok(Node {
            combination,
            conditions,
            and,
            or,
        })
    }

    fn compile_statements(
        &self,
        statements: &[FilterStatement],
        path: &str,
        budget: &mut Budget,
    ) -> Result<Vec<Condition>, CompileError> {
        budget.statements += statements.len();
        if budget.statements > self.options.max_statements {
            return Err(CompileError::StructuralLimitExceeded {
                limit: StructuralLimit::Statements,
                max: self.options.max_statements,
                actual: budget.statements,
            });
        }
        statements
            .iter()
            .enumerate()
            .map(|(i, statement)| self.compile_statement(statement, format!("{}[{}]", path, i)))
            .collect()
    }

    fn compile_statement(
        &self,
        statement: &FilterStatement,
        location: String,
    ) -> Result<Condition, CompileError> {
        let Some(spec) = describe_field(statement.field)
            .filter(|_| is_legal_pair(statement.field, statement.comparison))
        else {
            return Err(CompileError::IllegalOperatorForField {
                field: statement.field,
                comparison: statement.comparison,
                location,
            });
        };

        let operand = literal::parse_operand(
            spec,
            statement.comparison,
            &statement.value,
            self.options.now,
        )
        .map_err(|reason| CompileError::ValueParseError {
            field: statement.field,
            comparison: statement.comparison,
            value: statement.value.clone(),
            reason,
            location,
        })?;

        Ok(Condition {
            field: statement.field,
            comparison: statement.comparison,
            kind: spec.kind,
            operand,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FilterComparison, FilterField};
    use crate::entity::fixtures::SeriesFixture;
    use crate::model::SortField;
    use chrono::{TimeDelta, TimeZone};

    fn stmt(field: FilterField, comparison: FilterComparison, value: &str) -> FilterStatement {
        FilterStatement::new(field, comparison, value)
    }

    fn compiler() -> Compiler {
        Compiler::new(CompileOptions::default().at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()))
    }

    #[test]
    fn illegal_operator_names_field_and_comparison() {
        let filter = FilterV2::default().with_statement(stmt(
            FilterField::SeriesName,
            FilterComparison::GreaterThan,
            "x",
        ));
        let err = compiler().compile(&filter).unwrap_err();
        assert_eq!(
            err,
            CompileError::IllegalOperatorForField {
                field: FilterField::SeriesName,
                comparison: FilterComparison::GreaterThan,
                location: "statements[0]".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Field Series Name does not support operator Greater Than (at statements[0])"
        );
    }

    #[test]
    fn placeholder_field_is_rejected() {
        let filter =
            FilterV2::default().with_statement(stmt(FilterField::None, FilterComparison::Equal, ""));
        assert!(matches!(
            compiler().compile(&filter),
            Err(CompileError::IllegalOperatorForField { field: FilterField::None, .. })
        ));
    }

    #[test]
    fn bad_literal_fails_the_whole_compile() {
        let group = FilterGroup::all(vec![stmt(FilterField::SeriesName, FilterComparison::Equal, "ok")])
            .with_or(FilterGroup::all(vec![stmt(
                FilterField::ReleaseYear,
                FilterComparison::GreaterThan,
                "nineteen",
            )]));
        let err = compiler().compile(&FilterV2::default().with_group(group)).unwrap_err();
        match err {
            CompileError::ValueParseError { field, value, location, .. } => {
                assert_eq!(field, FilterField::ReleaseYear);
                assert_eq!(value, "nineteen");
                assert_eq!(location, "group.or[0].statements[0]");
            }
            other => panic!("expected a value parse error, got {:?}", other),
        }
    }

    #[test]
    fn depth_is_bounded() {
        let mut group = FilterGroup::default();
        for _ in 0..20 {
            group = FilterGroup::default().with_and(group);
        }
        let err = compiler().compile(&FilterV2::default().with_group(group)).unwrap_err();
        assert!(matches!(
            err,
            CompileError::StructuralLimitExceeded { limit: StructuralLimit::Depth, max: 16, .. }
        ));
    }

    #[test]
    fn statement_count_is_bounded() {
        let statements = (0..300)
            .map(|i| stmt(FilterField::Tags, FilterComparison::Contains, &i.to_string()))
            .collect();
        let filter = FilterV2 {
            statements,
            ..Default::default()
        };
        assert!(matches!(
            compiler().compile(&filter),
            Err(CompileError::StructuralLimitExceeded { limit: StructuralLimit::Statements, .. })
        ));
    }

    #[test]
    fn group_count_is_bounded() {
        let mut group = FilterGroup::default();
        for _ in 0..200 {
            group = group.with_or(FilterGroup::default());
        }
        assert!(matches!(
            compiler().compile(&FilterV2::default().with_group(group)),
            Err(CompileError::StructuralLimitExceeded { limit: StructuralLimit::Groups, .. })
        ));
    }

    #[test]
    fn missing_sort_uses_default() {
        let compiled = compiler().compile(&FilterV2::default()).unwrap();
        assert_eq!(
            compiled.sort,
            SortSpec {
                field: SortField::SortName,
                ascending: true
            }
        );
        assert_eq!(compiled.limit, Limit::Unlimited);
        assert!(compiled.predicate.is_trivial());
    }

    #[test]
    fn explicit_sort_and_limit_are_attached() {
        let filter = FilterV2 {
            sort_options: Some(SortOptions {
                sort_field: SortField::AverageRating,
                is_ascending: false,
            }),
            limit_to: 10,
            ..Default::default()
        };
        let compiled = compiler().compile(&filter).unwrap();
        assert_eq!(compiled.sort.field, SortField::AverageRating);
        assert!(!compiled.sort.ascending);
        assert_eq!(compiled.limit, Limit::To(10));
    }

    #[test]
    fn flat_or_matches_any_statement() {
        let filter = FilterV2 {
            statements: vec![
                stmt(FilterField::SeriesName, FilterComparison::Equal, "Berserk"),
                stmt(FilterField::SeriesName, FilterComparison::Equal, "Vagabond"),
            ],
            combination: FilterCombination::Or,
            ..Default::default()
        };
        let compiled = compiler().compile(&filter).unwrap();
        assert!(compiled.matches(&SeriesFixture::new(1, "Vagabond").build()));
        assert!(!compiled.matches(&SeriesFixture::new(2, "Monster").build()));

        let and = FilterV2 {
            combination: FilterCombination::And,
            ..filter
        };
        assert!(!compiler().compile(&and).unwrap().matches(&SeriesFixture::new(1, "Vagabond").build()));
    }

    #[test]
    fn flat_list_and_tree_are_combined() {
        let filter = FilterV2::default()
            .with_statement(stmt(FilterField::Genres, FilterComparison::Contains, "Horror"))
            .with_group(FilterGroup::all(vec![stmt(
                FilterField::AgeRating,
                FilterComparison::Equal,
                "Mature",
            )]));
        let compiled = compiler().compile(&filter).unwrap();
        let both = SeriesFixture::new(1, "A").genres(&["Horror"]).age_rating("Mature").build();
        let only_genre = SeriesFixture::new(2, "B").genres(&["Horror"]).age_rating("Teen").build();
        assert!(compiled.matches(&both));
        assert!(!compiled.matches(&only_genre));
        assert_eq!(compiled.predicate.conditions().len(), 2);
    }

    #[test]
    fn compile_group_uses_given_combination() {
        let group = FilterGroup::all(vec![
            stmt(FilterField::Tags, FilterComparison::Contains, "a"),
            stmt(FilterField::Tags, FilterComparison::Contains, "b"),
        ]);
        let series = SeriesFixture::new(1, "A").tags(&["b"]).build();
        assert!(compiler().compile_group(&group, FilterCombination::Or).unwrap().matches(&series));
        assert!(!compiler().compile_group(&group, FilterCombination::And).unwrap().matches(&series));
    }

    #[test]
    fn in_last_is_anchored_at_compile_time() {
        let now = compiler().options().now;
        let filter = FilterV2::default().with_statement(stmt(
            FilterField::ReadingDate,
            FilterComparison::IsInLast,
            "3600",
        ));
        let compiled = compiler().compile(&filter).unwrap();
        let recent = SeriesFixture::new(1, "A").last_read(now - TimeDelta::minutes(30)).build();
        let stale = SeriesFixture::new(2, "B").last_read(now - TimeDelta::hours(2)).build();
        assert!(compiled.matches(&recent));
        assert!(!compiled.matches(&stale));
    }
}
