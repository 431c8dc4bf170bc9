//! # Field Catalog
//!
//! Two static tables drive every other part of the engine:
//!
//! - [`FIELDS`]: one [`FieldDescriptor`] per filterable field, giving its
//!   [`ValueKind`] and, where relevant, its [`PersonRole`] or [`EnumDomain`].
//! - [`COMPARISONS`]: one [`ComparisonDescriptor`] per operator, giving the
//!   value kinds it is legal for.
//!
//! | Kind | Operators |
//! |------|-----------|
//! | `Text` | Equal, NotEqual, Matches, BeginsWith, EndsWith |
//! | `Enum` | Equal, NotEqual |
//! | `Number` | Equal, NotEqual, GreaterThan(Equal), LessThan(Equal) |
//! | `Date` | Equal, NotEqual, GreaterThan(Equal), LessThan(Equal), IsBefore, IsAfter, IsInLast, IsNotInLast |
//! | `Duration` | GreaterThan(Equal), LessThan(Equal) |
//! | `EntityCollection` | Contains, MustContains, NotContains, IsEmpty |
//!
//! Both tables are immutable and built at compile time, so lookups need no
//! synchronization. Adding a field or an operator means adding one row.

mod comparisons;
mod domains;
mod fields;

pub use comparisons::{
    comparison_by_name, comparison_from_id, describe_comparison, is_legal_pair, legal_comparisons,
    ComparisonDescriptor, FilterComparison, UnknownComparisonId, COMPARISONS,
};
pub use domains::{EnumDomain, PersonRole};
pub use fields::{
    describe_field, field_by_name, field_for_role, field_from_id, filterable_fields,
    FieldDescriptor, FilterField, UnknownFieldId, ValueKind, FIELDS,
};
