//! Sort and limit attached to a compiled filter.

use super::predicate::CompiledPredicate;
use crate::entity::Filterable;
use crate::model::{SortField, SortOptions};
use std::cmp::Ordering;

/// A total ordering over entities.
///
/// Ties on the sort key always fall back to ascending entity id, so pages
/// stay stable across repeated executions of the same filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub ascending: bool,
}

impl SortSpec {
    pub fn compare<E: Filterable + ?Sized>(&self, a: &E, b: &E) -> Ordering {
        let by_key = a.sort_key(self.field).compare(&b.sort_key(self.field));
        let by_key = if self.ascending { by_key } else { by_key.reverse() };
        by_key.then_with(|| a.id().cmp(&b.id()))
    }
}

impl From<SortOptions> for SortSpec {
    fn from(options: SortOptions) -> Self {
        Self {
            field: options.sort_field,
            ascending: options.is_ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    To(u32),
}

impl Limit {
    /// `0` means no limit, not an empty result.
    pub fn from_limit_to(limit_to: u32) -> Self {
        match limit_to {
            0 => Limit::Unlimited,
            n => Limit::To(n),
        }
    }

    /// How many of `available` rows survive the limit.
    pub fn cap(&self, available: usize) -> usize {
        match self {
            Limit::Unlimited => available,
            Limit::To(n) => available.min(*n as usize),
        }
    }
}

/// Everything an execution adapter needs to run a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub predicate: CompiledPredicate,
    pub sort: SortSpec,
    pub limit: Limit,
}

impl CompiledFilter {
    pub fn matches<E: Filterable + ?Sized>(&self, entity: &E) -> bool {
        self.predicate.matches(entity)
    }
}
