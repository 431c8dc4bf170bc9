//! # Execution Adapter
//!
//! The storage layer owns query execution. It receives a [`CompiledFilter`]
//! and returns one page of matches. [`InMemoryCatalog`] is the reference
//! adapter: it evaluates the predicate row by row, which is what the tests
//! and the CLI use.

use crate::compiler::CompiledFilter;
use crate::entity::Filterable;
use crate::error::{Error, Result};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 30;

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    fn validate(&self) -> Result<()> {
        if self.page == 0 || self.page_size == 0 {
            return Err(Error::Execution(format!(
                "invalid page request (page {}, size {})",
                self.page, self.page_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    /// Matches after the limit, across all pages.
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size.max(1))
    }
}

pub trait ExecutionAdapter {
    type Item;

    fn execute(&self, filter: &CompiledFilter, page: PageRequest) -> Result<Page<Self::Item>>;
}

/// Evaluates filters against rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog<T> {
    items: Vec<T>,
}

impl<T> InMemoryCatalog<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Filterable + Clone> ExecutionAdapter for InMemoryCatalog<T> {
    type Item = T;

    fn execute(&self, filter: &CompiledFilter, page: PageRequest) -> Result<Page<T>> {
        page.validate()?;

        let mut matches: Vec<&T> = self.items.iter().filter(|item| filter.matches(*item)).collect();
        matches.sort_by(|a, b| filter.sort.compare(*a, *b));
        matches.truncate(filter.limit.cap(matches.len()));

        let total_items = matches.len();
        let items = matches
            .into_iter()
            .skip((page.page - 1).saturating_mul(page.page_size))
            .take(page.page_size)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page: page.page,
            page_size: page.page_size,
            total_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FilterComparison, FilterField};
    use crate::compiler::Compiler;
    use crate::entity::fixtures::SeriesFixture;
    use crate::entity::SeriesRecord;
    use crate::model::{FilterStatement, FilterV2};

    fn catalog() -> InMemoryCatalog<SeriesRecord> {
        InMemoryCatalog::new(vec![
            SeriesFixture::new(3, "Monster").genres(&["Thriller"]).build(),
            SeriesFixture::new(1, "Berserk").genres(&["Action", "Horror"]).build(),
            SeriesFixture::new(2, "Uzumaki").genres(&["Horror"]).build(),
            SeriesFixture::new(4, "berserk").genres(&["Horror"]).build(),
        ])
    }

    fn ids(page: &Page<SeriesRecord>) -> Vec<i64> {
        page.items.iter().map(|s| s.id).collect()
    }

    #[test]
    fn default_sort_is_name_then_id() {
        let compiled = Compiler::default().compile(&FilterV2::default()).unwrap();
        let page = catalog().execute(&compiled, PageRequest::default()).unwrap();
        assert_eq!(ids(&page), vec![1, 4, 3, 2]);
        assert_eq!(page.total_items, 4);
    }

    #[test]
    fn limit_applies_before_paging() {
        let filter = FilterV2 {
            limit_to: 3,
            ..Default::default()
        };
        let compiled = Compiler::default().compile(&filter).unwrap();
        let page = catalog().execute(&compiled, PageRequest::new(2, 2)).unwrap();
        assert_eq!(ids(&page), vec![3]);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn no_matches_is_an_empty_page() {
        let filter = FilterV2::default().with_statement(FilterStatement::new(
            FilterField::Genres,
            FilterComparison::Contains,
            "Romance",
        ));
        let compiled = Compiler::default().compile(&filter).unwrap();
        let page = catalog().execute(&compiled, PageRequest::default()).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
    }

    #[test]
    fn rejects_zero_page() {
        let compiled = Compiler::default().compile(&FilterV2::default()).unwrap();
        assert!(matches!(
            catalog().execute(&compiled, PageRequest::new(0, 10)),
            Err(Error::Execution(_))
        ));
    }
}
