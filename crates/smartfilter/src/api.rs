//! # API Facade
//!
//! [`FilterApi`] is the single entry point UIs use. It is a thin facade:
//! decoding lives in [`crate::codec`], validation in [`crate::compiler`] and
//! execution behind [`ExecutionAdapter`]. The facade only wires them to the
//! loaded [`EngineConfig`] and shapes results into DTOs.
//!
//! ## Generic Over SmartFilterStore
//!
//! `FilterApi<S: SmartFilterStore>` owns the smart filter store:
//! - Production: whatever the storage layer provides
//! - Testing: [`InMemorySmartFilterStore`]
//!
//! The API does no I/O and never prints. Raw ids coming from a UI are
//! resolved here, so an unknown id surfaces as a [`CompileError`] naming the
//! statement rather than a decode failure.
//!
//! [`InMemorySmartFilterStore`]: crate::smart_filter::InMemorySmartFilterStore

use crate::catalog::{comparison_from_id, field_from_id};
use crate::codec::{self, DroppedStatement};
use crate::compiler::{CompileOptions, CompiledFilter, Compiler};
use crate::config::EngineConfig;
use crate::error::{CompileError, Result};
use crate::execute::{ExecutionAdapter, Page, PageRequest};
use crate::model::{FilterStatement, FilterV2};
use crate::smart_filter::{resolve_stream, ResolvedStream, SmartFilter, SmartFilterStore, Stream};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeFilterDto {
    pub encoded_filter: String,
}

/// A decoded filter plus what the decoder had to leave out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterV2Dto {
    #[serde(flatten)]
    pub filter: FilterV2,
    pub is_partial: bool,
    pub dropped: Vec<DroppedStatement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_sort_field: Option<i64>,
}

/// A statement as a form posts it, ids not yet checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatementDto {
    pub field: i64,
    pub comparison: i64,
    #[serde(default)]
    pub value: String,
}

pub struct FilterApi<S: SmartFilterStore> {
    store: S,
    config: EngineConfig,
}

impl<S: SmartFilterStore> FilterApi<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn decode_filter(&self, dto: &DecodeFilterDto) -> Result<FilterV2Dto> {
        let decoded = codec::decode_with_limit(&dto.encoded_filter, self.config.max_encoded_len)?;
        Ok(FilterV2Dto {
            is_partial: decoded.is_partial(),
            filter: decoded.filter,
            dropped: decoded.dropped,
            removed_groups: decoded.removed_groups,
            ignored_sort_field: decoded.ignored_sort_field,
        })
    }

    pub fn encode_filter(&self, filter: &FilterV2) -> Result<String> {
        codec::encode(filter)
    }

    /// Compile against the current time.
    pub fn validate(&self, filter: &FilterV2) -> Result<CompiledFilter> {
        self.validate_at(filter, Utc::now())
    }

    pub fn validate_at(&self, filter: &FilterV2, now: DateTime<Utc>) -> Result<CompiledFilter> {
        let compiler = Compiler::new(CompileOptions::from_config(&self.config).at(now));
        Ok(compiler.compile(filter)?)
    }

    pub fn query<A: ExecutionAdapter>(
        &self,
        adapter: &A,
        filter: &FilterV2,
        page: PageRequest,
    ) -> Result<Page<A::Item>> {
        let compiled = self.validate(filter)?;
        adapter.execute(&compiled, page)
    }

    /// Resolve raw ids into a statement. `location` names the statement in
    /// the error.
    pub fn statement_from_raw(&self, raw: &RawStatementDto, location: &str) -> Result<FilterStatement> {
        let field = i32::try_from(raw.field)
            .ok()
            .and_then(field_from_id)
            .ok_or_else(|| CompileError::UnknownField {
                id: raw.field,
                location: location.to_string(),
            })?;
        let comparison = i32::try_from(raw.comparison)
            .ok()
            .and_then(comparison_from_id)
            .ok_or_else(|| CompileError::UnknownComparison {
                id: raw.comparison,
                location: location.to_string(),
            })?;
        Ok(FilterStatement::new(field, comparison, raw.value.clone()))
    }

    pub fn create_smart_filter(&mut self, name: &str, filter: &FilterV2) -> Result<SmartFilter> {
        self.validate(filter)?;
        let encoded = codec::encode(filter)?;
        self.store.create(name, &encoded)
    }

    pub fn list_smart_filters(&self) -> Vec<&SmartFilter> {
        self.store.list()
    }

    pub fn delete_smart_filter(&mut self, id: i64) -> Result<SmartFilter> {
        self.store.delete(id)
    }

    pub fn resolve_stream(&self, stream: &Stream) -> ResolvedStream {
        resolve_stream(stream, &self.store)
    }
}
