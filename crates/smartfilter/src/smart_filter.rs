//! # Smart Filters and Streams
//!
//! A smart filter is a named, saved encoded filter. Dashboard and side-nav
//! streams point at one either by id or by carrying a copy of its encoded
//! string:
//!
//! - **By id**: deleting the smart filter leaves the stream dangling; it
//!   resolves to [`ResolvedStream::Invalid`].
//! - **By copy**: the stream keeps working after the smart filter is gone.

use crate::codec::{self, DecodedFilter};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartFilter {
    pub id: i64,
    pub name: String,
    pub encoded_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamKind {
    Dashboard,
    SideNav,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamFilterSource {
    SmartFilterId(i64),
    Encoded(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: i64,
    pub name: String,
    pub kind: StreamKind,
    pub source: StreamFilterSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStream {
    /// The stream has a usable filter. It may still be partial; check
    /// [`DecodedFilter::is_partial`].
    Provided(DecodedFilter),
    Invalid { reason: String },
}

impl ResolvedStream {
    pub fn is_provided(&self) -> bool {
        matches!(self, ResolvedStream::Provided(_))
    }
}

/// Persistence for smart filters. CRUD is owned by the storage layer; this
/// crate only needs the shape.
pub trait SmartFilterStore {
    /// Save a new smart filter. The encoded filter must decode.
    fn create(&mut self, name: &str, encoded_filter: &str) -> Result<SmartFilter>;
    fn get(&self, id: i64) -> Option<&SmartFilter>;
    fn list(&self) -> Vec<&SmartFilter>;
    fn delete(&mut self, id: i64) -> Result<SmartFilter>;
}

#[derive(Debug, Default)]
pub struct InMemorySmartFilterStore {
    filters: Vec<SmartFilter>,
    next_id: i64,
}

impl InMemorySmartFilterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SmartFilterStore for InMemorySmartFilterStore {
    fn create(&mut self, name: &str, encoded_filter: &str) -> Result<SmartFilter> {
        let name = name.trim();
        if self.filters.iter().any(|f| f.name.eq_ignore_ascii_case(name)) {
            return Err(Error::DuplicateSmartFilter(name.to_string()));
        }
        codec::decode(encoded_filter)?;

        self.next_id += 1;
        let filter = SmartFilter {
            id: self.next_id,
            name: name.to_string(),
            encoded_filter: encoded_filter.to_string(),
        };
        debug!(id = filter.id, name = %filter.name, "created smart filter");
        self.filters.push(filter.clone());
        Ok(filter)
    }

    fn get(&self, id: i64) -> Option<&SmartFilter> {
        self.filters.iter().find(|f| f.id == id)
    }

    fn list(&self) -> Vec<&SmartFilter> {
        let mut filters: Vec<&SmartFilter> = self.filters.iter().collect();
        filters.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.id.cmp(&b.id)));
        filters
    }

    fn delete(&mut self, id: i64) -> Result<SmartFilter> {
        let index = self
            .filters
            .iter()
            .position(|f| f.id == id)
            .ok_or(Error::SmartFilterNotFound(id))?;
        Ok(self.filters.remove(index))
    }
}

/// Work out which filter a stream shows.
pub fn resolve_stream<S: SmartFilterStore + ?Sized>(stream: &Stream, store: &S) -> ResolvedStream {
    let encoded = match &stream.source {
        StreamFilterSource::Encoded(encoded) => encoded.as_str(),
        StreamFilterSource::SmartFilterId(id) => match store.get(*id) {
            Some(filter) => filter.encoded_filter.as_str(),
            None => {
                return ResolvedStream::Invalid {
                    reason: format!("smart filter {} no longer exists", id),
                }
            }
        },
    };

    match codec::decode(encoded) {
        Ok(decoded) => ResolvedStream::Provided(decoded),
        Err(err) => ResolvedStream::Invalid {
            reason: err.to_string(),
        },
    }
}
