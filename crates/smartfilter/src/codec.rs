//! # Smart Filter Codec
//!
//! Turns a [`FilterV2`] into one opaque string and back. Smart filters,
//! dashboard streams and side-nav shortcuts store this string.
//!
//! ## Format
//!
//! ```text
//! sf2~<base64url(json)>
//! ```
//!
//! The payload is compact JSON with single-letter keys and numeric ids,
//! encoded as unpadded base64url. `~` is the internal separator: it is not
//! in the base64url alphabet, so no field value can ever produce it, and
//! every character of the result is URL-unreserved. A string without the
//! separator is flagged by [`is_errored`] before any decoding is attempted.
//!
//! ## Tolerance
//!
//! Field and comparison ids are decoded as raw integers. A statement whose
//! id the running catalog does not know is dropped and reported in
//! [`DecodedFilter::dropped`]; the rest of the tree survives. A child group
//! left with no statements by those drops is removed from its parent and
//! listed in [`DecodedFilter::removed_groups`]: an empty group matches
//! everything, and as an `or` child it would widen the whole filter. An
//! unknown sort field falls back to the default ordering.

use crate::catalog::{comparison_from_id, field_from_id, FilterComparison, FilterField};
use crate::error::{DecodeError, Result};
use crate::model::{FilterCombination, FilterGroup, FilterStatement, FilterV2, SortField, SortOptions};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const VERSION_PREFIX: &str = "sf2";
pub const SEPARATOR: char = '~';
pub const DEFAULT_MAX_ENCODED_LEN: usize = 64 * 1024;

#[derive(Serialize, Deserialize)]
struct WireFilter {
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "s", default, skip_serializing_if = "Vec::is_empty")]
    statements: Vec<WireStatement>,
    #[serde(rename = "c", default = "default_combination")]
    combination: i64,
    #[serde(rename = "o", default, skip_serializing_if = "Option::is_none")]
    sort: Option<WireSort>,
    #[serde(rename = "l", default, skip_serializing_if = "is_zero")]
    limit_to: u32,
    #[serde(rename = "g", default, skip_serializing_if = "Option::is_none")]
    group: Option<WireGroup>,
}

#[derive(Serialize, Deserialize)]
struct WireStatement {
    f: i64,
    c: i64,
    #[serde(default)]
    v: String,
}

#[derive(Serialize, Deserialize, Default)]
struct WireGroup {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    s: Vec<WireStatement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    a: Vec<WireGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    o: Vec<WireGroup>,
}

#[derive(Serialize, Deserialize)]
struct WireSort {
    f: i64,
    a: bool,
}

fn default_combination() -> i64 {
    u8::from(FilterCombination::default()).into()
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Why a statement was left out of a decoded filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    UnknownField,
    UnknownComparison,
}

/// A statement the running catalog could not represent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedStatement {
    /// Position in the encoded tree, e.g. `group.and[1].statements[0]`.
    pub location: String,
    pub field_id: i64,
    pub comparison_id: i64,
    pub value: String,
    pub reason: DropReason,
}

/// The result of decoding: the filter plus anything that was lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFilter {
    pub filter: FilterV2,
    pub dropped: Vec<DroppedStatement>,
    /// Locations of child groups removed because every statement under
    /// them was dropped, e.g. `group.or[0]`.
    pub removed_groups: Vec<String>,
    /// Raw id of a sort field that was ignored.
    pub ignored_sort_field: Option<i64>,
}

impl DecodedFilter {
    /// True when part of the encoded filter could not be represented, so the
    /// filter may match differently than when it was saved.
    pub fn is_partial(&self) -> bool {
        !self.dropped.is_empty() || !self.removed_groups.is_empty() || self.ignored_sort_field.is_some()
    }
}

/// Encode a filter into its portable string form.
pub fn encode(filter: &FilterV2) -> Result<String> {
    let wire = WireFilter {
        name: filter.name.clone(),
        statements: filter.statements.iter().map(wire_statement).collect(),
        combination: u8::from(filter.combination).into(),
        sort: filter.sort_options.map(|sort| WireSort {
            f: sort.sort_field.id().into(),
            a: sort.is_ascending,
        }),
        limit_to: filter.limit_to,
        group: filter.group.as_ref().map(wire_group),
    };
    let json = serde_json::to_vec(&wire)?;
    Ok(format!(
        "{}{}{}",
        VERSION_PREFIX,
        SEPARATOR,
        URL_SAFE_NO_PAD.encode(json)
    ))
}

fn wire_statement(statement: &FilterStatement) -> WireStatement {
    WireStatement {
        f: statement.field.id().into(),
        c: statement.comparison.id().into(),
        v: statement.value.clone(),
    }
}

fn wire_group(group: &FilterGroup) -> WireGroup {
    WireGroup {
        s: group.statements.iter().map(wire_statement).collect(),
        a: group.and.iter().map(wire_group).collect(),
        o: group.or.iter().map(wire_group).collect(),
    }
}

/// Cheap health check for stored strings.
///
/// Flags non-empty strings that lack the internal separator or carry an
/// unknown version prefix. An empty string is a valid, empty filter.
pub fn is_errored(encoded: &str) -> bool {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return false;
    }
    match encoded.split_once(SEPARATOR) {
        Some((version, _)) => version != VERSION_PREFIX,
        None => true,
    }
}

/// Decode with the default length bound.
pub fn decode(encoded: &str) -> std::result::Result<DecodedFilter, DecodeError> {
    decode_with_limit(encoded, DEFAULT_MAX_ENCODED_LEN)
}

/// Decode a string produced by [`encode`], rejecting inputs over `max_len`
/// bytes. Blank input decodes to the default filter.
pub fn decode_with_limit(
    encoded: &str,
    max_len: usize,
) -> std::result::Result<DecodedFilter, DecodeError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(DecodedFilter::default());
    }
    if encoded.len() > max_len {
        return Err(DecodeError::TooLong {
            len: encoded.len(),
            max: max_len,
        });
    }

    let (version, payload) = encoded
        .split_once(SEPARATOR)
        .ok_or(DecodeError::MissingSeparator(SEPARATOR))?;
    if version != VERSION_PREFIX {
        return Err(DecodeError::UnsupportedVersion(version.to_string()));
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let wire: WireFilter = serde_json::from_slice(&bytes)?;
    let combination = u8::try_from(wire.combination)
        .ok()
        .and_then(|id| FilterCombination::try_from(id).ok())
        .ok_or(DecodeError::Combination(wire.combination))?;

    let mut losses = Losses::default();
    let statements = decode_statements(wire.statements, "statements", &mut losses);
    let group = wire
        .group
        .and_then(|group| decode_group(group, "group", &mut losses));

    let mut ignored_sort_field = None;
    let sort_options = match wire.sort {
        Some(sort) => match u8::try_from(sort.f).ok().and_then(|id| SortField::try_from(id).ok()) {
            Some(sort_field) => Some(SortOptions {
                sort_field,
                is_ascending: sort.a,
            }),
            None => {
                warn!(sort_field = sort.f, "ignoring unknown sort field in encoded filter");
                ignored_sort_field = Some(sort.f);
                None
            }
        },
        None => None,
    };

    Ok(DecodedFilter {
        filter: FilterV2 {
            name: wire.name,
            statements,
            combination,
            sort_options,
            limit_to: wire.limit_to,
            group,
        },
        dropped: losses.dropped,
        removed_groups: losses.removed_groups,
        ignored_sort_field,
    })
}

#[derive(Default)]
struct Losses {
    dropped: Vec<DroppedStatement>,
    removed_groups: Vec<String>,
}

/// `None` when drops left the group without any statement in its subtree.
/// A group that was empty on the wire is kept as is.
fn decode_group(group: WireGroup, path: &str, losses: &mut Losses) -> Option<FilterGroup> {
    let before = losses.dropped.len();
    let statements = decode_statements(group.s, &format!("{}.statements", path), losses);
    let and = group
        .a
        .into_iter()
        .enumerate()
        .filter_map(|(i, child)| decode_group(child, &format!("{}.and[{}]", path, i), losses))
        .collect();
    let or = group
        .o
        .into_iter()
        .enumerate()
        .filter_map(|(i, child)| decode_group(child, &format!("{}.or[{}]", path, i), losses))
        .collect();
    let group = FilterGroup { statements, and, or };

    if losses.dropped.len() > before && group.statement_count() == 0 {
        warn!(location = %path, "removing group emptied by dropped statements");
        losses.removed_groups.push(path.to_string());
        return None;
    }
    Some(group)
}

fn decode_statements(
    statements: Vec<WireStatement>,
    path: &str,
    losses: &mut Losses,
) -> Vec<FilterStatement> {
    let mut decoded = Vec::with_capacity(statements.len());
    for (i, statement) in statements.into_iter().enumerate() {
        let location = format!("{}[{}]", path, i);
        match resolve_statement(&statement) {
            Ok((field, comparison)) => decoded.push(FilterStatement {
                field,
                comparison,
                value: statement.v,
            }),
            Err(reason) => {
                warn!(
                    %location,
                    field_id = statement.f,
                    comparison_id = statement.c,
                    ?reason,
                    "dropping statement the field catalog cannot represent"
                );
                losses.dropped.push(DroppedStatement {
                    location,
                    field_id: statement.f,
                    comparison_id: statement.c,
                    value: statement.v,
                    reason,
                });
            }
        }
    }
    decoded
}

fn resolve_statement(
    statement: &WireStatement,
) -> std::result::Result<(FilterField, FilterComparison), DropReason> {
    let field = i32::try_from(statement.f)
        .ok()
        .and_then(field_from_id)
        .ok_or(DropReason::UnknownField)?;
    let comparison = i32::try_from(statement.c)
        .ok()
        .and_then(comparison_from_id)
        .ok_or(DropReason::UnknownComparison)?;
    Ok((field, comparison))
}
