use crate::catalog::{FilterComparison, FilterField};
use std::fmt;
use thiserror::Error;

/// Why an encoded filter string could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Encoded filter is missing its '{0}' separator")]
    MissingSeparator(char),

    #[error("Unsupported encoded filter version: {0:?}")]
    UnsupportedVersion(String),

    #[error("Encoded filter is {len} bytes, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Encoded filter payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Encoded filter payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Unknown filter combination id {0}")]
    Combination(i64),
}

/// Which structural bound a filter exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralLimit {
    Depth,
    Statements,
    Groups,
}

impl fmt::Display for StructuralLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StructuralLimit::Depth => "maximum nesting depth",
            StructuralLimit::Statements => "maximum statement count",
            StructuralLimit::Groups => "maximum group count",
        })
    }
}

/// Why a filter could not be compiled.
///
/// Every variant names the single statement (by `location`) or the
/// structural bound that caused the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Field {field} does not support operator {comparison} (at {location})")]
    IllegalOperatorForField {
        field: FilterField,
        comparison: FilterComparison,
        location: String,
    },

    #[error("Field {field} cannot use value {value:?}: {reason} (at {location})")]
    ValueParseError {
        field: FilterField,
        comparison: FilterComparison,
        value: String,
        reason: String,
        location: String,
    },

    #[error("Unknown field id {id} (at {location})")]
    UnknownField { id: i64, location: String },

    #[error("Unknown operator id {id} (at {location})")]
    UnknownComparison { id: i64, location: String },

    #[error("Filter exceeds the {limit} of {max} (found {actual})")]
    StructuralLimitExceeded {
        limit: StructuralLimit,
        max: usize,
        actual: usize,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Smart filter not found: {0}")]
    SmartFilterNotFound(i64),

    #[error("A smart filter named {0:?} already exists")]
    DuplicateSmartFilter(String),

    #[error("Execution error: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, Error>;
