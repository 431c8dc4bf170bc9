//! # Smartfilter
//!
//! Smartfilter is the **metadata filter engine** of a library catalog. A user
//! builds a filter in a UI (a tree of "field, operator, value" rows), saves
//! it as a portable string, and later gets back a paged, sorted list of the
//! series that match.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade: decode, encode, validate, query             │
//! │  - Owns the SmartFilterStore, returns DTOs                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Codec (codec.rs)        Compiler (compiler/)               │
//! │  - string <-> FilterV2   - FilterV2 -> CompiledFilter       │
//! │  - drops unknown ids     - legality, literals, bounds       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Execution (execute.rs)                                     │
//! │  - ExecutionAdapter trait, InMemoryCatalog reference        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`catalog`] is the source of truth for which fields exist, what kind of
//! value each holds and which operators apply to it. Everything above reads
//! it; nothing duplicates it.
//!
//! ## No I/O in the core
//!
//! Nothing in this crate prints or exits. Configuration files are read only
//! when [`config::EngineConfig::load`] is called. Logging goes through the
//! `tracing` facade and is silent unless the host installs a subscriber.
//!
//! ## Example
//!
//! ```
//! use smartfilter::catalog::{FilterComparison, FilterField};
//! use smartfilter::model::{FilterStatement, FilterV2};
//! use smartfilter::{codec, Compiler};
//!
//! let filter = FilterV2::named("Scary").with_statement(FilterStatement::new(
//!     FilterField::Genres,
//!     FilterComparison::Contains,
//!     "Horror",
//! ));
//! let encoded = codec::encode(&filter).unwrap();
//! let decoded = codec::decode(&encoded).unwrap();
//! assert_eq!(decoded.filter, filter);
//!
//! let compiled = Compiler::default().compile(&decoded.filter).unwrap();
//! assert!(!compiled.predicate.is_trivial());
//! ```

pub mod api;
pub mod catalog;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod entity;
pub mod error;
pub mod execute;
pub mod model;
pub mod smart_filter;

pub use api::FilterApi;
pub use compiler::{CompiledFilter, Compiler};
pub use error::{Error, Result};
