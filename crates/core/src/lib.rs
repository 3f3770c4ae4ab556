//! dfn-core: definition-file (DFN) parser core library.
//!
//! Provides the pipeline from legacy line-oriented DFN text to a nested
//! [`Definition`] tree:
//!
//! - [`lexer`] -- classifies raw lines (block starts, attributes, comments)
//! - [`parser`] -- assembles classified lines into flat per-block records
//! - [`resolve`] -- regroups flat records into the nested tree, resolving
//!   composite children references
//! - [`convert`] -- one-call entry points over the whole pipeline
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`parse()`] / [`parse_file()`] -- run the full pipeline
//! - [`Definition`], [`Block`], [`Variable`] -- the parsed tree
//! - [`TypeTag`], [`Value`], [`Attrs`] -- node payload types
//! - [`DfnError`] -- parse/resolve error type

/// Interchange schema version written into emitted output (e.g. "2").
pub const DFN_SCHEMA_VERSION: &str = "2";

pub mod ast;
pub mod convert;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolve;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Attrs, Block, Definition, TypeTag, Value, Variable};
pub use error::{DfnError, ErrorKind};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use convert::{parse, parse_file};
pub use parser::parse_flat;
pub use resolve::build_tree;
