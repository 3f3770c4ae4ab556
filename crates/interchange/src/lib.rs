//! dfn-interchange: TOML interchange emission and reading for parsed
//! definition files.
//!
//! The emitter ([`to_string`]/[`to_table`]) turns a
//! [`dfn_core::Definition`] into nested-table TOML text; the reader
//! ([`from_str`]) turns compatible TOML text back into a value-equal
//! definition. Emission is deterministic, so equal definitions always
//! produce identical text.

pub mod deserialize;
pub mod serialize;

pub use deserialize::{from_str, InterchangeError};
pub use serialize::{to_string, to_table};
