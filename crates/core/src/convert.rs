//! One-call conversion pipeline: definition-file text in, nested
//! [`Definition`] out. Each call is stateless; files may be converted
//! independently and in parallel.

use std::fs;
use std::path::Path;

use crate::ast::Definition;
use crate::error::DfnError;
use crate::parser::parse_flat;
use crate::resolve::build_tree;

/// Parse one definition file's text. `file` labels errors; `name`
/// becomes the definition name.
pub fn parse(src: &str, file: &str, name: &str) -> Result<Definition, DfnError> {
    let flat = parse_flat(src, file)?;
    build_tree(flat, file, name)
}

/// Parse a definition file from disk. The definition takes its name
/// from the file stem.
pub fn parse_file(path: &Path) -> Result<Definition, DfnError> {
    let file = path.display().to_string();
    let src = fs::read_to_string(path)
        .map_err(|e| DfnError::io(&file, format!("cannot read file: {}", e)))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    parse(&src, &file, name)
}
