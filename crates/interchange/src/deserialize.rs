//! Read emitted interchange TOML back into a [`Definition`].
//!
//! The reader walks the document in order (table order is preserved by
//! the parser), treating sub-tables as blocks/variables and scalar
//! entries as attributes, so `from_str(to_string(d))` reconstructs a
//! value-equal definition.

use std::fmt;

use dfn_core::{Attrs, Block, Definition, TypeTag, Value, Variable};
use toml::value::Table;
use toml::Value as Toml;

/// Errors while reading interchange TOML.
#[derive(Debug)]
pub enum InterchangeError {
    /// The text is not valid TOML.
    Toml(toml::de::Error),
    /// A variable table has no `type` key.
    MissingType { path: String },
    /// A `type` key naming an unrecognized tag, or not a string.
    UnknownType { path: String, found: String },
    /// A value kind the model does not carry (datetime, array),
    /// or a scalar where a table is required.
    UnsupportedValue { path: String },
    /// The document's `name` disagrees with the expected name.
    NameMismatch { expected: String, found: String },
}

impl fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterchangeError::Toml(e) => write!(f, "invalid TOML: {}", e),
            InterchangeError::MissingType { path } => {
                write!(f, "variable '{}' has no type key", path)
            }
            InterchangeError::UnknownType { path, found } => {
                write!(f, "variable '{}' has unrecognized type '{}'", path, found)
            }
            InterchangeError::UnsupportedValue { path } => {
                write!(f, "unsupported value at '{}'", path)
            }
            InterchangeError::NameMismatch { expected, found } => {
                write!(f, "name mismatch: expected '{}', found '{}'", expected, found)
            }
        }
    }
}

impl std::error::Error for InterchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InterchangeError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

/// Read interchange TOML text into a definition. When `name` is given,
/// a differing `name` key in the document is an error (files must match
/// their stems).
pub fn from_str(text: &str, name: Option<&str>) -> Result<Definition, InterchangeError> {
    let table: Table = text.parse().map_err(InterchangeError::Toml)?;

    let mut def_name = name.unwrap_or_default().to_owned();
    let mut meta = Attrs::new();
    let mut blocks = Vec::new();

    for (key, value) in table {
        match value {
            Toml::Table(t) => blocks.push(read_block(&key, t)?),
            Toml::String(s) if key == "name" => {
                if let Some(expected) = name {
                    if expected != s {
                        return Err(InterchangeError::NameMismatch {
                            expected: expected.to_owned(),
                            found: s,
                        });
                    }
                }
                def_name = s;
            }
            // written by the emitter, not part of the model
            _ if key == "schema_version" => {}
            other => {
                let value = plain_value(&key, other)?;
                meta.insert(key, value);
            }
        }
    }

    Ok(Definition {
        name: def_name,
        meta,
        blocks,
    })
}

fn read_block(name: &str, table: Table) -> Result<Block, InterchangeError> {
    let mut transient = false;
    let mut vars = Vec::new();
    for (key, value) in table {
        let path = format!("{}.{}", name, key);
        match value {
            Toml::Table(t) => vars.push(read_var(&path, key, t)?),
            Toml::Boolean(b) if key == "transient" => transient = b,
            _ => return Err(InterchangeError::UnsupportedValue { path }),
        }
    }
    Ok(Block {
        name: name.to_owned(),
        transient,
        vars,
    })
}

fn read_var(path: &str, name: String, table: Table) -> Result<Variable, InterchangeError> {
    let mut tag: Option<TypeTag> = None;
    let mut attrs = Attrs::new();
    let mut children = Vec::new();
    for (key, value) in table {
        let child_path = format!("{}.{}", path, key);
        match value {
            Toml::Table(t) => children.push(read_var(&child_path, key, t)?),
            Toml::String(s) if key == "type" => {
                tag = Some(TypeTag::from_source(&s).ok_or_else(|| {
                    InterchangeError::UnknownType {
                        path: path.to_owned(),
                        found: s.clone(),
                    }
                })?);
            }
            _ if key == "type" => {
                return Err(InterchangeError::UnknownType {
                    path: path.to_owned(),
                    found: value.type_str().to_owned(),
                })
            }
            other => {
                let value = plain_value(&child_path, other)?;
                attrs.insert(key, value);
            }
        }
    }
    let tag = tag.ok_or_else(|| InterchangeError::MissingType {
        path: path.to_owned(),
    })?;
    Ok(Variable {
        name,
        tag,
        attrs,
        children,
    })
}

fn plain_value(path: &str, value: Toml) -> Result<Value, InterchangeError> {
    match value {
        Toml::String(s) => Ok(Value::Str(s)),
        Toml::Integer(n) => Ok(Value::Int(n)),
        Toml::Float(x) => Ok(Value::Real(x)),
        Toml::Boolean(b) => Ok(Value::Bool(b)),
        _ => Err(InterchangeError::UnsupportedValue {
            path: path.to_owned(),
        }),
    }
}
