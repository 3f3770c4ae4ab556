//! Shared data model for parsed definition files.
//!
//! These types are produced by the tree builder and consumed by the
//! interchange emitter. The structure is a pure tree: a [`Definition`]
//! owns its [`Block`]s, a block owns its top-level [`Variable`]s, and a
//! composite variable owns its children. Nothing is shared or weakly
//! referenced.

use std::fmt;

// ──────────────────────────────────────────────
// Attribute values
// ──────────────────────────────────────────────

/// A typed attribute value. DFN attribute values arrive as raw strings;
/// the flat parser types them so the interchange format can carry
/// native booleans and numbers instead of their spellings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

// ──────────────────────────────────────────────
// Ordered attribute map
// ──────────────────────────────────────────────

/// An insertion-ordered attribute map. Re-inserting an existing key
/// replaces its value in place, keeping the original position, which
/// matches how repeated attribute lines overwrite each other in the
/// source format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(Vec<(String, Value)>);

impl Attrs {
    pub fn new() -> Self {
        Attrs(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Attrs {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut attrs = Attrs::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

// ──────────────────────────────────────────────
// Type tags
// ──────────────────────────────────────────────

/// A variable's type tag. Scalar kinds carry no children; composite
/// kinds own an ordered child sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Keyword,
    Integer,
    Real,
    Str,
    Path,
    Record,
    Union,
    List,
}

impl TypeTag {
    /// Map a source spelling to a tag. Accepts both the legacy DFN
    /// spellings (`keystring`, `recarray`, `filename`) and the
    /// canonical emitted ones (`union`, `list`, `path`). The two-token
    /// `double precision` spelling is handled by the flat parser.
    pub fn from_source(s: &str) -> Option<TypeTag> {
        match s {
            "keyword" => Some(TypeTag::Keyword),
            "integer" => Some(TypeTag::Integer),
            "real" => Some(TypeTag::Real),
            "string" => Some(TypeTag::Str),
            "filename" | "path" => Some(TypeTag::Path),
            "record" => Some(TypeTag::Record),
            "keystring" | "union" => Some(TypeTag::Union),
            "recarray" | "list" => Some(TypeTag::List),
            _ => None,
        }
    }

    /// Canonical spelling used in emitted output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Keyword => "keyword",
            TypeTag::Integer => "integer",
            TypeTag::Real => "real",
            TypeTag::Str => "string",
            TypeTag::Path => "path",
            TypeTag::Record => "record",
            TypeTag::Union => "union",
            TypeTag::List => "list",
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, TypeTag::Record | TypeTag::Union | TypeTag::List)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Tree nodes
// ──────────────────────────────────────────────

/// One parsed definition file. Immutable once built; discarded after
/// conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Component name, taken from the input file stem.
    pub name: String,
    /// Top-level metadata: attribute lines before the first block.
    /// Keys must not collide with block names.
    pub meta: Attrs,
    /// Blocks in declaration order. Names unique within a definition.
    pub blocks: Vec<Block>,
}

/// A named grouping of variables under one block header.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    /// Marks a block repeatable within a simulation (e.g. per stress
    /// period).
    pub transient: bool,
    /// Top-level variables in declaration order. Names unique within
    /// the block.
    pub vars: Vec<Variable>,
}

/// A single input field, scalar or composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub tag: TypeTag,
    /// Arbitrary attributes in source order. Unrecognized keys pass
    /// through verbatim for forward compatibility.
    pub attrs: Attrs,
    /// Children in children-list order. Empty for scalar variables.
    pub children: Vec<Variable>,
}

impl Variable {
    /// A variable with no attributes and no children; handy for
    /// building definitions programmatically.
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Variable {
            name: name.into(),
            tag,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }
}
