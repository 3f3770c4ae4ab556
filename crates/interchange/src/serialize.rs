//! Emit a [`Definition`] as nested-table TOML.
//!
//! Each block becomes a top-level table and each variable a sub-table
//! of its block or parent variable, so nesting depth shows in the
//! table header rather than indentation. Attribute order within a node
//! follows the definition; block and variable order follows the tree
//! builder (declaration order at top level, children-list order below).

use dfn_core::{Attrs, Block, Definition, Value, Variable, DFN_SCHEMA_VERSION};
use toml::value::Table;
use toml::Value as Toml;

/// Build the interchange table for a definition.
pub fn to_table(def: &Definition) -> Table {
    let mut root = Table::new();
    root.insert("name".to_owned(), Toml::String(def.name.clone()));
    root.insert(
        "schema_version".to_owned(),
        Toml::String(DFN_SCHEMA_VERSION.to_owned()),
    );
    insert_attrs(&mut root, &def.meta);
    for block in &def.blocks {
        root.insert(block.name.clone(), Toml::Table(block_table(block)));
    }
    root
}

/// Serialize a definition to TOML text.
pub fn to_string(def: &Definition) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&to_table(def))
}

fn block_table(block: &Block) -> Table {
    let mut t = Table::new();
    if block.transient {
        t.insert("transient".to_owned(), Toml::Boolean(true));
    }
    for var in &block.vars {
        t.insert(var.name.clone(), Toml::Table(var_table(var)));
    }
    t
}

fn var_table(var: &Variable) -> Table {
    let mut t = Table::new();
    t.insert("type".to_owned(), Toml::String(var.tag.to_string()));
    insert_attrs(&mut t, &var.attrs);
    for child in &var.children {
        t.insert(child.name.clone(), Toml::Table(var_table(child)));
    }
    t
}

fn insert_attrs(t: &mut Table, attrs: &Attrs) {
    for (key, value) in attrs.iter() {
        t.insert(key.to_owned(), toml_value(value));
    }
}

fn toml_value(v: &Value) -> Toml {
    match v {
        Value::Bool(b) => Toml::Boolean(*b),
        Value::Int(n) => Toml::Integer(*n),
        Value::Real(x) => Toml::Float(*x),
        Value::Str(s) => Toml::String(s.clone()),
    }
}
