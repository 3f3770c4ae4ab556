//! Tree builder: regroups flat per-block records into the nested
//! [`Definition`], resolving composite children references.
//!
//! For each block the flat variables are indexed by name, then every
//! composite variable's children list is resolved in listed order --
//! NOT declaration order, since scalar fields are declared in
//! documentation order but consumed in record/union positional order.
//! Each resolved child moves from block top level into its parent;
//! variables never referenced stay at top level.

use std::collections::{HashMap, HashSet};

use crate::ast::{Block, Definition, Variable};
use crate::error::DfnError;
use crate::parser::{FlatBlock, FlatDfn, FlatVar};

/// Root-table keys written by the emitter. Metadata keys and block
/// names must stay clear of them or the emitted document is ambiguous
/// on read-back.
const RESERVED_ROOT_KEYS: [&str; 2] = ["name", "schema_version"];

/// Build the nested definition from flat parse output.
pub fn build_tree(flat: FlatDfn, file: &str, name: &str) -> Result<Definition, DfnError> {
    let FlatDfn { meta, blocks } = flat;

    for key in RESERVED_ROOT_KEYS {
        if meta.contains_key(key) {
            return Err(DfnError::duplicate_name(
                file,
                0,
                format!("metadata key '{}' collides with a reserved header key", key),
            ));
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for block in &blocks {
        if RESERVED_ROOT_KEYS.contains(&block.name.as_str()) {
            return Err(DfnError::duplicate_name(
                file,
                block.line,
                format!("block '{}' collides with a reserved header key", block.name),
            ));
        }
        if !seen.insert(block.name.as_str()) {
            return Err(DfnError::duplicate_name(
                file,
                block.line,
                format!("duplicate block '{}'", block.name),
            ));
        }
        if meta.contains_key(&block.name) {
            return Err(DfnError::duplicate_name(
                file,
                block.line,
                format!(
                    "metadata key '{}' collides with a block of the same name",
                    block.name
                ),
            ));
        }
    }

    let mut built = Vec::with_capacity(blocks.len());
    for block in blocks {
        built.push(build_block(block, file)?);
    }

    Ok(Definition {
        name: name.to_owned(),
        meta,
        blocks: built,
    })
}

fn build_block(block: FlatBlock, file: &str) -> Result<Block, DfnError> {
    let FlatBlock {
        name,
        transient,
        vars,
        line,
    } = block;

    let mut lookup: HashMap<String, usize> = HashMap::with_capacity(vars.len());
    for (i, var) in vars.iter().enumerate() {
        if lookup.insert(var.name.clone(), i).is_some() {
            return Err(DfnError::duplicate_name(
                file,
                var.line,
                format!("duplicate variable '{}' in block '{}'", var.name, name),
            ));
        }
    }

    let referenced: HashSet<String> = vars
        .iter()
        .flat_map(|v| v.child_refs.iter().cloned())
        .collect();

    let mut slots: Vec<Option<FlatVar>> = vars.into_iter().map(Some).collect();
    let mut top = Vec::new();
    let mut ancestors = Vec::new();
    for i in 0..slots.len() {
        let skip = match &slots[i] {
            Some(v) => referenced.contains(&v.name),
            None => true,
        };
        if skip {
            continue;
        }
        // top-level slots are never claimed as children, so this take
        // always succeeds
        let Some(var) = slots[i].take() else { continue };
        top.push(build_var(var, &mut slots, &lookup, &mut ancestors, file, &name)?);
    }

    // anything left over was referenced but never reached from the top
    // level, which only happens inside a reference cycle
    if let Some(stray) = slots.iter().flatten().next() {
        return Err(DfnError::cyclic_reference(
            file,
            stray.line,
            format!(
                "variable '{}' in block '{}' is part of a reference cycle",
                stray.name, name
            ),
        ));
    }

    if transient && top.iter().any(|v| v.name == "transient") {
        return Err(DfnError::duplicate_name(
            file,
            line,
            format!(
                "transient block '{}' declares a variable named 'transient'",
                name
            ),
        ));
    }

    Ok(Block {
        name,
        transient,
        vars: top,
    })
}

/// Resolve one flat variable into a tree node, claiming its children
/// from the block's slots in listed order.
fn build_var(
    flat: FlatVar,
    slots: &mut [Option<FlatVar>],
    lookup: &HashMap<String, usize>,
    ancestors: &mut Vec<String>,
    file: &str,
    block: &str,
) -> Result<Variable, DfnError> {
    let FlatVar {
        name,
        tag,
        child_refs,
        attrs,
        line,
    } = flat;

    let mut children = Vec::with_capacity(child_refs.len());
    if !child_refs.is_empty() {
        ancestors.push(name.clone());
        for child_name in &child_refs {
            if ancestors.iter().any(|a| a == child_name) {
                return Err(DfnError::cyclic_reference(
                    file,
                    line,
                    format!(
                        "resolving '{}' would reparent '{}' into its own descendants in block '{}'",
                        name, child_name, block
                    ),
                ));
            }
            let idx = *lookup.get(child_name).ok_or_else(|| {
                DfnError::unresolved_child(
                    file,
                    line,
                    format!(
                        "'{}' references unknown child '{}' in block '{}'",
                        name, child_name, block
                    ),
                )
            })?;
            let child = slots[idx].take().ok_or_else(|| {
                DfnError::unresolved_child(
                    file,
                    line,
                    format!(
                        "child '{}' is already attached to another variable in block '{}'",
                        child_name, block
                    ),
                )
            })?;
            children.push(build_var(child, slots, lookup, ancestors, file, block)?);
        }
        ancestors.pop();
    }

    // attribute keys and child names share the emitted table namespace,
    // where `type` is reserved for the tag
    for child in &children {
        if child.name == "type" {
            return Err(DfnError::duplicate_name(
                file,
                line,
                format!("child of '{}' is named 'type', which is reserved", name),
            ));
        }
        if attrs.contains_key(&child.name) {
            return Err(DfnError::duplicate_name(
                file,
                line,
                format!(
                    "attribute '{}' on '{}' collides with its child of the same name",
                    child.name, name
                ),
            ));
        }
    }

    Ok(Variable {
        name,
        tag,
        attrs,
        children,
    })
}
