//! Flat parser: assembles classified lines into ordered per-block
//! variable records.
//!
//! A variable begins at an attribute line with key `name`; every
//! attribute until the next `name`, block start, or end of input
//! attaches to it. Attribute lines before the first block become
//! definition-level metadata. Attribute values are typed here (see
//! [`crate::ast::Value`]); children references on composite type
//! declarations are kept on the flat record for the tree builder.

use crate::ast::{Attrs, TypeTag, Value};
use crate::error::DfnError;
use crate::lexer::{LineKind, Spanned, Tokenizer};

/// A variable as declared in the source, before tree building.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatVar {
    pub name: String,
    pub tag: TypeTag,
    /// Ordered child names from a composite type declaration. Consumed
    /// (and thereby deleted) by the tree builder.
    pub child_refs: Vec<String>,
    pub attrs: Attrs,
    /// Line of the `name` attribute that opened this variable.
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatBlock {
    pub name: String,
    pub transient: bool,
    pub vars: Vec<FlatVar>,
    /// Line of the block-start line.
    pub line: u32,
}

/// Output of the flat parsing pass: metadata plus per-block variable
/// records, all in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDfn {
    pub meta: Attrs,
    pub blocks: Vec<FlatBlock>,
}

/// A variable mid-assembly: raw attribute strings in source order.
struct RawVar {
    name: String,
    line: u32,
    attrs: Vec<(String, String, u32)>,
}

impl RawVar {
    fn push(&mut self, key: String, value: String, line: u32) {
        match self.attrs.iter_mut().find(|(k, _, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value, line)),
        }
    }
}

/// Parse one definition file's text into flat per-block records.
pub fn parse_flat(src: &str, file: &str) -> Result<FlatDfn, DfnError> {
    let mut meta = Attrs::new();
    let mut blocks: Vec<FlatBlock> = Vec::new();
    let mut pending: Option<RawVar> = None;

    for item in Tokenizer::new(src, file) {
        let Spanned { kind, line } = item?;
        match kind {
            LineKind::Comment | LineKind::Blank => {}
            LineKind::BlockStart { name, transient } => {
                close_var(&mut pending, &mut blocks, file)?;
                blocks.push(FlatBlock {
                    name,
                    transient,
                    vars: Vec::new(),
                    line,
                });
            }
            LineKind::Attr { key, value } => {
                // legacy spelling kept by some older files
                let key = if key == "default_value" {
                    "default".to_owned()
                } else {
                    key
                };
                let Some(block) = blocks.last() else {
                    meta.insert(key, meta_value(&value));
                    continue;
                };
                if key == "name" {
                    close_var(&mut pending, &mut blocks, file)?;
                    pending = Some(RawVar {
                        name: value,
                        line,
                        attrs: Vec::new(),
                    });
                } else if let Some(var) = pending.as_mut() {
                    var.push(key, value, line);
                } else {
                    return Err(DfnError::malformed_line(
                        file,
                        line,
                        format!(
                            "attribute '{}' in block '{}' before any variable (expected 'name' first)",
                            key, block.name
                        ),
                    ));
                }
            }
        }
    }
    close_var(&mut pending, &mut blocks, file)?;

    Ok(FlatDfn { meta, blocks })
}

fn close_var(
    pending: &mut Option<RawVar>,
    blocks: &mut [FlatBlock],
    file: &str,
) -> Result<(), DfnError> {
    let Some(raw) = pending.take() else {
        return Ok(());
    };
    let var = finish_var(raw, file)?;
    // a pending variable always belongs to the most recent block
    if let Some(block) = blocks.last_mut() {
        block.vars.push(var);
    }
    Ok(())
}

fn finish_var(raw: RawVar, file: &str) -> Result<FlatVar, DfnError> {
    let mut type_decl: Option<(String, u32)> = None;
    let mut raw_attrs = Vec::with_capacity(raw.attrs.len());
    for (key, value, line) in raw.attrs {
        if key == "type" {
            type_decl = Some((value, line));
        } else {
            raw_attrs.push((key, value));
        }
    }

    let (decl, decl_line) = type_decl.ok_or_else(|| {
        DfnError::missing_type(
            file,
            raw.line,
            format!("variable '{}' has no type attribute", raw.name),
        )
    })?;
    let (tag, child_refs) = parse_type_decl(&decl, file, decl_line)?;

    let mut attrs = Attrs::new();
    for (key, value) in raw_attrs {
        let typed = typed_value(&key, &value, tag == TypeTag::Str);
        attrs.insert(key, typed);
    }

    Ok(FlatVar {
        name: raw.name,
        tag,
        child_refs,
        attrs,
        line: raw.line,
    })
}

/// Split a `type` attribute value into a tag and (for composites) the
/// ordered children-reference list.
fn parse_type_decl(
    decl: &str,
    file: &str,
    line: u32,
) -> Result<(TypeTag, Vec<String>), DfnError> {
    let mut tokens = decl.split_whitespace();
    let first = tokens
        .next()
        .ok_or_else(|| DfnError::unknown_type(file, line, "empty type declaration"))?;
    let mut rest: Vec<&str> = tokens.collect();

    // "double precision" is the one two-token scalar spelling
    let tag = if first == "double" && rest.first() == Some(&"precision") {
        rest.remove(0);
        TypeTag::Real
    } else {
        TypeTag::from_source(first).ok_or_else(|| {
            DfnError::unknown_type(file, line, format!("unrecognized type '{}'", first))
        })?
    };

    if tag.is_composite() {
        if rest.is_empty() {
            return Err(DfnError::malformed_line(
                file,
                line,
                format!("composite type '{}' lists no children", tag),
            ));
        }
        Ok((tag, rest.into_iter().map(str::to_owned).collect()))
    } else if rest.is_empty() {
        Ok((tag, Vec::new()))
    } else {
        Err(DfnError::malformed_line(
            file,
            line,
            format!("scalar type '{}' does not take arguments", tag),
        ))
    }
}

/// Type an attribute value: `true`/`false` become booleans; a `default`
/// on a non-string variable is tried as an integer, then a float;
/// descriptions get the legacy cleanup; everything else stays a string.
fn typed_value(key: &str, raw: &str, string_typed: bool) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if key == "default" && !string_typed {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(x) = raw.parse::<f64>() {
            return Value::Real(x);
        }
    }
    if key == "description" {
        return Value::Str(clean_description(raw));
    }
    Value::Str(raw.to_owned())
}

/// Definition-level metadata has no variable type context.
fn meta_value(raw: &str) -> Value {
    typed_value("", raw, false)
}

/// Drop LaTeX backslashes and normalize double-backtick quoting, as
/// the legacy descriptions carry both.
fn clean_description(raw: &str) -> String {
    raw.replace('\\', "").replace("``", "'").replace("''", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(src: &str) -> Result<FlatDfn, DfnError> {
        parse_flat(src, "test.dfn")
    }

    #[test]
    fn groups_variables_by_block() {
        let src = "\
begin options
name print_input
type keyword

name save_flows
type keyword

begin dimensions
name maxbound
type integer
";
        let flat = parse(src).unwrap();
        assert_eq!(flat.blocks.len(), 2);
        assert_eq!(flat.blocks[0].name, "options");
        assert_eq!(flat.blocks[0].vars.len(), 2);
        assert_eq!(flat.blocks[0].vars[0].name, "print_input");
        assert_eq!(flat.blocks[0].vars[1].name, "save_flows");
        assert_eq!(flat.blocks[1].name, "dimensions");
        assert_eq!(flat.blocks[1].vars.len(), 1);
        assert_eq!(flat.blocks[1].vars[0].tag, TypeTag::Integer);
    }

    #[test]
    fn attributes_before_first_block_are_metadata() {
        let src = "\
package chd
multi true

begin options
name print_input
type keyword
";
        let flat = parse(src).unwrap();
        assert_eq!(
            flat.meta.get("package"),
            Some(&Value::Str("chd".to_owned()))
        );
        assert_eq!(flat.meta.get("multi"), Some(&Value::Bool(true)));
    }

    #[test]
    fn variable_without_type_fails() {
        let src = "begin options\nname print_input\noptional true\n";
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingType);
        assert_eq!(err.line, 2);
        assert!(err.message.contains("print_input"));
    }

    #[test]
    fn unrecognized_type_tag_fails() {
        let src = "begin options\nname x\ntype quux\n";
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType);
        assert!(err.message.contains("quux"));
    }

    #[test]
    fn double_precision_is_one_scalar_spelling() {
        let src = "begin griddata\nname strt\ntype double precision\n";
        let flat = parse(src).unwrap();
        assert_eq!(flat.blocks[0].vars[0].tag, TypeTag::Real);
        assert!(flat.blocks[0].vars[0].child_refs.is_empty());
    }

    #[test]
    fn composite_type_carries_children_references() {
        let src = "begin period\nname spd\ntype recarray cellid value boundname\n";
        let flat = parse(src).unwrap();
        let var = &flat.blocks[0].vars[0];
        assert_eq!(var.tag, TypeTag::List);
        assert_eq!(var.child_refs, vec!["cellid", "value", "boundname"]);
        assert!(!var.attrs.contains_key("type"));
    }

    #[test]
    fn composite_type_without_children_fails() {
        let src = "begin period\nname spd\ntype recarray\n";
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedLine);
    }

    #[test]
    fn scalar_type_with_arguments_fails() {
        let src = "begin options\nname x\ntype integer cellid\n";
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedLine);
    }

    #[test]
    fn attribute_before_name_in_block_fails() {
        let src = "begin options\ntype keyword\n";
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedLine);
        assert!(err.message.contains("options"));
    }

    #[test]
    fn default_value_key_is_normalized() {
        let src = "begin options\nname nper\ntype integer\ndefault_value 1\n";
        let flat = parse(src).unwrap();
        let var = &flat.blocks[0].vars[0];
        assert_eq!(var.attrs.get("default"), Some(&Value::Int(1)));
        assert!(!var.attrs.contains_key("default_value"));
    }

    #[test]
    fn defaults_are_typed_by_variable_kind() {
        let src = "\
begin options
name delt
type double precision
default 1.5

name label
type string
default 42
";
        let flat = parse(src).unwrap();
        let vars = &flat.blocks[0].vars;
        assert_eq!(vars[0].attrs.get("default"), Some(&Value::Real(1.5)));
        // string variables keep their defaults verbatim
        assert_eq!(
            vars[1].attrs.get("default"),
            Some(&Value::Str("42".to_owned()))
        );
    }

    #[test]
    fn booleans_are_parsed_case_insensitively() {
        let src = "begin options\nname x\ntype keyword\noptional TRUE\nin_record false\n";
        let flat = parse(src).unwrap();
        let var = &flat.blocks[0].vars[0];
        assert_eq!(var.attrs.get("optional"), Some(&Value::Bool(true)));
        assert_eq!(var.attrs.get("in_record"), Some(&Value::Bool(false)));
    }

    #[test]
    fn unrecognized_attributes_pass_through() {
        let src = "begin options\nname x\ntype keyword\nmf6internal xyz\n";
        let flat = parse(src).unwrap();
        assert_eq!(
            flat.blocks[0].vars[0].attrs.get("mf6internal"),
            Some(&Value::Str("xyz".to_owned()))
        );
    }

    #[test]
    fn description_cleanup_matches_legacy_rules() {
        let src = "begin options\nname x\ntype keyword\ndescription keyword to indicate the ``budget'' file\n";
        let flat = parse(src).unwrap();
        assert_eq!(
            flat.blocks[0].vars[0].attrs.get("description"),
            Some(&Value::Str(
                "keyword to indicate the 'budget' file".to_owned()
            ))
        );
    }

    #[test]
    fn repeated_attribute_overwrites_in_place() {
        let src = "begin options\nname x\ntype keyword\nreader urword\nreader u1ddbl\n";
        let flat = parse(src).unwrap();
        let var = &flat.blocks[0].vars[0];
        assert_eq!(
            var.attrs.get("reader"),
            Some(&Value::Str("u1ddbl".to_owned()))
        );
        assert_eq!(var.attrs.len(), 1);
    }

    #[test]
    fn last_variable_is_flushed_at_end_of_input() {
        let src = "begin options\nname x\ntype keyword";
        let flat = parse(src).unwrap();
        assert_eq!(flat.blocks[0].vars.len(), 1);
    }

    #[test]
    fn empty_block_is_kept() {
        let src = "begin options\nbegin dimensions\nname n\ntype integer\n";
        let flat = parse(src).unwrap();
        assert_eq!(flat.blocks.len(), 2);
        assert!(flat.blocks[0].vars.is_empty());
    }
}
