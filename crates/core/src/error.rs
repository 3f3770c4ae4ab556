use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of definition-file failures. Every kind is scoped to
/// one file: batch tooling reports the failure and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A non-blank, non-comment line the tokenizer cannot classify.
    MalformedLine,
    /// A variable declared without a `type` attribute.
    MissingType,
    /// A `type` attribute naming a tag outside the fixed set.
    UnknownType,
    /// A children list referencing a name absent from the block, or a
    /// name already attached to another parent.
    UnresolvedChild,
    /// A children list that would make the structure a graph, not a tree.
    CyclicReference,
    /// Two blocks or two sibling variables sharing a name, or a
    /// metadata/attribute key shadowing one.
    DuplicateName,
    /// Reading the input or writing the output failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::MalformedLine => "malformed line",
            ErrorKind::MissingType => "missing type",
            ErrorKind::UnknownType => "unknown type",
            ErrorKind::UnresolvedChild => "unresolved child",
            ErrorKind::CyclicReference => "cyclic reference",
            ErrorKind::DuplicateName => "duplicate name",
            ErrorKind::Io => "i/o error",
        };
        f.write_str(s)
    }
}

/// A definition-file error. Within one file the first error aborts the
/// conversion; no partial Definition is ever produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DfnError {
    pub kind: ErrorKind,
    pub file: String,
    /// 1-based line number; 0 when no single line applies.
    pub line: u32,
    pub message: String,
}

impl DfnError {
    pub fn new(kind: ErrorKind, file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError {
            kind,
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn malformed_line(file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::MalformedLine, file, line, message)
    }

    pub fn missing_type(file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::MissingType, file, line, message)
    }

    pub fn unknown_type(file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::UnknownType, file, line, message)
    }

    pub fn unresolved_child(file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::UnresolvedChild, file, line, message)
    }

    pub fn cyclic_reference(file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::CyclicReference, file, line, message)
    }

    pub fn duplicate_name(file: &str, line: u32, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::DuplicateName, file, line, message)
    }

    pub fn io(file: &str, message: impl Into<String>) -> Self {
        DfnError::new(ErrorKind::Io, file, 0, message)
    }

    /// Serialize to a JSON object for `--output json` reporting.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "file":    self.file,
            "kind":    self.kind,
            "line":    self.line,
            "message": self.message,
        })
    }
}

impl fmt::Display for DfnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}:{}: {}: {}",
                self.file, self.line, self.kind, self.message
            )
        } else {
            write!(f, "{}: {}: {}", self.file, self.kind, self.message)
        }
    }
}

impl std::error::Error for DfnError {}
