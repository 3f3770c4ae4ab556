//! Line tokenizer for definition files.
//!
//! Classifies raw lines into block starts, attributes, comments, and
//! blanks. Classification is line-local: an attribute is exactly one
//! line, continuations are not supported. Leading and trailing
//! whitespace is insignificant.

use crate::error::DfnError;

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// `begin <name> [transient]`
    BlockStart { name: String, transient: bool },
    /// `<key> <value>` -- key is the text before the first whitespace
    /// run, value the trimmed remainder.
    Attr { key: String, value: String },
    /// First non-whitespace character is `#`.
    Comment,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub kind: LineKind,
    /// 1-based line number in the source file.
    pub line: u32,
}

/// A lazy, non-restartable classifier over the lines of one definition
/// file. Yields one item per input line.
pub struct Tokenizer<'a> {
    lines: std::str::Lines<'a>,
    file: &'a str,
    line: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str, file: &'a str) -> Self {
        Tokenizer {
            lines: src.lines(),
            file,
            line: 0,
        }
    }

    fn classify(&self, raw: &str) -> Result<LineKind, DfnError> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(LineKind::Blank);
        }
        if line.starts_with('#') {
            return Ok(LineKind::Comment);
        }

        let mut words = line.split_whitespace();
        // line is non-empty after trimming, so the first word exists
        let first = words.next().unwrap_or_default();

        if first.eq_ignore_ascii_case("begin") {
            let name = words.next().ok_or_else(|| {
                DfnError::malformed_line(self.file, self.line, "block start without a name")
            })?;
            let transient = match words.next() {
                None => false,
                Some(w) if w.eq_ignore_ascii_case("transient") => true,
                Some(w) => {
                    return Err(DfnError::malformed_line(
                        self.file,
                        self.line,
                        format!("unexpected token '{}' after block name '{}'", w, name),
                    ))
                }
            };
            if let Some(w) = words.next() {
                return Err(DfnError::malformed_line(
                    self.file,
                    self.line,
                    format!("unexpected token '{}' after block start", w),
                ));
            }
            return Ok(LineKind::BlockStart {
                name: name.to_owned(),
                transient,
            });
        }

        match line.split_once(char::is_whitespace) {
            Some((key, value)) => Ok(LineKind::Attr {
                key: key.to_owned(),
                value: value.trim().to_owned(),
            }),
            None => Err(DfnError::malformed_line(
                self.file,
                self.line,
                format!("cannot classify line '{}'", line),
            )),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Spanned, DfnError>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.lines.next()?;
        self.line += 1;
        Some(self.classify(raw).map(|kind| Spanned {
            kind,
            line: self.line,
        }))
    }
}
