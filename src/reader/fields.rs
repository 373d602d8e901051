//! Tokenized line representation shared by every kernel text source.

use crate::error::{Result, SamplerError};
use std::str::FromStr;

/// Whitespace-separated tokens of one line from a kernel text source.
///
/// Positions follow the layout of the file the line came from. An empty
/// sequence means the requested line was not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSequence {
    fields: Vec<String>,
}

impl FieldSequence {
    /// Splits `line` on ASCII whitespace.
    pub fn from_line(line: &str) -> Self {
        Self {
            fields: line.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Fails with `SchemaMismatch` unless at least `needed` fields are present.
    pub fn require_len(&self, source_name: &'static str, needed: usize) -> Result<()> {
        if self.fields.len() < needed {
            return Err(SamplerError::SchemaMismatch {
                source_name,
                needed,
                found: self.fields.len(),
            });
        }
        Ok(())
    }

    /// Parses the token at `index`.
    ///
    /// A missing position is a `SchemaMismatch`; a non-numeric token is a
    /// `Parse` error naming `source_name`.
    pub fn parse_at<T>(&self, source_name: &'static str, index: usize) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(index).ok_or(SamplerError::SchemaMismatch {
            source_name,
            needed: index + 1,
            found: self.fields.len(),
        })?;
        raw.parse::<T>().map_err(|e| SamplerError::Parse {
            path: source_name.to_string(),
            detail: format!("field {} ('{}'): {}", index, raw, e),
        })
    }
}
