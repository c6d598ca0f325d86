//! Text-valued result rows.
//!
//! Every wire driver hands results to the core as [`Row`]s: column names plus
//! one optional string per cell. The core only ever reads names, type names,
//! flags and textual values, so converting at the driver boundary keeps the
//! dialect code independent of each driver's native value types.

use std::sync::Arc;

use crate::error::{Result, SearchError};

/// One result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

/// Something that addresses a cell: an ordinal or a column name.
pub trait RowIndex: std::fmt::Debug {
    fn index(&self, row: &Row) -> Option<usize>;
}

impl RowIndex for usize {
    fn index(&self, row: &Row) -> Option<usize> {
        (*self < row.values.len()).then_some(*self)
    }
}

impl RowIndex for &str {
    /// Exact name first, then ASCII case-insensitive.
    fn index(&self, row: &Row) -> Option<usize> {
        row.columns
            .iter()
            .position(|c| c == *self)
            .or_else(|| row.columns.iter().position(|c| c.eq_ignore_ascii_case(self)))
    }
}

impl RowIndex for &String {
    fn index(&self, row: &Row) -> Option<usize> {
        self.as_str().index(row)
    }
}

impl Row {
    /// Build a row. Missing trailing column names are filled with ordinals
    /// and missing trailing values with NULL.
    pub fn new(columns: impl Into<Arc<[String]>>, mut values: Vec<Option<String>>) -> Self {
        let mut columns: Arc<[String]> = columns.into();
        if values.len() < columns.len() {
            values.resize(columns.len(), None);
        }
        if columns.len() < values.len() {
            let mut named = columns.to_vec();
            named.extend((columns.len()..values.len()).map(|i| i.to_string()));
            columns = named.into();
        }
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn position<I: RowIndex>(&self, index: I) -> Result<usize> {
        index.index(self).ok_or_else(|| {
            SearchError::InvalidState(format!(
                "column {:?} not found in result row (columns: {})",
                index,
                self.columns.join(", ")
            ))
        })
    }

    /// Cell value, `None` for SQL NULL.
    pub fn get_opt<I: RowIndex>(&self, index: I) -> Result<Option<&str>> {
        let i = self.position(index)?;
        Ok(self.values[i].as_deref())
    }

    /// Cell value; NULL is an error.
    pub fn get_string<I: RowIndex>(&self, index: I) -> Result<&str> {
        let i = self.position(index)?;
        self.values[i].as_deref().ok_or_else(|| {
            SearchError::InvalidState(format!("column '{}' is NULL", self.columns[i]))
        })
    }

    pub fn is_null<I: RowIndex>(&self, index: I) -> Result<bool> {
        Ok(self.get_opt(index)?.is_none())
    }

    /// Boolean-ish catalog value: `1/0`, `t/f`, `true/false`, `y/n`,
    /// `yes/no`, or any integer (non-zero is true). NULL reads as false.
    pub fn get_flag<I: RowIndex>(&self, index: I) -> Result<bool> {
        let Some(raw) = self.get_opt(index)? else {
            return Ok(false);
        };
        parse_flag(raw).ok_or_else(|| {
            SearchError::InvalidState(format!("cannot read '{}' as a boolean flag", raw))
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" => Some(true),
        "f" | "false" | "n" | "no" => Some(false),
        _ => value.parse::<i64>().ok().map(|n| n != 0),
    }
}

/// Decode a text-protocol cell. Bytes that are not UTF-8 are an error, never
/// replaced.
pub fn utf8_cell(dialect: &str, column: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        SearchError::InvalidState(format!(
            "{} column '{}' is not valid UTF-8 at byte {}",
            dialect,
            column,
            e.utf8_error().valid_up_to()
        ))
    })
}
