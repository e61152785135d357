//! Database boundary: query execution trait and rectangular result sets.
//!
//! The crate does not carry a SQL driver. Callers hand in anything that
//! implements [`QueryExecutor`]; the implementation owns connection
//! management, commit-after-query and cursor cleanup.

pub mod value;

pub use value::Value;

use crate::{ReportError, Result};

/// Executes a text SQL statement and yields column names plus rows.
pub trait QueryExecutor {
    fn query(&mut self, sql: &str) -> Result<ResultSet>;
}

/// One query's result: ordered column names and a rectangular row set.
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Build a result set, rejecting ragged rows and duplicate column names.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].contains(col) {
                return Err(ReportError::Config(format!(
                    "duplicate column name in result set: {}",
                    col
                )));
            }
        }
        for row in &rows {
            if row.len() != columns.len() {
                return Err(ReportError::Config(format!(
                    "row width {} does not match column count {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
