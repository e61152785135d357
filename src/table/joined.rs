use indexmap::IndexMap;
use std::collections::HashSet;

use crate::db::{QueryExecutor, ResultSet, Value};
use crate::html::HtmlRenderer;
use crate::{ReportError, Result};

/// Separator used when concatenating key column values into a composite key.
const KEY_SEPARATOR: &str = ",";

/// One joined row: column name to value, in first-merged order.
pub type Record = IndexMap<String, Value>;

type FormatFn = Box<dyn Fn(&Value) -> String>;

/// Joins several query results into one logical table.
///
/// The first `key_width` columns of every source form the composite join
/// key. Row order is the first-seen key order of the first-added source;
/// keys only introduced by later sources are merged but never rendered.
/// Non-key column names must be unique across all sources.
pub struct MultiSqlTable {
    headers: Vec<String>,
    key_width: usize,
    records: IndexMap<String, Record>,
    data_col_names: HashSet<String>,
    key_order: Vec<String>,
    format_fns: IndexMap<String, FormatFn>,
}

impl std::fmt::Debug for MultiSqlTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSqlTable")
            .field("headers", &self.headers)
            .field("key_width", &self.key_width)
            .field("records", &self.records)
            .field("data_col_names", &self.data_col_names)
            .field("key_order", &self.key_order)
            .field("format_fns", &self.format_fns.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MultiSqlTable {
    /// Create a joined table rendering the given output headers, with the
    /// default key width of one leading column.
    pub fn new(headers: Vec<String>) -> Result<Self> {
        if headers.is_empty() {
            return Err(ReportError::Config(
                "table header is required as an argument".to_string(),
            ));
        }
        Ok(Self {
            headers,
            key_width: 1,
            records: IndexMap::new(),
            data_col_names: HashSet::new(),
            key_order: Vec::new(),
            format_fns: IndexMap::new(),
        })
    }

    /// Use the first `key_width` columns of every source as the join key.
    pub fn with_key_width(mut self, key_width: usize) -> Result<Self> {
        if key_width == 0 || key_width > self.headers.len() {
            return Err(ReportError::Config(format!(
                "key width {} invalid for {} declared headers",
                key_width,
                self.headers.len()
            )));
        }
        self.key_width = key_width;
        Ok(self)
    }

    /// Run `sql` and merge its result, wrapping query failure.
    pub fn add_query_source(&mut self, executor: &mut dyn QueryExecutor, sql: &str) -> Result<()> {
        let result = executor
            .query(sql)
            .map_err(|e| ReportError::Query(format!("table init failed: {}", e)))?;
        self.add_source(&result)
    }

    /// Merge one result set into the joined table.
    pub fn add_source(&mut self, result: &ResultSet) -> Result<()> {
        let columns = result.columns();
        if columns.len() < self.key_width {
            return Err(ReportError::Config(format!(
                "source has {} columns, need at least {} key columns",
                columns.len(),
                self.key_width
            )));
        }

        let mut conflicts: Vec<String> = columns[self.key_width..]
            .iter()
            .filter(|c| self.data_col_names.contains(*c))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            conflicts.sort();
            return Err(ReportError::ColumnConflict(conflicts));
        }
        self.data_col_names
            .extend(columns[self.key_width..].iter().cloned());

        let first_source = self.records.is_empty();

        for row in result.rows() {
            let key = row[..self.key_width]
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(KEY_SEPARATOR);
            if first_source {
                self.key_order.push(key.clone());
            }
            let record = self.records.entry(key).or_default();
            for (col, value) in columns.iter().zip(row.iter()) {
                record.insert(col.clone(), value.clone());
            }
        }
        Ok(())
    }

    /// Compute a derived value for every record added so far.
    ///
    /// Records merged after this call do not get the column; the relative
    /// order of `add_complex_col` and `add_source` calls is on the caller.
    pub fn add_complex_col<F>(&mut self, col: &str, calculate: F)
    where
        F: Fn(&Record) -> Value,
    {
        for record in self.records.values_mut() {
            let derived = calculate(record);
            record.insert(col.to_string(), derived);
        }
    }

    /// Register a display format applied to `col` at render time.
    pub fn set_col_format<F>(&mut self, col: &str, format: F)
    where
        F: Fn(&Value) -> String + 'static,
    {
        self.format_fns.insert(col.to_string(), Box::new(format));
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The formatted output grid, in authoritative key order.
    ///
    /// Declared headers with no data anywhere render as empty cells.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.key_order
            .iter()
            .map(|key| {
                let record = self.records.get(key);
                self.headers
                    .iter()
                    .map(|col| {
                        let value = record.and_then(|r| r.get(col));
                        match (value, self.format_fns.get(col)) {
                            (Some(v), Some(format)) => format(v),
                            (Some(v), None) => v.to_string(),
                            (None, _) => String::new(),
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn to_html(&self, renderer: &HtmlRenderer) -> Result<String> {
        renderer.render_table(&self.headers, &self.rows())
    }
}
