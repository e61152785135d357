use indexmap::IndexMap;

use crate::db::{ResultSet, Value};
use crate::{ReportError, Result};

/// One named sequence of values plotted against the shared category axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub data: Vec<Value>,
}

/// Categories plus the series extracted from one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

/// Shape a rectangular result set into chart series.
///
/// Column 0 is always the category axis. With `data_start_col` == 1 each
/// remaining column becomes one series named after its header. With a
/// larger `data_start_col`, columns 1..data_start_col are grouping keys:
/// every distinct key combination yields one series per data column, the
/// column header being hyphen-appended to the name only when there is
/// more than one data column. Values below 1 are clamped to 1.
///
/// `label_order`, when given, fixes the emitted series order; names
/// absent from the data yield a series with no values.
pub fn extract_series(
    result: &ResultSet,
    data_start_col: usize,
    label_order: Option<&[String]>,
) -> Result<Extraction> {
    let columns = result.columns();
    if columns.len() <= 1 {
        return Err(ReportError::Config(format!(
            "cannot chart a result set with {} column(s)",
            columns.len()
        )));
    }

    let data_start = data_start_col.clamp(1, columns.len() - 1);
    let rows = result.rows();

    if data_start == 1 {
        let series = (1..columns.len())
            .map(|i| Series {
                name: columns[i].clone(),
                data: rows.iter().map(|r| r[i].clone()).collect(),
            })
            .collect();
        let categories = rows.iter().map(|r| format_category(&r[0])).collect();
        return Ok(Extraction { categories, series });
    }

    let multiple_data_cols = columns.len() - data_start >= 2;
    let mut values: IndexMap<String, Vec<Value>> = IndexMap::new();
    for i in data_start..columns.len() {
        for row in rows {
            let name = series_name(row, &columns[i], data_start, multiple_data_cols);
            values.entry(name).or_default().push(row[i].clone());
        }
    }

    let series = match label_order {
        Some(order) => order
            .iter()
            .map(|name| Series {
                name: name.clone(),
                data: values.get(name).cloned().unwrap_or_default(),
            })
            .collect(),
        None => values
            .into_iter()
            .map(|(name, data)| Series { name, data })
            .collect(),
    };

    let mut categories = Vec::new();
    for row in rows {
        let category = format_category(&row[0]);
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    Ok(Extraction { categories, series })
}

/// Series name: grouping key values joined by spaces, with the data
/// column header appended to disambiguate when several data columns exist.
fn series_name(row: &[Value], column: &str, data_start: usize, multiple: bool) -> String {
    let name = row[1..data_start]
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    if multiple {
        format!("{}-{}", name, column)
    } else {
        name
    }
}

/// Category labels: dates shorten to month-day, everything else keeps its
/// canonical text form.
fn format_category(value: &Value) -> String {
    match value.as_date() {
        Some(d) => d.format("%m-%d").to_string(),
        None => value.to_string(),
    }
}
