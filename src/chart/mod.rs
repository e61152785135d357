//! Chart generation from query results.
//!
//! Query rows are shaped into named series ([`series`]), assembled into a
//! declarative [`ChartSpec`] ([`spec`]) and handed to an external
//! conversion engine ([`render`]) which turns the serialized spec into an
//! image file. Nothing here draws pixels.

pub mod render;
pub mod series;
pub mod spec;

pub use render::ChartRenderer;
pub use series::{extract_series, Extraction, Series};
pub use spec::ChartSpec;

use crate::db::{QueryExecutor, ResultSet};
use crate::{ReportError, Result};

/// Colors assigned to the first six series of a stacked chart.
const DEFAULT_COLORS: [&str; 6] = [
    "#4472A5", "#A94642", "#87A34E", "#70588D", "#4097AD", "#D9833C",
];

/// Line chart builder.
///
/// By default the first column is the x-axis and every further column is
/// one line. With `data_start_col` > 1 the columns in between act as
/// grouping keys that split a data column into one line per group.
#[derive(Debug, Clone, Default)]
pub struct LineChart {
    title: Option<String>,
    data_start_col: usize,
    label_order: Option<Vec<String>>,
    data_labels: bool,
    width: u32,
}

impl LineChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            data_start_col: 1,
            label_order: None,
            data_labels: false,
            width: spec::DEFAULT_WIDTH,
        }
    }

    pub fn untitled() -> Self {
        Self {
            data_start_col: 1,
            width: spec::DEFAULT_WIDTH,
            ..Self::default()
        }
    }

    /// Column where series data begins; columns before it (past the
    /// x-axis column) become grouping keys. Values below 1 are clamped.
    pub fn data_start_col(mut self, col: usize) -> Self {
        self.data_start_col = col.max(1);
        self
    }

    /// Emit series in this order instead of first-seen order.
    pub fn label_order(mut self, order: Vec<String>) -> Self {
        self.label_order = Some(order);
        self
    }

    /// Show point markers and per-point value labels.
    pub fn data_labels(mut self, on: bool) -> Self {
        self.data_labels = on;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Run `sql` and build the chart spec from its result.
    pub fn spec_from_query(
        &self,
        executor: &mut dyn QueryExecutor,
        sql: &str,
    ) -> Result<ChartSpec> {
        let result = executor
            .query(sql)
            .map_err(|e| ReportError::Query(format!("chart init failed: {}", e)))?;
        self.spec(&result)
    }

    /// Build the chart spec from an already-fetched result set.
    pub fn spec(&self, result: &ResultSet) -> Result<ChartSpec> {
        let extraction = extract_series(result, self.data_start_col, self.label_order.as_deref())?;
        Ok(ChartSpec::line(
            self.title.clone(),
            self.width,
            self.data_labels,
            extraction,
        ))
    }
}

/// Percent-stacked column chart builder.
///
/// Each column past the first becomes one stack segment; the first six
/// series get a fixed default color, any further series are left to the
/// renderer's own palette.
#[derive(Debug, Clone, Default)]
pub struct StackChart {
    title: Option<String>,
    width: u32,
}

impl StackChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            width: spec::DEFAULT_WIDTH,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn spec_from_query(
        &self,
        executor: &mut dyn QueryExecutor,
        sql: &str,
    ) -> Result<ChartSpec> {
        let result = executor
            .query(sql)
            .map_err(|e| ReportError::Query(format!("chart init failed: {}", e)))?;
        self.spec(&result)
    }

    pub fn spec(&self, result: &ResultSet) -> Result<ChartSpec> {
        let extraction = extract_series(result, 1, None)?;
        Ok(ChartSpec::stacked(
            self.title.clone(),
            self.width,
            extraction,
            &DEFAULT_COLORS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;

    fn three_col() -> ResultSet {
        ResultSet::new(
            vec!["Date".into(), "A".into(), "B".into()],
            vec![
                vec![Value::from("d1"), Value::from(1), Value::from(2)],
                vec![Value::from("d2"), Value::from(3), Value::from(4)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_line_chart_spec_shape() {
        let spec = LineChart::new("Run state").spec(&three_col()).unwrap();
        let json: serde_json::Value = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["chart"]["type"], "line");
        assert_eq!(json["chart"]["width"], 800);
        assert_eq!(json["title"]["text"], "Run state");
        assert_eq!(json["xAxis"]["type"], "category");
        assert_eq!(json["xAxis"]["categories"][1], "d2");
        assert_eq!(json["series"][0]["name"], "A");
        assert_eq!(json["series"][0]["data"][1], 3);
        // markers off unless data labels requested
        assert_eq!(
            json["plotOptions"]["line"]["marker"]["enabled"],
            serde_json::Value::Bool(false)
        );
        assert!(json["plotOptions"].get("series").is_none());
    }

    #[test]
    fn test_line_chart_data_labels() {
        let spec = LineChart::new("t")
            .data_labels(true)
            .spec(&three_col())
            .unwrap();
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(
            json["plotOptions"]["line"]["marker"]["enabled"],
            serde_json::Value::Bool(true)
        );
        assert_eq!(
            json["plotOptions"]["series"]["dataLabels"]["enabled"],
            serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn test_one_column_fails_before_render() {
        let rs = ResultSet::new(vec!["Date".into()], vec![vec![Value::from("d1")]]).unwrap();
        let err = LineChart::new("t").spec(&rs).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_stack_chart_colors() {
        let columns: Vec<String> = std::iter::once("Date".to_string())
            .chain((0..8).map(|i| format!("s{}", i)))
            .collect();
        let row: Vec<Value> = std::iter::once(Value::from("d1"))
            .chain((0..8).map(|i| Value::from(i)))
            .collect();
        let rs = ResultSet::new(columns, vec![row]).unwrap();

        let spec = StackChart::new("share").spec(&rs).unwrap();
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["chart"]["type"], "column");
        assert_eq!(json["plotOptions"]["column"]["stacking"], "percent");
        assert_eq!(json["series"][0]["color"], "#4472A5");
        assert_eq!(json["series"][5]["color"], "#D9833C");
        // beyond the palette the renderer default applies
        assert!(json["series"][6].get("color").is_none());
        assert!(json["series"][7].get("color").is_none());
    }
}
