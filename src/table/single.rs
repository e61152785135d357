use crate::db::{QueryExecutor, ResultSet};
use crate::html::HtmlRenderer;
use crate::{ReportError, Result};

/// HTML table built from a single query.
///
/// Each result row becomes one table row. Rows can be reordered by a
/// caller-supplied list of values matched against one column; matching is
/// exact equality on the canonical text form.
#[derive(Debug, Clone)]
pub struct SqlTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SqlTable {
    /// Run `sql` on the executor and wrap its result.
    ///
    /// Query failure is wrapped as a table initialization error carrying
    /// the underlying cause.
    pub fn from_query(executor: &mut dyn QueryExecutor, sql: &str) -> Result<Self> {
        let result = executor
            .query(sql)
            .map_err(|e| ReportError::Query(format!("table init failed: {}", e)))?;
        Ok(Self::from_result_set(&result))
    }

    pub fn from_result_set(result: &ResultSet) -> Self {
        Self {
            headers: result.columns().to_vec(),
            rows: result
                .rows()
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    /// Keep only rows whose value in `order_col` appears in `order`, in
    /// the order given.
    ///
    /// Order entries with no matching row are skipped; rows not named by
    /// the list are dropped. Each entry selects at most the first match.
    pub fn with_custom_order(mut self, order: &[String], order_col: usize) -> Result<Self> {
        if order_col >= self.headers.len() {
            return Err(ReportError::Config(format!(
                "custom order column {} out of range for {} columns",
                order_col,
                self.headers.len()
            )));
        }

        let mut ordered = Vec::new();
        for wanted in order {
            if let Some(row) = self.rows.iter().find(|r| &r[order_col] == wanted) {
                ordered.push(row.clone());
            }
        }
        self.rows = ordered;
        Ok(self)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn to_html(&self, renderer: &HtmlRenderer) -> Result<String> {
        renderer.render_table(&self.headers, &self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;
    use pretty_assertions::assert_eq;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["Date".into(), "Day run".into()],
            vec![
                vec![Value::from("2015-05-20"), Value::from(120)],
                vec![Value::from("2015-05-21"), Value::from(130)],
                vec![Value::from("2015-05-22"), Value::from(125)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_follow_result_order() {
        let table = SqlTable::from_result_set(&sample());
        assert_eq!(table.headers(), ["Date", "Day run"]);
        assert_eq!(table.rows()[0], vec!["2015-05-20", "120"]);
        assert_eq!(table.rows()[2], vec!["2015-05-22", "125"]);
    }

    #[test]
    fn test_custom_order_reorders_and_drops() {
        let table = SqlTable::from_result_set(&sample())
            .with_custom_order(
                &[
                    "2015-05-22".to_string(),
                    "2015-05-20".to_string(),
                    // no such row, silently skipped
                    "2015-05-30".to_string(),
                ],
                0,
            )
            .unwrap();

        assert_eq!(
            table.rows(),
            &[
                vec!["2015-05-22".to_string(), "125".to_string()],
                vec!["2015-05-20".to_string(), "120".to_string()],
            ]
        );
    }

    #[test]
    fn test_custom_order_on_other_column() {
        let table = SqlTable::from_result_set(&sample())
            .with_custom_order(&["130".to_string()], 1)
            .unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0][0], "2015-05-21");
    }

    #[test]
    fn test_custom_order_col_out_of_range() {
        let err = SqlTable::from_result_set(&sample())
            .with_custom_order(&[], 5)
            .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_query_failure_wrapped() {
        struct Failing;
        impl QueryExecutor for Failing {
            fn query(&mut self, _sql: &str) -> crate::Result<ResultSet> {
                Err(ReportError::Query("server has gone away".into()))
            }
        }

        let err = SqlTable::from_query(&mut Failing, "select 1").unwrap_err();
        match err {
            ReportError::Query(msg) => assert!(msg.contains("server has gone away")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_to_html() {
        let renderer = HtmlRenderer::new();
        let html = SqlTable::from_result_set(&sample())
            .to_html(&renderer)
            .unwrap();
        assert!(html.contains("<th>Day run</th>"));
        assert!(html.contains("<td>130</td>"));
    }
}
