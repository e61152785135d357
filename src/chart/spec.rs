//! Declarative chart specification consumed by the external renderer.
//!
//! The JSON shape follows the highcharts-convert option object: `chart`,
//! `title`, `xAxis`, `yAxis`, `plotOptions` and `series` keys, with only
//! the options a chart actually uses serialized.

use serde::Serialize;

use crate::chart::series::Extraction;
use crate::db::Value;

/// Default chart pixel width.
pub const DEFAULT_WIDTH: u32 = 800;

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub chart: ChartOptions,
    pub title: TitleOptions,
    #[serde(rename = "xAxis")]
    pub x_axis: AxisOptions,
    #[serde(rename = "yAxis")]
    pub y_axis: YAxisOptions,
    #[serde(rename = "plotOptions")]
    pub plot_options: PlotOptions,
    pub series: Vec<SeriesSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleOptions {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisOptions {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YAxisOptions {
    pub title: TitleOptions,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct PlotOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<SeriesOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineOptions {
    pub marker: MarkerOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerOptions {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnOptions {
    pub stacking: String,
    #[serde(rename = "dataLabels")]
    pub data_labels: DataLabelOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesOptions {
    #[serde(rename = "dataLabels")]
    pub data_labels: DataLabelOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataLabelOptions {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSpec {
    pub name: String,
    pub data: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChartSpec {
    /// Assemble a line chart spec.
    pub fn line(
        title: Option<String>,
        width: u32,
        data_labels: bool,
        extraction: Extraction,
    ) -> Self {
        let plot_options = PlotOptions {
            line: Some(LineOptions {
                marker: MarkerOptions {
                    enabled: data_labels,
                },
            }),
            series: data_labels.then_some(SeriesOptions {
                data_labels: DataLabelOptions {
                    enabled: true,
                    color: None,
                    format: None,
                },
            }),
            ..PlotOptions::default()
        };

        Self {
            chart: ChartOptions {
                kind: "line".to_string(),
                width,
            },
            title: TitleOptions { text: title },
            x_axis: AxisOptions {
                kind: Some("category".to_string()),
                categories: extraction.categories,
            },
            y_axis: YAxisOptions {
                title: TitleOptions {
                    text: Some(String::new()),
                },
            },
            plot_options,
            series: extraction
                .series
                .into_iter()
                .map(|s| SeriesSpec {
                    name: s.name,
                    data: s.data,
                    color: None,
                })
                .collect(),
        }
    }

    /// Assemble a percent-stacked column chart spec, coloring the first
    /// `palette.len()` series.
    pub fn stacked(
        title: Option<String>,
        width: u32,
        extraction: Extraction,
        palette: &[&str],
    ) -> Self {
        let series = extraction
            .series
            .into_iter()
            .enumerate()
            .map(|(i, s)| SeriesSpec {
                name: s.name,
                data: s.data,
                color: palette.get(i).map(|c| (*c).to_string()),
            })
            .collect();

        Self {
            chart: ChartOptions {
                kind: "column".to_string(),
                width,
            },
            title: TitleOptions { text: title },
            x_axis: AxisOptions {
                kind: None,
                categories: extraction.categories,
            },
            y_axis: YAxisOptions {
                title: TitleOptions {
                    text: Some(String::new()),
                },
            },
            plot_options: PlotOptions {
                column: Some(ColumnOptions {
                    stacking: "percent".to_string(),
                    data_labels: DataLabelOptions {
                        enabled: true,
                        color: Some("#000000".to_string()),
                        format: Some("{percentage:.2f}%".to_string()),
                    },
                }),
                ..PlotOptions::default()
            },
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::Series;

    fn extraction() -> Extraction {
        Extraction {
            categories: vec!["d1".into(), "d2".into()],
            series: vec![Series {
                name: "A".into(),
                data: vec![Value::from(1), Value::from(2)],
            }],
        }
    }

    #[test]
    fn test_line_spec_omits_unused_options() {
        let spec = ChartSpec::line(None, DEFAULT_WIDTH, false, extraction());
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["title"]["text"], serde_json::Value::Null);
        assert!(json["plotOptions"].get("column").is_none());
        assert!(json["series"][0].get("color").is_none());
    }

    #[test]
    fn test_stacked_spec_data_labels() {
        let spec = ChartSpec::stacked(Some("share".into()), 640, extraction(), &["#111111"]);
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["chart"]["width"], 640);
        assert_eq!(
            json["plotOptions"]["column"]["dataLabels"]["color"],
            "#000000"
        );
        assert_eq!(
            json["plotOptions"]["column"]["dataLabels"]["format"],
            "{percentage:.2f}%"
        );
        assert_eq!(json["series"][0]["color"], "#111111");
    }
}
