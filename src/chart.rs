//! Default chart configuration derived from a schema.

use serde::{Deserialize, Serialize};

use crate::types::{ColumnKind, Schema};

/// Supported chart shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Vertical bars per category.
    #[default]
    Bar,
    Line,
    /// Line with the area below filled.
    Area,
    /// Slices of the first value series.
    Pie,
    Scatter,
}

/// Chart settings for the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Category axis field.
    pub x_axis_key: Option<String>,
    /// One series per field; pie charts plot only the first.
    pub y_axis_keys: Vec<String>,
    /// Draw the series legend.
    pub show_legend: bool,
    /// Draw background grid lines.
    pub show_grid: bool,
}

impl ChartConfig {
    /// Bar chart of the first numeric column against the first string or date column.
    pub fn for_schema(schema: &Schema) -> Self {
        let x_axis_key = schema
            .columns
            .iter()
            .find(|c| matches!(c.kind, ColumnKind::String | ColumnKind::Date))
            .map(|c| c.field.clone());
        let y_axis_keys = schema.numeric_columns().take(1).map(|c| c.field.clone()).collect();

        Self {
            chart_type: ChartType::Bar,
            x_axis_key,
            y_axis_keys,
            show_legend: true,
            show_grid: true,
        }
    }
}
