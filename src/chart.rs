use std::collections::HashMap;
use std::fmt;

use crate::data::model::{CellValue, Table};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Chart request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Line, ChartKind::Pie];
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "Bar Chart"),
            ChartKind::Line => write!(f, "Line Chart"),
            ChartKind::Pie => write!(f, "Pie Chart"),
        }
    }
}

/// Which chart to draw over which numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub column: String,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, column: impl Into<String>) -> Self {
        ChartRequest {
            kind,
            column: column.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart artifact: plain data, drawn by the UI layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    pub value: CellValue,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub value: CellValue,
    pub label: String,
    pub count: usize,
    /// Exact share of the total, in `[0, 1]`.
    pub fraction: f64,
    /// Share in percent, rounded to one decimal place.
    pub percent: f64,
}

impl PieSlice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// An independent, renderable description of one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartArtifact {
    /// One bar per distinct value, height = occurrences.
    Bar { column: String, bars: Vec<BarDatum> },
    /// `[row position, value]` for every non-missing cell, in row order.
    Line { column: String, points: Vec<[f64; 2]> },
    Pie { column: String, slices: Vec<PieSlice> },
}

impl ChartArtifact {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartArtifact::Bar { .. } => ChartKind::Bar,
            ChartArtifact::Line { .. } => ChartKind::Line,
            ChartArtifact::Pie { .. } => ChartKind::Pie,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            ChartArtifact::Bar { column, .. }
            | ChartArtifact::Line { column, .. }
            | ChartArtifact::Pie { column, .. } => column,
        }
    }

    /// Number of plotted observations.
    pub fn total(&self) -> usize {
        match self {
            ChartArtifact::Bar { bars, .. } => bars.iter().map(|b| b.count).sum(),
            ChartArtifact::Line { points, .. } => points.len(),
            ChartArtifact::Pie { slices, .. } => slices.iter().map(|s| s.count).sum(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Occurrences of each distinct non-missing value of `column`, most frequent
/// first; ties are ordered by value. Works on columns of any type.
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<(CellValue, usize)>> {
    let column = table.require_column(column)?;
    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    for value in column.present() {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<(CellValue, usize)> =
        counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
    counts.sort_by(|(va, na), (vb, nb)| nb.cmp(na).then_with(|| va.cmp(vb)));
    Ok(counts)
}

/// Build the chart described by `request`. The column must exist and be
/// numeric.
pub fn render(table: &Table, request: &ChartRequest) -> Result<ChartArtifact> {
    let column = table.require_column(&request.column)?;
    if !column.is_numeric() {
        return Err(DashboardError::NonNumericColumn(request.column.clone()));
    }

    let artifact = match request.kind {
        ChartKind::Bar => ChartArtifact::Bar {
            column: request.column.clone(),
            bars: bar_data(table, &request.column)?,
        },
        ChartKind::Line => ChartArtifact::Line {
            column: request.column.clone(),
            points: column
                .values()
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.as_f64().map(|y| [i as f64, y]))
                .collect(),
        },
        ChartKind::Pie => ChartArtifact::Pie {
            column: request.column.clone(),
            slices: pie_slices(table, &request.column)?,
        },
    };
    log::debug!(
        "Rendered {} over '{}' ({} observations)",
        request.kind,
        request.column,
        artifact.total()
    );
    Ok(artifact)
}

/// Bar heights for every distinct value of `column` (any type).
pub fn bar_data(table: &Table, column: &str) -> Result<Vec<BarDatum>> {
    Ok(value_counts(table, column)?
        .into_iter()
        .map(|(value, count)| BarDatum {
            label: value.to_string(),
            value,
            count,
        })
        .collect())
}

/// Percentage slices for every distinct value of `column` (any type).
pub fn pie_slices(table: &Table, column: &str) -> Result<Vec<PieSlice>> {
    let counts = value_counts(table, column)?;
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    Ok(counts
        .into_iter()
        .map(|(value, count)| {
            let fraction = count as f64 / total as f64;
            PieSlice {
                label: value.to_string(),
                value,
                count,
                fraction,
                percent: (fraction * 1000.0).round() / 10.0,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::text("city", [Some("A"), Some("B"), Some("A")]),
            Column::numeric("score", [Some(3.0), None, Some(1.0)]),
            Column::numeric("grade", [Some(2.0), Some(1.0), Some(2.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn bar_counts_distinct_values() {
        let chart = render(&table(), &ChartRequest::new(ChartKind::Bar, "grade")).unwrap();
        let ChartArtifact::Bar { bars, .. } = chart else {
            panic!("expected a bar chart");
        };
        let got: Vec<(String, usize)> = bars.into_iter().map(|b| (b.label, b.count)).collect();
        assert_eq!(got, vec![("2".to_string(), 2), ("1".to_string(), 1)]);
    }

    #[test]
    fn line_skips_missing_and_keeps_positions() {
        let chart = render(&table(), &ChartRequest::new(ChartKind::Line, "score")).unwrap();
        assert_eq!(
            chart,
            ChartArtifact::Line {
                column: "score".into(),
                points: vec![[0.0, 3.0], [2.0, 1.0]],
            }
        );
        assert_eq!(chart.total(), 2);
    }

    #[test]
    fn pie_rounds_to_one_decimal() {
        let slices = pie_slices(&table(), "city").unwrap();
        let got: Vec<(&str, f64)> = slices.iter().map(|s| (s.label.as_str(), s.percent)).collect();
        assert_eq!(got, vec![("A", 66.7), ("B", 33.3)]);
        assert_eq!(slices[0].percent_label(), "66.7%");
    }

    #[test]
    fn pie_totals_ignore_missing() {
        let chart = render(&table(), &ChartRequest::new(ChartKind::Pie, "score")).unwrap();
        assert_eq!(chart.total(), 2);
        assert_eq!(chart.kind(), ChartKind::Pie);
    }

    #[test]
    fn value_counts_ties_are_sorted_by_value() {
        let table = Table::new(vec![Column::text("c", [Some("b"), Some("a")])]).unwrap();
        assert_eq!(
            value_counts(&table, "c").unwrap(),
            vec![(CellValue::from("a"), 1), (CellValue::from("b"), 1)]
        );
    }

    #[test]
    fn rejects_text_and_unknown_columns() {
        assert!(matches!(
            render(&table(), &ChartRequest::new(ChartKind::Bar, "city")),
            Err(DashboardError::NonNumericColumn(_))
        ));
        assert!(matches!(
            render(&table(), &ChartRequest::new(ChartKind::Line, "nope")),
            Err(DashboardError::UnknownColumn(_))
        ));
    }

    #[test]
    fn empty_table_renders_empty_chart() {
        let empty = table().take_rows(&[]);
        let chart = render(&empty, &ChartRequest::new(ChartKind::Pie, "grade")).unwrap();
        assert_eq!(chart.total(), 0);
    }
}
