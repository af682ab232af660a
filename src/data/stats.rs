use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use super::model::{CellValue, Column, ColumnType, Table};

// ---------------------------------------------------------------------------
// Descriptive statistics per column
// ---------------------------------------------------------------------------

/// Statistics of a numeric column. Every field except `count` is `None` when
/// the column has no values to aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); needs at least two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Statistics of a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStats {
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<String>,
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Text(TextStats),
}

impl ColumnStats {
    pub fn count(&self) -> usize {
        match self {
            ColumnStats::Numeric(s) => s.count,
            ColumnStats::Text(s) => s.count,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericStats> {
        match self {
            ColumnStats::Numeric(s) => Some(s),
            ColumnStats::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextStats> {
        match self {
            ColumnStats::Text(s) => Some(s),
            ColumnStats::Numeric(_) => None,
        }
    }
}

/// Summary of every column, keyed by name in table order.
pub type Summary = IndexMap<String, ColumnStats>;

/// Pretty-printed JSON of `summary`, keyed by column in table order.
pub fn to_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

/// Describe each column independently from its non-missing values.
pub fn describe(table: &Table) -> Summary {
    table
        .columns()
        .iter()
        .map(|col| (col.name().to_string(), describe_column(col)))
        .collect()
}

pub fn describe_column(column: &Column) -> ColumnStats {
    match column.kind() {
        ColumnType::Numeric => ColumnStats::Numeric(numeric_stats(column.numbers().collect())),
        ColumnType::Text => ColumnStats::Text(text_stats(column)),
    }
}

fn numeric_stats(mut values: Vec<f64>) -> NumericStats {
    let count = values.len();
    if count == 0 {
        return NumericStats {
            count,
            mean: None,
            std: None,
            min: None,
            p25: None,
            p50: None,
            p75: None,
            max: None,
        };
    }

    values.sort_by(f64::total_cmp);
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (count > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    // Inputs are finite (the loader drops infinities), but the sum can
    // still drift a hair outside [min, max] or overflow to infinity.
    let min = values[0];
    let max = values[count - 1];
    let mean = mean.clamp(min, max);

    NumericStats {
        count,
        mean: Some(mean),
        std,
        min: Some(min),
        p25: Some(quantile(&values, 0.25)),
        p50: Some(quantile(&values, 0.5)),
        p75: Some(quantile(&values, 0.75)),
        max: Some(max),
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn text_stats(column: &Column) -> TextStats {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut count = 0;
    for (order, value) in column.present().filter_map(CellValue::as_str).enumerate() {
        count += 1;
        counts.entry(value).or_insert((0, order)).0 += 1;
    }

    let top = counts
        .iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(value, (freq, _))| (value.to_string(), *freq));

    TextStats {
        count,
        unique: counts.len(),
        freq: top.as_ref().map(|(_, f)| *f),
        top: top.map(|(v, _)| v),
    }
}
