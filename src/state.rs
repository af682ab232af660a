use std::path::Path;

use crate::chart::{self, ChartArtifact, ChartKind, ChartRequest};
use crate::color::ColorMap;
use crate::data::filter::{self, FilterSpec};
use crate::data::format::DataFormat;
use crate::data::loader::{self, LoadOptions};
use crate::data::model::{CellValue, Table};
use crate::data::stats::{self, Summary};
use crate::error::Result;
use crate::export::{self, ExportBuffer};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Every derived value is
/// recomputed from the loaded table and the current selections.
#[derive(Default)]
pub struct AppState {
    pub options: LoadOptions,

    /// Loaded table (None until the user opens a file).
    pub table: Option<Table>,

    /// Name of the file the table came from.
    pub source_name: Option<String>,

    pub summary: Summary,

    /// Column and value for the equality filter.
    pub filter_column: Option<String>,
    pub filter_value: Option<CellValue>,

    /// Rows passing the current filter.
    pub filtered: Option<Table>,

    pub chart_kind: ChartKind,
    pub chart_column: Option<String>,

    /// Chart over the filtered rows, or the reason it could not be drawn.
    pub chart: Option<std::result::Result<ChartArtifact, String>>,

    /// Colours for the distinct values of the chart column.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Parse an uploaded byte stream and make it the current table.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8], format: DataFormat) -> Result<()> {
        let table = loader::load_with(bytes, format, &self.options)?;
        self.set_table(name, table);
        Ok(())
    }

    /// Load a file from disk, reporting failures in `status_message`.
    pub fn open_path(&mut self, path: &Path) {
        match loader::load_file(path, &self.options) {
            Ok(table) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_table(&name, table);
                self.status_message = Some(format!("Loaded {name}"));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table and reset selections to their defaults:
    /// filter on the first column's first value, chart the first numeric
    /// column.
    pub fn set_table(&mut self, name: &str, table: Table) {
        self.summary = stats::describe(&table);
        self.filter_column = table.column_names().first().map(|c| c.to_string());
        self.chart_column = table.numeric_columns().first().map(|c| c.to_string());
        self.source_name = Some(name.to_string());
        self.status_message = None;
        self.table = Some(table);
        self.filter_value = self.first_filter_value();
        self.refilter();
    }

    /// Distinct values offered for the current filter column.
    pub fn filter_choices(&self) -> Vec<CellValue> {
        match (&self.table, &self.filter_column) {
            (Some(table), Some(col)) => table.unique_values(col).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn first_filter_value(&self) -> Option<CellValue> {
        self.filter_choices().into_iter().next()
    }

    pub fn select_filter_column(&mut self, column: &str) {
        if self.filter_column.as_deref() == Some(column) {
            return;
        }
        self.filter_column = Some(column.to_string());
        self.filter_value = self.first_filter_value();
        self.refilter();
    }

    pub fn select_filter_value(&mut self, value: CellValue) {
        self.filter_value = Some(value);
        self.refilter();
    }

    pub fn select_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
        self.rerender();
    }

    pub fn select_chart_column(&mut self, column: &str) {
        self.chart_column = Some(column.to_string());
        self.rerender();
    }

    /// The active filter, if both a column and a value are chosen.
    pub fn filter_spec(&self) -> Option<FilterSpec> {
        let column = self.filter_column.clone()?;
        let value = self.filter_value.clone()?;
        Some(FilterSpec::new(column, value))
    }

    /// Recompute the filtered rows, then the chart.
    pub fn refilter(&mut self) {
        self.filtered = match (&self.table, self.filter_spec()) {
            (Some(table), Some(spec)) => match filter::filter(table, &spec) {
                Ok(t) => Some(t),
                Err(e) => {
                    log::error!("Filter failed: {e}");
                    self.status_message = Some(format!("Error: {e}"));
                    None
                }
            },
            // Nothing to filter on (e.g. every value missing): show all rows.
            (Some(table), None) => Some(table.clone()),
            (None, _) => None,
        };
        self.rerender();
    }

    /// Recompute the chart over the filtered rows.
    pub fn rerender(&mut self) {
        let (Some(filtered), Some(column)) = (&self.filtered, &self.chart_column) else {
            self.chart = None;
            self.color_map = None;
            return;
        };
        let request = ChartRequest::new(self.chart_kind, column.clone());
        self.color_map = filtered
            .column(column)
            .map(|col| ColorMap::new(column, col.values()));
        self.chart = Some(chart::render(filtered, &request).map_err(|e| e.to_string()));
    }

    /// Serialize the filtered rows for download.
    pub fn export_filtered(&self) -> Option<Result<ExportBuffer>> {
        self.filtered
            .as_ref()
            .map(|t| export::export(t, DataFormat::Csv))
    }

    /// Export the filtered rows and write them to `path`.
    pub fn save_filtered(&mut self, path: &Path) {
        let outcome = match self.export_filtered() {
            Some(Ok(buffer)) => buffer.write_to(path),
            Some(Err(e)) => Err(e.into()),
            None => return,
        };
        self.status_message = Some(match outcome {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                log::error!("Failed to save export: {e:#}");
                format!("Error: {e:#}")
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &[u8] = b"city,pop\nA,10\nB,20\nA,30\n";

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.load_bytes("cities.csv", CSV, DataFormat::Csv).unwrap();
        state
    }

    #[test]
    fn loading_selects_defaults() {
        let state = loaded();
        assert_eq!(state.filter_column.as_deref(), Some("city"));
        assert_eq!(state.filter_value, Some(CellValue::from("A")));
        assert_eq!(state.chart_column.as_deref(), Some("pop"));
        assert_eq!(state.filtered.as_ref().unwrap().num_rows(), 2);
        assert_eq!(state.summary["pop"].count(), 3);
        assert!(matches!(state.chart, Some(Ok(_))));
    }

    #[test]
    fn changing_filter_column_resets_value() {
        let mut state = loaded();
        state.select_filter_column("pop");
        assert_eq!(state.filter_value, Some(CellValue::Number(10.0)));
        assert_eq!(state.filtered.as_ref().unwrap().num_rows(), 1);

        state.select_filter_value(CellValue::Number(20.0));
        let filtered = state.filtered.as_ref().unwrap();
        assert_eq!(filtered.column("city").unwrap().values(), &[CellValue::from("B")]);
    }

    #[test]
    fn chart_follows_filtered_rows() {
        let mut state = loaded();
        state.select_chart_kind(ChartKind::Line);
        let Some(Ok(ChartArtifact::Line { points, .. })) = &state.chart else {
            panic!("expected a line chart");
        };
        assert_eq!(points, &vec![[0.0, 10.0], [1.0, 30.0]]);
    }

    #[test]
    fn chart_errors_are_kept_for_display() {
        let mut state = loaded();
        state.select_chart_column("city");
        assert!(matches!(&state.chart, Some(Err(msg)) if msg.contains("not numeric")));
    }

    #[test]
    fn export_filtered_rows() {
        let state = loaded();
        let buffer = state.export_filtered().unwrap().unwrap();
        assert_eq!(buffer.bytes(), b"city,pop\nA,10\nA,30\n");
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut state = loaded();
        let err = state.load_bytes("bad.csv", b"a\n", DataFormat::Csv);
        assert!(err.is_err());
        assert_eq!(state.source_name.as_deref(), Some("cities.csv"));
    }

    #[test]
    fn open_path_reports_errors_in_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "a,b\n").unwrap();
        let mut state = AppState::default();
        state.open_path(&path);
        assert!(state.table.is_none());
        assert!(state.status_message.unwrap().starts_with("Error"));
    }

    #[test]
    fn save_filtered_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_data.csv");
        let mut state = loaded();
        state.save_filtered(&path);
        assert_eq!(std::fs::read(&path).unwrap(), b"city,pop\nA,10\nA,30\n");
    }
}
