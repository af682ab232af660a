use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use arrow::array::{ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, UInt64Type};
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use indexmap::IndexSet;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::format::DataFormat;
use super::model::{Column, Table};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

pub const DELIMITER_ENV: &str = "DASHBOARD_CSV_DELIMITER";
pub const MAX_ROWS_ENV: &str = "DASHBOARD_MAX_ROWS";
pub const DEFAULT_MAX_ROWS: usize = 1_000_000;

/// Knobs for [`load_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter for CSV input.
    pub delimiter: u8,
    /// Reject inputs with more data rows than this. `None` disables the check.
    pub max_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: Some(DEFAULT_MAX_ROWS),
        }
    }
}

impl LoadOptions {
    /// Read `DASHBOARD_CSV_DELIMITER` and `DASHBOARD_MAX_ROWS`, falling back to
    /// the defaults for unset or malformed values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup(DELIMITER_ENV) {
            match parse_delimiter(&raw) {
                Some(d) => options.delimiter = d,
                None => log::warn!("Ignoring {DELIMITER_ENV}={raw:?}: expected one ASCII character"),
            }
        }

        if let Some(raw) = lookup(MAX_ROWS_ENV) {
            let raw_trimmed = raw.trim();
            if raw_trimmed == "0" || raw_trimmed.eq_ignore_ascii_case("none") {
                options.max_rows = None;
            } else {
                match raw_trimmed.parse::<usize>() {
                    Ok(n) => options.max_rows = Some(n),
                    Err(_) => log::warn!("Ignoring {MAX_ROWS_ENV}={raw:?}: not a row count"),
                }
            }
        }

        options
    }
}

fn parse_delimiter(raw: &str) -> Option<u8> {
    if raw == "\\t" || raw.eq_ignore_ascii_case("tab") {
        return Some(b'\t');
    }
    match raw.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse `bytes` in the declared format with default options.
pub fn load(bytes: &[u8], format: DataFormat) -> Result<Table> {
    load_with(bytes, format, &LoadOptions::default())
}

/// Parse `bytes` in the declared format.
///
/// The first row (or JSON key set, or Parquet schema) names the columns. A
/// column is numeric when every non-missing cell parses as a finite number,
/// otherwise text. Whole-number columns keep exact integer values. Empty
/// cells are missing.
pub fn load_with(bytes: &[u8], format: DataFormat, options: &LoadOptions) -> Result<Table> {
    let raw = match format {
        DataFormat::Csv => read_csv(bytes, options)?,
        DataFormat::Xlsx => read_spreadsheet(bytes, options)?,
        DataFormat::Json => read_json(bytes, options)?,
        DataFormat::Parquet => read_parquet(bytes, options)?,
    };
    let table = raw.into_table()?;
    log::debug!(
        "Parsed {format} input: {} rows x {} columns",
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

/// Load a table from a file.  Dispatch by extension.
pub fn load_file(path: &Path, options: &LoadOptions) -> anyhow::Result<Table> {
    let format = DataFormat::from_extension(path)?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let table = load_with(&bytes, format, options)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.num_rows(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Intermediate representation shared by all readers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Integer(i128),
    Number(f64),
    Text(String),
}

impl RawCell {
    fn text(s: &str) -> Option<RawCell> {
        (!s.is_empty()).then(|| RawCell::Text(s.to_string()))
    }

    fn as_integer(&self) -> Option<i128> {
        match self {
            RawCell::Integer(i) => Some(*i),
            RawCell::Number(_) => None,
            RawCell::Text(s) => s.trim().parse::<i128>().ok(),
        }
    }

    /// `inf` is not a number here, so such a column stays text. `NaN`
    /// parses and ends up missing.
    fn as_number(&self) -> Option<f64> {
        match self {
            RawCell::Integer(i) => Some(*i as f64),
            RawCell::Number(v) => Some(*v),
            RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_infinite()),
        }
    }
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<RawCell>>>,
    max_rows: Option<usize>,
}

impl RawTable {
    fn new(headers: Vec<String>, options: &LoadOptions) -> Self {
        RawTable {
            headers,
            rows: Vec::new(),
            max_rows: options.max_rows,
        }
    }

    fn push(&mut self, row: Vec<Option<RawCell>>) -> Result<()> {
        if let Some(limit) = self.max_rows {
            if self.rows.len() >= limit {
                return Err(DashboardError::RowLimitExceeded {
                    rows: self.rows.len() + 1,
                    limit,
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    fn into_table(self) -> Result<Table> {
        if self.rows.is_empty() {
            return Err(DashboardError::EmptyTable);
        }
        let headers = dedupe_headers(self.headers);
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let cells: Vec<Option<&RawCell>> = self
                    .rows
                    .iter()
                    .map(|row| row.get(i).and_then(Option::as_ref))
                    .collect();
                infer_column(name, &cells)
            })
            .collect();
        Table::new(columns)
    }
}

/// Integer when every present cell is a whole number, else numeric when every
/// present cell parses as a number, otherwise text. An all-missing column is
/// numeric.
fn infer_column(name: String, cells: &[Option<&RawCell>]) -> Column {
    let integers: Option<Vec<Option<i128>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(c) => c.as_integer().map(Some),
        })
        .collect();
    if let Some(values) = integers {
        return Column::integers(name, values);
    }

    let numbers: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(c) => c.as_number().map(Some),
        })
        .collect();

    match numbers {
        Some(values) => Column::numeric(name, values),
        None => Column::text(
            name,
            cells.iter().map(|cell| {
                cell.map(|c| match c {
                    RawCell::Text(s) => s.clone(),
                    RawCell::Integer(i) => i.to_string(),
                    RawCell::Number(v) => v.to_string(),
                })
            }),
        ),
    }
}

/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let named: Vec<String> = headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            }
        })
        .collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(named.len());
    for name in named {
        let mut candidate = name.clone();
        let mut n = 1;
        while used.contains(&candidate) {
            candidate = format!("{name}.{n}");
            n += 1;
        }
        if candidate != name {
            log::warn!("Renamed duplicate column '{name}' to '{candidate}'");
        }
        used.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(bytes: &[u8], options: &LoadOptions) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::parse(DataFormat::Csv, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw = RawTable::new(headers, options);
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            DashboardError::parse(DataFormat::Csv, format!("data row {}: {e}", row_no + 1))
        })?;
        raw.push(record.iter().map(RawCell::text).collect())?;
    }
    Ok(raw)
}

// ---------------------------------------------------------------------------
// Spreadsheet reader (first worksheet)
// ---------------------------------------------------------------------------

fn read_spreadsheet(bytes: &[u8], options: &LoadOptions) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DashboardError::parse(DataFormat::Xlsx, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::parse(DataFormat::Xlsx, "workbook has no worksheets"))?
        .map_err(|e| DashboardError::parse(DataFormat::Xlsx, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(DashboardError::EmptyTable);
    };

    let mut raw = RawTable::new(header.iter().map(header_text).collect(), options);
    for row in rows {
        raw.push(row.iter().map(spreadsheet_cell).collect())?;
    }
    Ok(raw)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn spreadsheet_cell(cell: &Data) -> Option<RawCell> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Int(i) => Some(RawCell::Integer((*i).into())),
        Data::Float(f) => Some(RawCell::Number(*f)),
        Data::String(s) => RawCell::text(s),
        Data::Bool(b) => Some(RawCell::Text(b.to_string())),
        other => RawCell::text(&other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records layout: `[{"city": "A", "pop": 10}, ...]`. Columns appear in
/// first-seen key order; absent keys are missing.
fn read_json(bytes: &[u8], options: &LoadOptions) -> Result<RawTable> {
    let root: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| DashboardError::parse(DataFormat::Json, e))?;
    let records = root.as_array().ok_or_else(|| {
        DashboardError::parse(DataFormat::Json, "expected a top-level array of objects")
    })?;

    let mut headers: IndexSet<String> = IndexSet::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            DashboardError::parse(DataFormat::Json, format!("record {i} is not an object"))
        })?;
        headers.extend(obj.keys().cloned());
        objects.push(obj);
    }

    let mut raw = RawTable::new(headers.iter().cloned().collect(), options);
    for obj in objects {
        raw.push(
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_cell))
                .collect(),
        )?;
    }
    Ok(raw)
}

fn json_cell(val: &JsonValue) -> Option<RawCell> {
    match val {
        JsonValue::Null => None,
        JsonValue::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .map(RawCell::Integer)
            .or_else(|| n.as_f64().map(RawCell::Number)),
        JsonValue::String(s) => RawCell::text(s),
        JsonValue::Bool(b) => Some(RawCell::Text(b.to_string())),
        other => Some(RawCell::Text(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

fn read_parquet(bytes: &[u8], options: &LoadOptions) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))
        .map_err(|e| DashboardError::parse(DataFormat::Parquet, e))?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| DashboardError::parse(DataFormat::Parquet, e))?;

    let mut raw = RawTable::new(headers, options);
    for batch_result in reader {
        let batch = batch_result.map_err(|e| DashboardError::parse(DataFormat::Parquet, e))?;
        let columns = batch
            .columns()
            .iter()
            .map(arrow_column_cells)
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            raw.push(columns.iter().map(|col| col[row].clone()).collect())?;
        }
    }
    Ok(raw)
}

/// Integer Arrow types stay exact, other numeric types become `f64`;
/// everything else goes through the Arrow string cast.
fn arrow_column_cells(col: &ArrayRef) -> Result<Vec<Option<RawCell>>> {
    let cast_err = |e| DashboardError::parse(DataFormat::Parquet, e);
    if col.data_type() == &DataType::UInt64 {
        Ok(col
            .as_primitive::<UInt64Type>()
            .iter()
            .map(|v| v.map(|i| RawCell::Integer(i.into())))
            .collect())
    } else if col.data_type().is_integer() {
        let ints = cast(col, &DataType::Int64).map_err(cast_err)?;
        Ok(ints
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map(|i| RawCell::Integer(i.into())))
            .collect())
    } else if col.data_type().is_numeric() {
        let floats = cast(col, &DataType::Float64).map_err(cast_err)?;
        Ok(floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map(RawCell::Number))
            .collect())
    } else {
        let text = cast(col, &DataType::Utf8).map_err(cast_err)?;
        Ok(text
            .as_string::<i32>()
            .iter()
            .map(|v| v.and_then(RawCell::text))
            .collect())
    }
}
