//! Interactive data exploration pipeline: load a CSV/spreadsheet upload,
//! describe its columns, filter rows on a column/value pair, chart a numeric
//! column and export the filtered rows as CSV.
//!
//! Every step is a pure function of the loaded [`Table`] and the request
//! parameters; the desktop shell in `main.rs` only calls into this crate.
//!
//! ```no_run
//! use data_dashboard::{chart, data, export};
//! use data_dashboard::data::format::DataFormat;
//!
//! # fn main() -> data_dashboard::Result<()> {
//! let table = data::loader::load(b"city,pop\nA,10\nB,20\nA,30\n", DataFormat::Csv)?;
//! let summary = data::stats::describe(&table);
//! let subset = data::filter::filter(&table, &data::filter::FilterSpec::new("city", "A"))?;
//! let bars = chart::render(&subset, &chart::ChartRequest::new(chart::ChartKind::Bar, "pop"))?;
//! let csv = export::export(&subset, DataFormat::Csv)?;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod color;
pub mod data;
pub mod error;
pub mod export;
pub mod state;

pub use data::model::{CellValue, Column, ColumnType, Table};
pub use error::{DashboardError, Result};
