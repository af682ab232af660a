use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

/// File formats understood by the loader. Only [`DataFormat::Csv`] can be
/// exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Csv,
    Xlsx,
    Json,
    Parquet,
}

impl DataFormat {
    /// Dispatch by file extension (case-insensitive).
    pub fn from_extension(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        ext.parse()
    }

    pub fn extension(self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Xlsx => "xlsx",
            DataFormat::Json => "json",
            DataFormat::Parquet => "parquet",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DataFormat::Csv => "text/csv",
            DataFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            DataFormat::Json => "application/json",
            DataFormat::Parquet => "application/vnd.apache.parquet",
        }
    }

    /// Extensions offered by the file-open dialog.
    pub fn supported_extensions() -> &'static [&'static str] {
        &["csv", "xlsx", "xlsm", "xls", "json", "parquet", "pq"]
    }
}

impl FromStr for DataFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "xlsx" | "xlsm" | "xls" => Ok(DataFormat::Xlsx),
            "json" => Ok(DataFormat::Json),
            "parquet" | "pq" => Ok(DataFormat::Parquet),
            other => Err(DashboardError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
