use std::path::Path;

use anyhow::Context;

use crate::data::format::DataFormat;
use crate::data::model::Table;
use crate::error::{DashboardError, Result};

/// File name offered for the filtered subset.
pub const EXPORT_STEM: &str = "filtered_data";

/// A serialized table ready to be offered as a download. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBuffer {
    bytes: Vec<u8>,
    mime_type: &'static str,
    file_name: String,
}

impl ExportBuffer {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the buffer to `path`.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}

/// Serialize `table` in `format`. Only CSV is supported: a header row, then
/// one record per row in column order, missing cells as empty fields.
pub fn export(table: &Table, format: DataFormat) -> Result<ExportBuffer> {
    match format {
        DataFormat::Csv => export_csv(table),
        other => Err(DashboardError::UnsupportedFormat(format!(
            "{other} export"
        ))),
    }
}

fn export_csv(table: &Table) -> Result<ExportBuffer> {
    let write_err = |e: csv::Error| DashboardError::parse(DataFormat::Csv, e);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names()).map_err(write_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_field().into_owned()))
            .map_err(write_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::parse(DataFormat::Csv, e.error()))?;

    log::info!(
        "Exported {} rows ({} bytes) as CSV",
        table.num_rows(),
        bytes.len()
    );
    Ok(ExportBuffer {
        bytes,
        mime_type: DataFormat::Csv.mime_type(),
        file_name: format!("{EXPORT_STEM}.{}", DataFormat::Csv.extension()),
    })
}
