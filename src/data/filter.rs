use super::model::{CellValue, Table};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter predicate: one column must equal one value
// ---------------------------------------------------------------------------

/// Keep the rows whose `column` equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub value: CellValue,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        FilterSpec {
            column: column.into(),
            value: value.into(),
        }
    }

    /// A missing cell never matches, even against a missing target.
    pub fn matches(&self, cell: &CellValue) -> bool {
        !cell.is_missing() && *cell == self.value
    }
}

/// Indices of the rows that pass `spec`, in row order.
pub fn matching_indices(table: &Table, spec: &FilterSpec) -> Result<Vec<usize>> {
    let column = table.require_column(&spec.column)?;
    Ok(column
        .values()
        .iter()
        .enumerate()
        .filter(|(_, cell)| spec.matches(cell))
        .map(|(i, _)| i)
        .collect())
}

/// A new table with exactly the matching rows. Zero matches yields a table
/// with the same columns and no rows.
pub fn filter(table: &Table, spec: &FilterSpec) -> Result<Table> {
    let indices = matching_indices(table, spec)?;
    log::debug!(
        "Filter {} = {}: {} of {} rows",
        spec.column,
        spec.value,
        indices.len(),
        table.num_rows()
    );
    Ok(table.take_rows(&indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use crate::error::DashboardError;

    fn table() -> Table {
        Table::new(vec![
            Column::text("city", [Some("A"), Some("B"), None, Some("A")]),
            Column::numeric("pop", [Some(10.0), Some(20.0), Some(10.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn keeps_matching_rows_in_order() {
        let out = filter(&table(), &FilterSpec::new("city", "A")).unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(
            out.column("pop").unwrap().values(),
            &[CellValue::Number(10.0), CellValue::Missing]
        );
    }

    #[test]
    fn numeric_equality() {
        let out = filter(&table(), &FilterSpec::new("pop", 10.0)).unwrap();
        assert_eq!(matching_indices(&table(), &FilterSpec::new("pop", 10.0)).unwrap(), vec![0, 2]);
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn missing_never_matches() {
        let spec = FilterSpec::new("city", CellValue::Missing);
        assert!(filter(&table(), &spec).unwrap().is_empty());
    }

    #[test]
    fn zero_matches_is_an_empty_table() {
        let out = filter(&table(), &FilterSpec::new("city", "Z")).unwrap();
        assert_eq!(out.num_rows(), 0);
        assert_eq!(out.column_names(), vec!["city", "pop"]);
    }

    #[test]
    fn type_mismatch_does_not_match() {
        let out = filter(&table(), &FilterSpec::new("pop", "10")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = filter(&table(), &FilterSpec::new("country", "A")).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownColumn(c) if c == "country"));
    }
}
