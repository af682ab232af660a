use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A typed cell. The tag is decided once per column at load time and never
/// re-inferred downstream.
///
/// Whole-number columns keep their values exact as `Integer`; any other
/// numeric column holds `Number`. The two compare numerically, so
/// `Integer(10) == Number(10.0)`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Integer(i128),
    Number(f64),
    Text(String),
    Missing,
}

// -- Manual Eq/Ord/Hash so CellValue can be grouped and sorted --

fn cmp_numbers(a: f64, b: f64) -> Ordering {
    // partial_cmp first so that -0.0 == 0.0
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

fn cmp_integer_number(a: i128, b: f64) -> Ordering {
    match (a as f64).partial_cmp(&b) {
        Some(Ordering::Equal) => a.cmp(&(b as i128)),
        Some(order) => order,
        None => (a as f64).total_cmp(&b),
    }
}

/// `Some` when `f` is a whole number representable as `i128`.
fn whole(f: f64) -> Option<i128> {
    (f.fract() == 0.0 && f >= i128::MIN as f64 && f < i128::MAX as f64).then(|| f as i128)
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Integer(_) | Number(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Number(a), Number(b)) => cmp_numbers(*a, *b),
            (Integer(a), Number(b)) => cmp_integer_number(*a, *b),
            (Number(a), Integer(b)) => cmp_integer_number(*b, *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Equal numbers must hash alike whichever variant holds them.
        match self {
            CellValue::Missing => 0u8.hash(state),
            CellValue::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            CellValue::Number(f) => match whole(*f) {
                Some(i) => {
                    1u8.hash(state);
                    i.hash(state);
                }
                None => {
                    2u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            CellValue::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Missing => write!(f, "<null>"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v.into())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl CellValue {
    /// Build a numeric cell. NaN and infinities become `Missing`; `-0.0`
    /// becomes `0.0`.
    pub fn number(v: f64) -> Self {
        if !v.is_finite() {
            CellValue::Missing
        } else if v == 0.0 {
            CellValue::Number(0.0)
        } else {
            CellValue::Number(v)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// The numeric value; large integers are rounded to the nearest `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The delimited-text representation: missing cells become an empty field.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            CellValue::Integer(i) => Cow::Owned(i.to_string()),
            CellValue::Number(v) => Cow::Owned(v.to_string()),
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Missing => Cow::Borrowed(""),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Numeric,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// A named, typed sequence of cells. Every non-missing cell matches `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnType,
    values: Vec<CellValue>,
}

impl Column {
    pub fn numeric<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Column {
            name: name.into(),
            kind: ColumnType::Numeric,
            values: values
                .into_iter()
                .map(|v| v.map_or(CellValue::Missing, CellValue::number))
                .collect(),
        }
    }

    /// A numeric column of whole numbers, kept exact.
    pub fn integers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i128>>,
    {
        Column {
            name: name.into(),
            kind: ColumnType::Numeric,
            values: values
                .into_iter()
                .map(|v| v.map_or(CellValue::Missing, CellValue::Integer))
                .collect(),
        }
    }

    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Column {
            name: name.into(),
            kind: ColumnType::Text,
            values: values
                .into_iter()
                .map(|v| v.map_or(CellValue::Missing, |s| CellValue::Text(s.into())))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnType::Numeric
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-missing cells in row order.
    pub fn present(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    /// Non-missing numeric cells as `f64`, in row order (empty for text
    /// columns).
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(CellValue::as_f64)
    }

    fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded dataset
// ---------------------------------------------------------------------------

/// Ordered named columns of equal length. Immutable once built: filtering
/// produces a new `Table`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Assemble a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DashboardError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        let n_rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(DashboardError::InvalidTable(format!(
                "column '{}' has {} values, expected {n_rows}",
                bad.name,
                bad.len()
            )));
        }
        Ok(Table { columns, n_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.n_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Table::column`] but reports an absent column as an error.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(Column::name)
            .collect()
    }

    /// The cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        (index < self.n_rows).then(|| self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.n_rows).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Distinct non-missing values of a column, in first-seen order.
    pub fn unique_values(&self, name: &str) -> Result<Vec<CellValue>> {
        let column = self.require_column(name)?;
        let mut seen = HashSet::new();
        Ok(column
            .present()
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect())
    }

    /// A new table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasher, RandomState};

    use super::*;

    fn city_table() -> Table {
        Table::new(vec![
            Column::text("city", [Some("A"), Some("B"), None, Some("A")]),
            Column::numeric("pop", [Some(10.0), Some(20.0), Some(5.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::numeric("a", [Some(1.0)]),
            Column::numeric("a", [Some(2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTable(_)));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0)]),
            Column::numeric("b", [Some(2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTable(_)));
    }

    #[test]
    fn unique_values_skip_missing_and_keep_first_seen_order() {
        let table = city_table();
        assert_eq!(
            table.unique_values("city").unwrap(),
            vec![CellValue::from("A"), CellValue::from("B")]
        );
        assert!(matches!(
            table.unique_values("nope"),
            Err(DashboardError::UnknownColumn(_))
        ));
    }

    #[test]
    fn numeric_columns_only_lists_numbers() {
        assert_eq!(city_table().numeric_columns(), vec!["pop"]);
    }

    #[test]
    fn number_normalises_nan_and_negative_zero() {
        assert_eq!(CellValue::number(f64::NAN), CellValue::Missing);
        assert_eq!(CellValue::number(-0.0), CellValue::Number(0.0));
        assert_eq!(
            CellValue::number(-0.0).cmp(&CellValue::number(0.0)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn number_drops_infinities() {
        assert_eq!(CellValue::number(f64::INFINITY), CellValue::Missing);
        assert_eq!(CellValue::number(f64::NEG_INFINITY), CellValue::Missing);
    }

    #[test]
    fn signed_zeros_are_one_value() {
        let (neg, pos) = (CellValue::Number(-0.0), CellValue::Number(0.0));
        assert_eq!(neg, pos);
        let hasher = RandomState::new();
        assert_eq!(hasher.hash_one(&neg), hasher.hash_one(&pos));

        let distinct: HashSet<CellValue> = [neg, pos].into_iter().collect();
        assert_eq!(distinct.len(), 1);
    }

    #[test]
    fn integers_and_floats_compare_numerically() {
        let hasher = RandomState::new();
        assert_eq!(CellValue::Integer(10), CellValue::Number(10.0));
        assert_eq!(
            hasher.hash_one(CellValue::Integer(10)),
            hasher.hash_one(CellValue::Number(10.0))
        );
        assert!(CellValue::Integer(2) < CellValue::Number(2.5));
        assert!(CellValue::Number(-1.5) < CellValue::Integer(-1));

        // 2^53 + 1 has no f64 of its own
        let big = CellValue::Integer(9_007_199_254_740_993);
        assert_ne!(big, CellValue::Number(9_007_199_254_740_992.0));
        assert!(big > CellValue::Number(9_007_199_254_740_992.0));
        assert!(CellValue::Missing < CellValue::Integer(i128::MIN));
        assert!(CellValue::Integer(i128::MAX) < CellValue::from(""));
    }

    #[test]
    fn integer_columns_stay_exact() {
        let col = Column::integers("id", [Some(12_345_678_901_234_567_890), None]);
        assert!(col.is_numeric());
        assert_eq!(col.values()[0].to_field(), "12345678901234567890");
        assert_eq!(col.values()[1], CellValue::Missing);
    }

    #[test]
    fn fields_render_missing_as_empty() {
        assert_eq!(CellValue::Missing.to_field(), "");
        assert_eq!(CellValue::from(10.0).to_field(), "10");
        assert_eq!(CellValue::from(2.5).to_field(), "2.5");
        assert_eq!(CellValue::from("x").to_field(), "x");
    }

    #[test]
    fn take_rows_preserves_columns() {
        let table = city_table();
        let sub = table.take_rows(&[3, 0]);
        assert_eq!(sub.num_rows(), 2);
        assert_eq!(sub.column_names(), vec!["city", "pop"]);
        assert_eq!(sub.row(0).unwrap(), vec![&CellValue::from("A"), &CellValue::Missing]);
        assert!(sub.row(2).is_none());
    }
}
