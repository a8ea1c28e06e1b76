//! In-memory string table.

/// Rows of string values under named columns
///
/// Every value is a string; empty CSV fields are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).and_then(|v| v.as_deref()))
                .collect(),
        )
    }

    /// Project the table onto `order`, matching columns by name
    ///
    /// Returns `None` if any requested column is missing.
    pub fn select(&self, order: &[String]) -> Option<CsvTable> {
        let indices = order
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Option<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Some(CsvTable {
            columns: order.to_vec(),
            rows,
        })
    }
}
