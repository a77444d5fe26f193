use super::error::SchemaError;
use super::feature::FeatureCatalog;
use super::value::Value;

/// One dataset row. Cells are stored flat, indexed by column position in the
/// owning dataset's [`FeatureCatalog`]; empty cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Option<Value>>,
}

impl Row {
    #[must_use]
    pub fn new(cells: Vec<Option<Value>>) -> Self {
        Self { cells }
    }

    /// Cell value by column index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }
}

/// The full, unfiltered table together with the catalog derived from it.
///
/// Filters never mutate a dataset; they produce lists of row indices into it.
#[derive(Debug, Clone)]
pub struct Dataset {
    catalog: FeatureCatalog,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from a header and rows, deriving every feature's value
    /// domain from the non-empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the header is invalid (see
    /// [`FeatureCatalog::from_header`]) or a row's width differs from the header.
    pub fn new<S: AsRef<str>>(
        header: &[S],
        rows: Vec<Row>,
        label_column: &str,
    ) -> Result<Self, SchemaError> {
        let mut catalog = FeatureCatalog::from_header(header, label_column)?;
        for (idx, row) in rows.iter().enumerate() {
            if row.cells.len() != catalog.len() {
                return Err(SchemaError::RowWidth {
                    row: idx + 1,
                    expected: catalog.len(),
                    found: row.cells.len(),
                });
            }
            catalog.observe_row(&row.cells);
        }
        Ok(Self { catalog, rows })
    }

    #[must_use]
    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn row(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of every row, the starting point for filtering.
    #[must_use]
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }
}
