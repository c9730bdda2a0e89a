//! Uniform tabular model shared by every payload kind

use ahash::AHashSet;
use std::borrow::Cow;
use thiserror::Error;

/// Literal substituted for every cell of a redacted column
pub const MASK: &str = "***";

/// Single typed value
#[derive(Debug, Clone)]
pub enum Cell {
    /// Missing or empty value
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer above `i64::MAX`; smaller values are `Int`
    UInt(u64),
    /// Finite or non-finite double
    Float(f64),
    /// UTF-8 text
    Text(String),
}

/// Type of a cell, or the declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Null
    Null,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Unsigned integer above `i64::MAX`
    UInt,
    /// Float
    Float,
    /// Text
    Text,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::UInt(a), Cell::UInt(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a.total_cmp(b).is_eq(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Cell {
    /// The mask literal as a text cell
    pub fn mask() -> Self {
        Cell::Text(MASK.to_string())
    }

    /// Type of this cell
    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::Null => CellType::Null,
            Cell::Bool(_) => CellType::Bool,
            Cell::Int(_) => CellType::Int,
            Cell::UInt(_) => CellType::UInt,
            Cell::Float(_) => CellType::Float,
            Cell::Text(_) => CellType::Text,
        }
    }

    /// Infer a cell from a delimited-text field.
    ///
    /// A type is only chosen when rendering the value gives back the exact
    /// source text, so `007`, `1.0` and `1e3` stay text.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Cell::Null;
        }
        match raw {
            "true" => return Cell::Bool(true),
            "false" => return Cell::Bool(false),
            _ => {}
        }
        if let Ok(int) = raw.parse::<i64>() {
            if int.to_string() == raw {
                return Cell::Int(int);
            }
        }
        if let Ok(uint) = raw.parse::<u64>() {
            if uint.to_string() == raw {
                return Cell::UInt(uint);
            }
        }
        if let Ok(float) = raw.parse::<f64>() {
            if float.is_finite() && float.to_string() == raw {
                return Cell::Float(float);
            }
        }
        Cell::Text(raw.to_string())
    }

    /// Render for delimited text; `Null` renders empty
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed(""),
            Cell::Bool(true) => Cow::Borrowed("true"),
            Cell::Bool(false) => Cow::Borrowed("false"),
            Cell::Int(v) => Cow::Owned(v.to_string()),
            Cell::UInt(v) => Cow::Owned(v.to_string()),
            Cell::Float(v) => Cow::Owned(v.to_string()),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Whether this is the mask literal
    pub fn is_mask(&self) -> bool {
        matches!(self, Cell::Text(s) if s == MASK)
    }
}

/// Violations of the model invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Two columns share a name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    /// A column's length differs from the row count.
    #[error("column '{column}' has {actual} cells, expected {expected}")]
    RaggedColumn {
        /// Offending column.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Cells found in the column.
        actual: usize,
    },
}

/// Named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    declared_type: Option<CellType>,
    cells: Vec<Cell>,
}

impl Column {
    /// Build a column, deriving its declared type from the cells
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let declared_type = declared_type_of(&cells);
        Self {
            name: name.into(),
            declared_type,
            cells,
        }
    }

    /// Build a column whose declared type is known from the source
    pub fn with_declared(
        name: impl Into<String>,
        declared_type: Option<CellType>,
        cells: Vec<Cell>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type,
            cells,
        }
    }

    /// Column of `rows` mask cells, declared text whatever the source type
    pub fn masked(name: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            declared_type: Some(CellType::Text),
            cells: vec![Cell::mask(); rows],
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type, `None` when the cells mix types
    pub fn declared_type(&self) -> Option<CellType> {
        self.declared_type
    }

    /// Cells in row order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the column has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Shared type of the non-null cells; all-null columns declare `Null`.
fn declared_type_of(cells: &[Cell]) -> Option<CellType> {
    let mut declared = CellType::Null;
    for cell in cells {
        match (declared, cell.cell_type()) {
            (_, CellType::Null) => {}
            (CellType::Null, ty) => declared = ty,
            (current, ty) if current == ty => {}
            _ => return None,
        }
    }
    Some(declared)
}

/// Ordered, uniquely named columns of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct TabularModel {
    columns: Vec<Column>,
    row_count: usize,
}

impl TabularModel {
    /// Validate and build a model of `row_count` rows
    pub fn new(columns: Vec<Column>, row_count: usize) -> Result<Self, TableError> {
        let mut seen = AHashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != row_count {
                return Err(TableError::RaggedColumn {
                    column: column.name().to_string(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Rows in every column
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Columns in source order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in source order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Look up a column by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Whether a column with this exact name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cells of one row in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells()[index]).collect())
    }
}
