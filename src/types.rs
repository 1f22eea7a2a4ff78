use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

pub const P1: &str = "P1";
pub const P2: &str = "P2";
pub const P3: &str = "P3";
pub const P4: &str = "P4";
pub const PRODUCT_COLUMNS: [&str; 4] = [P1, P2, P3, P4];
pub const OWNER_NAME: &str = "In-Field Activity: Owner Name";
pub const TERRITORY_CODE: &str = "Territory Code";
pub const DIVISION: &str = "Division";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const YEAR_MONTH: &str = "Year Month";
pub const MONTH: &str = "Month";
pub const DATE: &str = "Date";
pub const CALL_WITH_CLM: &str = "Call with CLM";
pub const SPECIALITY: &str = "Speciality";

/// A single cell value as read from a CSV or spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    /// Build a cell from raw delimited text. Empty strings are absent.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// String representation used for every comparison in the crate:
    /// filters, catalogs, grouping keys.
    ///
    /// Integral numbers drop the fractional part so a product code stored as
    /// `101.0` in a spreadsheet compares equal to the text `"101"`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_cell_number(*n)),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Cell::Empty => None,
        }
    }
}

fn format_cell_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// An ordered, column-named table of cells.
///
/// `index` holds each row's position in the table it was first built from, so
/// filtered views can still point back at the original rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub index: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Cell::Empty);
                r
            })
            .collect();
        let index = (0..rows.len()).collect();
        Table {
            columns,
            rows,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate the cells of one column, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Indices of the P1..P4 columns that are present, in P1..P4 order.
    pub fn product_column_indices(&self) -> Vec<usize> {
        PRODUCT_COLUMNS
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect()
    }

    /// Keep the rows for which `keep` returns true. Never mutates `self`.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let mut rows = Vec::new();
        let mut index = Vec::new();
        for (row, idx) in self.rows.iter().zip(&self.index) {
            if keep(row) {
                rows.push(row.clone());
                index.push(*idx);
            }
        }
        Table {
            columns: self.columns.clone(),
            rows,
            index,
        }
    }

    /// Append a column. `cells` is padded with `Empty` (or truncated) to
    /// one cell per row, so every row stays as wide as `columns`.
    pub fn push_column(&mut self, name: &str, mut cells: Vec<Cell>) {
        cells.resize(self.rows.len(), Cell::Empty);
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }
}

/// A raw grid read from a file before any header is chosen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheet {
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TrendRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Total Calls")]
    #[tabled(rename = "Total Calls")]
    pub total_calls: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ProductCountRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct EmployeeCallsRow {
    #[serde(rename = "Employee")]
    #[tabled(rename = "Employee")]
    pub employee: String,
    #[serde(rename = "Total Calls")]
    #[tabled(rename = "Total Calls")]
    pub total_calls: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SpecialityProductRow {
    #[serde(rename = "Speciality")]
    #[tabled(rename = "Speciality")]
    pub speciality: String,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Kpis {
    pub total_calls: usize,
    pub unique_customers: Option<usize>,
    pub products_discussed: usize,
    pub clm_calls: usize,
}
