use crate::types::{Cell, Table, DATE, MONTH, YEAR_MONTH};
use crate::util::cell_to_date;
use tracing::debug;

/// Parse the `Date` column in place and add `Month` / `Year Month` when the
/// table does not already carry them.
///
/// Unparseable dates become `Empty`; their rows stay in the table with empty
/// derived fields. Existing `Month` / `Year Month` columns are never touched.
pub fn add_derived_fields(mut table: Table) -> Table {
    let Some(date_idx) = table.column_index(DATE) else {
        return table;
    };
    let mut invalid = 0usize;
    for row in &mut table.rows {
        let parsed = cell_to_date(&row[date_idx]);
        if parsed.is_none() && !row[date_idx].is_empty() {
            invalid += 1;
        }
        row[date_idx] = parsed.map(Cell::Date).unwrap_or(Cell::Empty);
    }
    if invalid > 0 {
        debug!(invalid, "unparseable dates cleared");
    }

    let dates: Vec<Option<chrono::NaiveDate>> = table
        .rows
        .iter()
        .map(|r| match r[date_idx] {
            Cell::Date(d) => Some(d),
            _ => None,
        })
        .collect();

    if !table.has_column(MONTH) {
        let cells = dates
            .iter()
            .map(|d| match d {
                Some(d) => Cell::Text(d.format("%b").to_string()),
                None => Cell::Empty,
            })
            .collect();
        table.push_column(MONTH, cells);
    }
    if !table.has_column(YEAR_MONTH) {
        let cells = dates
            .iter()
            .map(|d| match d {
                Some(d) => Cell::Text(d.format("%Y-%m").to_string()),
                None => Cell::Empty,
            })
            .collect();
        table.push_column(YEAR_MONTH, cells);
    }
    table
}
