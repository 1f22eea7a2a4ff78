use crate::error::OutputError;
use crate::types::Table;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table as TextTable, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}

/// Export a dynamic table: header row then each row's string cells.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|c| c.as_text().unwrap_or_default()))?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = table.len(), "wrote csv");
    Ok(())
}

/// Render the first `max_rows` report rows as a Markdown table.
pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    TextTable::new(slice).with(Style::markdown()).to_string()
}

/// Render the first `max_rows` rows of a dynamic table as Markdown.
pub fn render_table(table: &Table, max_rows: usize) -> String {
    if table.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().cloned());
    for row in table.rows.iter().take(max_rows) {
        builder.push_record(row.iter().map(|c| c.as_text().unwrap_or_default()));
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_rows<T>(title: &str, rows: Option<&[T]>, max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    match rows {
        Some(rows) => println!("{}\n", render_rows(rows, max_rows)),
        None => println!("(no data: required columns not present)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, ProductCountRow};

    #[test]
    fn renders_markdown_and_empty_marker() {
        let rows = vec![
            ProductCountRow { product: "Alpha".into(), count: 3 },
            ProductCountRow { product: "Beta".into(), count: 1 },
        ];
        let out = render_rows(&rows, 1);
        assert!(out.contains("| Product |"));
        assert!(out.contains("Alpha"));
        assert!(!out.contains("Beta"));
        assert_eq!(render_rows::<ProductCountRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn dynamic_table_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.csv");
        let t = Table::new(
            vec!["Division".into(), "P1".into()],
            vec![vec![Cell::from_text("North"), Cell::Number(101.0)], vec![Cell::Empty, Cell::from_text("B")]],
        );
        write_table_csv(&path, &t).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Division,P1\nNorth,101\n,B\n");
        assert!(render_table(&t, 10).contains("North"));
    }
}
