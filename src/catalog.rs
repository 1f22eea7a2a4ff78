use crate::types::Table;
use std::collections::BTreeSet;

pub const ALL: &str = "All";

/// Distinct product identifiers across the present P1..P4 columns, sorted
/// ascending. Absent cells are skipped; empty when no product column exists.
pub fn product_catalog(table: &Table) -> Vec<String> {
    let cols = table.product_column_indices();
    let set: BTreeSet<String> = table
        .rows
        .iter()
        .flat_map(|row| cols.iter().filter_map(move |&i| row[i].as_text()))
        .collect();
    set.into_iter().collect()
}

/// Sorted distinct values of one column, or empty if the column is absent.
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    let Some(cells) = table.column(column) else {
        return Vec::new();
    };
    let set: BTreeSet<String> = cells.filter_map(|c| c.as_text()).collect();
    set.into_iter().collect()
}

/// Choices offered for a column filter: `All` followed by its distinct values.
pub fn filter_options(table: &Table, column: &str) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(distinct_values(table, column))
        .collect()
}

pub fn product_options(table: &Table) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(product_catalog(table))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, DIVISION, P1, P2, P4};

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| Cell::from_text(s)).collect())
                .collect(),
        )
    }

    #[test]
    fn catalog_is_sorted_and_deduplicated() {
        let t = table(
            &[P1, P2, P4],
            &[&["Zeta", "Alpha", ""], &["Alpha", "", "Mu"], &["Zeta", "Mu", "Alpha"]],
        );
        let catalog = product_catalog(&t);
        assert_eq!(catalog, vec!["Alpha", "Mu", "Zeta"]);
        assert!(catalog.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn catalog_is_empty_without_product_columns() {
        let t = table(&[DIVISION], &[&["North"]]);
        assert!(product_catalog(&t).is_empty());
        assert_eq!(product_options(&t), vec![ALL]);
    }

    #[test]
    fn numeric_products_collapse_with_text() {
        let t = Table::new(
            vec![P1.into(), P2.into()],
            vec![vec![Cell::Number(101.0), Cell::from_text("101")]],
        );
        assert_eq!(product_catalog(&t), vec!["101"]);
    }

    #[test]
    fn options_start_with_all() {
        let t = table(&[DIVISION], &[&["South"], &["North"], &[""], &["South"]]);
        assert_eq!(filter_options(&t, DIVISION), vec![ALL, "North", "South"]);
        assert_eq!(filter_options(&t, "Territory Code"), vec![ALL]);
    }
}
