use crate::catalog::product_catalog;
use crate::types::{
    EmployeeCallsRow, Kpis, ProductCountRow, SpecialityProductRow, Table, TrendRow,
    CALL_WITH_CLM, CUSTOMER_ID, MONTH, OWNER_NAME, SPECIALITY, YEAR_MONTH,
};
use crate::util::{parse_month_period, parse_year_month, Period};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Counts keyed by value, remembering the order keys were first seen so that
/// a stable sort breaks ties by first encounter.
#[derive(Default)]
struct EncounterCounts {
    order: Vec<(String, usize)>,
    slots: HashMap<String, usize>,
}

impl EncounterCounts {
    fn add(&mut self, key: String) {
        match self.slots.get(&key) {
            Some(&slot) => self.order[slot].1 += 1,
            None => {
                self.slots.insert(key.clone(), self.order.len());
                self.order.push((key, 1));
            }
        }
    }

    /// Highest counts first; equal counts keep encounter order.
    fn top(mut self, limit: usize) -> Vec<(String, usize)> {
        self.order.sort_by(|a, b| b.1.cmp(&a.1));
        self.order.truncate(limit);
        self.order
    }
}

/// Calls per period, oldest first. Uses `Year Month` when present and falls
/// back to bare `Month`. Unparseable periods are left out of the trend only.
pub fn calls_trend(data: &Table) -> Option<Vec<TrendRow>> {
    let (idx, with_year) = match data.column_index(YEAR_MONTH) {
        Some(idx) => (idx, true),
        None => (data.column_index(MONTH)?, false),
    };
    let mut counts: BTreeMap<Period, usize> = BTreeMap::new();
    for row in &data.rows {
        let period = if with_year {
            parse_year_month(&row[idx])
        } else {
            parse_month_period(&row[idx])
        };
        if let Some(period) = period {
            *counts.entry(period).or_default() += 1;
        }
    }
    Some(
        counts
            .into_iter()
            .map(|(period, total_calls)| TrendRow {
                period: period.to_string(),
                total_calls,
            })
            .collect(),
    )
}

/// Most discussed products across P1..P4.
///
/// Cells are walked column by column (all of P1, then P2, ...), which fixes
/// the encounter order used for ties.
pub fn top_products(data: &Table, limit: usize) -> Option<Vec<ProductCountRow>> {
    let cols = data.product_column_indices();
    if cols.is_empty() {
        return None;
    }
    let mut counts = EncounterCounts::default();
    for &col in &cols {
        for row in &data.rows {
            if let Some(product) = row[col].as_text() {
                counts.add(product);
            }
        }
    }
    Some(
        counts
            .top(limit)
            .into_iter()
            .map(|(product, count)| ProductCountRow { product, count })
            .collect(),
    )
}

pub fn top_employees(data: &Table, limit: usize) -> Option<Vec<EmployeeCallsRow>> {
    let idx = data.column_index(OWNER_NAME)?;
    let mut counts = EncounterCounts::default();
    for row in &data.rows {
        if let Some(owner) = row[idx].as_text() {
            counts.add(owner);
        }
    }
    Some(
        counts
            .top(limit)
            .into_iter()
            .map(|(employee, total_calls)| EmployeeCallsRow {
                employee,
                total_calls,
            })
            .collect(),
    )
}

/// Full product × speciality cross-tabulation, sorted by speciality then
/// product. Needs `Speciality` and at least one product column.
pub fn product_speciality_matrix(data: &Table) -> Option<Vec<SpecialityProductRow>> {
    let spec_idx = data.column_index(SPECIALITY)?;
    let cols = data.product_column_indices();
    if cols.is_empty() {
        return None;
    }
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in &data.rows {
        let Some(speciality) = row[spec_idx].as_text() else {
            continue;
        };
        for &col in &cols {
            if let Some(product) = row[col].as_text() {
                *counts.entry((speciality.clone(), product)).or_default() += 1;
            }
        }
    }
    Some(
        counts
            .into_iter()
            .map(|((speciality, product), count)| SpecialityProductRow {
                speciality,
                product,
                count,
            })
            .collect(),
    )
}

pub fn compute_kpis(data: &Table) -> Kpis {
    let unique_customers = data.column(CUSTOMER_ID).map(|cells| {
        cells
            .filter_map(|c| c.as_text())
            .collect::<HashSet<_>>()
            .len()
    });
    let clm_calls = data
        .column(CALL_WITH_CLM)
        .map(|cells| {
            cells
                .filter(|c| {
                    c.as_text()
                        .is_some_and(|s| s.trim().to_uppercase() == "YES")
                })
                .count()
        })
        .unwrap_or(0);
    Kpis {
        total_calls: data.len(),
        unique_customers,
        products_discussed: product_catalog(data).len(),
        clm_calls,
    }
}
