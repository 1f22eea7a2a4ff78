//! Header detection and column canonicalization.
//!
//! Exports arrive with title rows above the real header and with column names
//! that drift between versions ("Product 1", "p1", "P1"). Everything
//! downstream only ever looks columns up by their canonical name.
use crate::types::{
    RawSheet, Table, CALL_WITH_CLM, CUSTOMER_ID, DATE, DIVISION, MONTH, OWNER_NAME, P1, P2, P3,
    P4, SPECIALITY, TERRITORY_CODE, YEAR_MONTH,
};
use std::collections::HashSet;
use tracing::debug;

const HEADER_HINTS: [&str; 9] = [
    "owner", "in-field", "p1", "p2", "territory", "division", "customer", "month", "date",
];

/// Pick the header row from the first `window` rows of a raw grid.
///
/// Best-effort heuristic: the first row whose lower-cased, space-joined
/// cells contain any header hint wins. Falls back to row 0.
pub fn detect_header_row(raw: &RawSheet, window: usize) -> usize {
    raw.rows
        .iter()
        .take(window)
        .position(|row| {
            let joined = row
                .iter()
                .filter_map(|c| c.as_text())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            HEADER_HINTS.iter().any(|hint| joined.contains(hint))
        })
        .unwrap_or(0)
}

/// Map a raw column name to its canonical name, if it is a recognized variant.
/// Rules are checked in order; the first match wins.
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    let name = raw.trim().to_lowercase();
    for (n, canonical) in [P1, P2, P3, P4].into_iter().enumerate() {
        let n = n + 1;
        if name == format!("p{n}") || name == format!("product{n}") || name == format!("product {n}")
        {
            return Some(canonical);
        }
    }
    if name.contains("owner name") || name.starts_with("in-field") {
        return Some(OWNER_NAME);
    }
    if name.contains("territory") && name.contains("code") {
        return Some(TERRITORY_CODE);
    }
    if name == "division" {
        return Some(DIVISION);
    }
    if name.contains("customer") && name.contains("id") {
        return Some(CUSTOMER_ID);
    }
    match name.as_str() {
        "year month" | "year-month" | "yr month" => return Some(YEAR_MONTH),
        "month" | "mnth" => return Some(MONTH),
        "date" | "call date" | "activity date" => return Some(DATE),
        "speciality" | "specialty" => return Some(SPECIALITY),
        _ => {}
    }
    if name.contains("clm") {
        return Some(CALL_WITH_CLM);
    }
    None
}

/// Trim and canonicalize a list of header names.
///
/// Each canonical name is given to the left-most column that claims it; later
/// claimants keep their trimmed name. Blank names become `Unnamed: <n>` and
/// any remaining duplicates get a numeric suffix, so the result is unique.
pub fn canonical_columns(raw: &[String]) -> Vec<String> {
    let mut claimed: HashSet<&'static str> = HashSet::new();
    let renamed: Vec<String> = raw
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return format!("Unnamed: {i}");
            }
            match canonical_name(trimmed) {
                Some(canonical) if claimed.insert(canonical) => {
                    if canonical != trimmed {
                        debug!(from = trimmed, to = canonical, "renamed column");
                    }
                    canonical.to_string()
                }
                _ => trimmed.to_string(),
            }
        })
        .collect();
    dedupe(renamed)
}

fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let mut k = 1;
            loop {
                let candidate = format!("{name}.{k}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                k += 1;
            }
        })
        .collect()
}

/// Build a table from a raw grid: detect the header row, use it as column
/// names, canonicalize them, and keep every non-blank row below it.
pub fn normalize(raw: &RawSheet, header_scan_rows: usize) -> Table {
    let header_idx = detect_header_row(raw, header_scan_rows);
    debug!(header_row = header_idx, "detected header row");
    let Some(header) = raw.rows.get(header_idx) else {
        return Table::default();
    };
    let names: Vec<String> = header
        .iter()
        .map(|c| c.as_text().unwrap_or_default())
        .collect();
    let rows = raw.rows[header_idx + 1..]
        .iter()
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .cloned()
        .collect();
    Table::new(canonical_columns(&names), rows)
}

/// Canonicalize the column names of an existing table. Idempotent.
pub fn normalize_columns(mut table: Table) -> Table {
    table.columns = canonical_columns(&table.columns);
    table
}
