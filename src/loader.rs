use crate::derive::add_derived_fields;
use crate::error::LoadError;
use crate::schema::normalize;
use crate::types::{Cell, RawSheet, Table};
use crate::util::{excel_serial_to_date, parse_date_safe};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// How the bytes of an input file are tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Delimited(u8),
    Spreadsheet,
}

impl SourceFormat {
    /// Pick a format from the file extension. Unknown extensions are read as
    /// comma-separated text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => SourceFormat::Spreadsheet,
            "tsv" => SourceFormat::Delimited(b'\t'),
            _ => SourceFormat::Delimited(b','),
        }
    }
}

/// Tokenize file content into a raw grid, without assuming any header row.
pub fn read_raw(bytes: &[u8], format: SourceFormat) -> Result<RawSheet, LoadError> {
    let rows = match format {
        SourceFormat::Delimited(delim) => read_delimited(bytes, delim)?,
        SourceFormat::Spreadsheet => read_first_sheet(bytes)?,
    };
    let rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .collect();
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let rows = rows
        .into_iter()
        .map(|mut r| {
            r.resize(width, Cell::Empty);
            r
        })
        .collect();
    Ok(RawSheet { rows })
}

fn read_delimited(bytes: &[u8], delim: u8) -> Result<Vec<Vec<Cell>>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delim)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }
    Ok(rows)
}

fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoSheet)?;
    debug!(sheet = %first, "reading first sheet");
    let range = workbook.worksheet_range(&first)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect())
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_date_safe(Some(s))
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::from_text(s)),
        Data::DurationIso(s) => Cell::from_text(s),
    }
}

/// Full load pipeline over in-memory content: tokenize, pick the header,
/// canonicalize column names, add date-derived fields.
pub fn load_table(
    bytes: &[u8],
    format: SourceFormat,
    header_scan_rows: usize,
) -> Result<Table, LoadError> {
    let raw = read_raw(bytes, format)?;
    let table = normalize(&raw, header_scan_rows);
    let table = add_derived_fields(table);
    info!(
        rows = table.len(),
        columns = table.columns.len(),
        "normalized table"
    );
    Ok(table)
}

/// Processed tables keyed by the BLAKE3 hash of the file bytes and the format
/// they were tokenized with.
///
/// Owned by the session; loading byte-identical content twice in the same
/// format returns the first result without re-parsing.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<(String, SourceFormat), Table>,
    header_scan_rows: usize,
}

impl LoadCache {
    pub fn new(header_scan_rows: usize) -> Self {
        Self {
            entries: HashMap::new(),
            header_scan_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load_path(&mut self, path: &Path) -> Result<Table, LoadError> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        self.load_bytes(&bytes, SourceFormat::from_path(path))
    }

    pub fn load_bytes(&mut self, bytes: &[u8], format: SourceFormat) -> Result<Table, LoadError> {
        let key = (blake3::hash(bytes).to_hex().to_string(), format);
        if let Some(table) = self.entries.get(&key) {
            debug!(hash = %key.0, ?format, "load cache hit");
            return Ok(table.clone());
        }
        debug!(hash = %key.0, ?format, "load cache miss");
        let table = load_table(bytes, format, self.header_scan_rows)?;
        self.entries.insert(key, table.clone());
        Ok(table)
    }
}
