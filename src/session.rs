use crate::catalog::{filter_options, product_options};
use crate::config::Config;
use crate::error::LoadError;
use crate::filters::{FilterSet, FilterStage, Selection};
use crate::loader::LoadCache;
use crate::reports::{
    calls_trend, compute_kpis, product_speciality_matrix, top_employees, top_products,
};
use crate::types::{
    EmployeeCallsRow, Kpis, ProductCountRow, SpecialityProductRow, Table, TrendRow,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything shown for one set of filter selections.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub filtered: Table,
    pub kpis: Kpis,
    pub trend: Option<Vec<TrendRow>>,
    pub top_products: Option<Vec<ProductCountRow>>,
    pub top_employees: Option<Vec<EmployeeCallsRow>>,
    pub matrix: Option<Vec<SpecialityProductRow>>,
}

/// Contents of `summary.json`.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub source: String,
    pub filters: &'a FilterSet,
    pub kpis: &'a Kpis,
}

/// State for one interactive user: the load cache, the current table and
/// the current filter selections.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    cache: LoadCache,
    table: Option<Table>,
    source: Option<PathBuf>,
    filters: FilterSet,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let cache = LoadCache::new(config.header_scan_rows);
        Self {
            config,
            cache,
            table: None,
            source: None,
            filters: FilterSet::default(),
        }
    }

    /// Load a file, replacing the current table and resetting filters. On
    /// failure the previously loaded table stays in place.
    pub fn load(&mut self, path: &Path) -> Result<&Table, LoadError> {
        let table = self.cache.load_path(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "load failed");
            e
        })?;
        info!(path = %path.display(), rows = table.len(), "loaded");
        self.source = Some(path.to_path_buf());
        self.filters = FilterSet::default();
        Ok(self.table.insert(table))
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn cached_files(&self) -> usize {
        self.cache.len()
    }

    /// Choices for one filter, computed from the full (unfiltered) table.
    pub fn options(&self, stage: FilterStage) -> Vec<String> {
        let Some(table) = &self.table else {
            return Vec::new();
        };
        match stage.column() {
            Some(column) => filter_options(table, column),
            None => product_options(table),
        }
    }

    pub fn set_filter(&mut self, stage: FilterStage, selection: Selection) {
        self.filters.set(stage, selection);
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterSet::default();
    }

    /// Filter the loaded table and run every aggregation.
    pub fn reports(&self) -> Option<ReportBundle> {
        let table = self.table.as_ref()?;
        let filtered = self.filters.apply(table);
        Some(ReportBundle {
            kpis: compute_kpis(&filtered),
            trend: calls_trend(&filtered),
            top_products: top_products(&filtered, self.config.top_products),
            top_employees: top_employees(&filtered, self.config.top_employees),
            matrix: product_speciality_matrix(&filtered),
            filtered,
        })
    }

    pub fn summary<'a>(&'a self, bundle: &'a ReportBundle) -> Summary<'a> {
        Summary {
            source: self
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            filters: &self.filters,
            kpis: &bundle.kpis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let good = csv_file("Division,P1\nNorth,A\n");
        let mut session = Session::new(Config::default());
        session.load(good.path()).unwrap();
        let missing = good.path().with_extension("missing.csv");
        assert!(session.load(&missing).is_err());
        assert_eq!(session.table().unwrap().len(), 1);
        assert_eq!(session.source(), Some(good.path()));
    }

    #[test]
    fn reload_resets_filters_and_hits_cache() {
        let f = csv_file("Division,P1\nNorth,A\nSouth,B\n");
        let mut session = Session::new(Config::default());
        session.load(f.path()).unwrap();
        session.set_filter(FilterStage::Division, Selection::parse("North"));
        assert_eq!(session.reports().unwrap().kpis.total_calls, 1);
        session.load(f.path()).unwrap();
        assert_eq!(session.filters(), &FilterSet::default());
        assert_eq!(session.cached_files(), 1);
    }

    #[test]
    fn options_come_from_unfiltered_table() {
        let f = csv_file("Division,P1,P2\nNorth,A,B\nSouth,C,\n");
        let mut session = Session::new(Config::default());
        session.load(f.path()).unwrap();
        session.set_filter(FilterStage::Division, Selection::parse("North"));
        assert_eq!(session.options(FilterStage::Division), vec!["All", "North", "South"]);
        assert_eq!(session.options(FilterStage::Product), vec!["All", "A", "B", "C"]);
        assert_eq!(session.options(FilterStage::Month), vec!["All"]);
    }
}
