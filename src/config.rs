use std::path::PathBuf;
use tracing::warn;

/// Runtime knobs. Defaults match the dashboard layout; each can be
/// overridden with a `CALL_REPORT_*` environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub out_dir: PathBuf,
    /// How many leading rows are scanned when looking for the header row.
    pub header_scan_rows: usize,
    pub top_products: usize,
    pub top_employees: usize,
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
            header_scan_rows: 20,
            top_products: 10,
            top_employees: 15,
            preview_rows: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable numbers are
    /// ignored and the default kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(dir) = lookup("CALL_REPORT_OUT_DIR").filter(|s| !s.trim().is_empty()) {
            cfg.out_dir = PathBuf::from(dir.trim());
        }
        let numeric = [
            ("CALL_REPORT_HEADER_SCAN", &mut cfg.header_scan_rows),
            ("CALL_REPORT_TOP_PRODUCTS", &mut cfg.top_products),
            ("CALL_REPORT_TOP_EMPLOYEES", &mut cfg.top_employees),
            ("CALL_REPORT_PREVIEW_ROWS", &mut cfg.preview_rows),
        ];
        for (key, slot) in numeric {
            let Some(raw) = lookup(key) else { continue };
            match raw.trim().parse::<usize>() {
                Ok(v) if v > 0 => *slot = v,
                _ => warn!(key, value = %raw, "ignoring invalid setting"),
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CALL_REPORT_OUT_DIR", "out"),
            ("CALL_REPORT_TOP_PRODUCTS", "5"),
            ("CALL_REPORT_TOP_EMPLOYEES", "zero"),
        ]
        .into_iter()
        .collect();
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.out_dir, PathBuf::from("out"));
        assert_eq!(cfg.top_products, 5);
        assert_eq!(cfg.top_employees, 15);
        assert_eq!(cfg.header_scan_rows, 20);
    }
}
