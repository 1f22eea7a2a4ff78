//! Row filter chain.
//!
//! Every stage is a restriction of the row set, so stages commute. A stage
//! whose column is missing passes the table through unchanged.
use crate::catalog::ALL;
use crate::types::{Table, DIVISION, MONTH, OWNER_NAME, TERRITORY_CODE};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// One filter choice: everything, or rows matching a single value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    /// `"All"` maps to `Selection::All`, anything else to a value.
    pub fn parse(s: &str) -> Self {
        if s == ALL {
            Selection::All
        } else {
            Selection::Value(s.to_string())
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Value(v) => f.write_str(v),
        }
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Month,
    Employee,
    Division,
    Territory,
    Product,
}

impl FilterStage {
    pub const ORDER: [FilterStage; 5] = [
        FilterStage::Month,
        FilterStage::Employee,
        FilterStage::Division,
        FilterStage::Territory,
        FilterStage::Product,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterStage::Month => "Month",
            FilterStage::Employee => "Employee / Owner",
            FilterStage::Division => "Division",
            FilterStage::Territory => "Territory",
            FilterStage::Product => "Product",
        }
    }

    /// Target column of an equality stage. `None` for the product stage,
    /// which spans P1..P4.
    pub fn column(self) -> Option<&'static str> {
        match self {
            FilterStage::Month => Some(MONTH),
            FilterStage::Employee => Some(OWNER_NAME),
            FilterStage::Division => Some(DIVISION),
            FilterStage::Territory => Some(TERRITORY_CODE),
            FilterStage::Product => None,
        }
    }

    pub fn apply(self, table: &Table, selection: &Selection) -> Table {
        let Selection::Value(wanted) = selection else {
            return table.clone();
        };
        match self.column() {
            Some(column) => {
                let Some(idx) = table.column_index(column) else {
                    debug!(stage = self.label(), "column absent, stage skipped");
                    return table.clone();
                };
                table.retain_rows(|row| row[idx].as_text().as_deref() == Some(wanted.as_str()))
            }
            None => {
                let cols = table.product_column_indices();
                if cols.is_empty() {
                    debug!(stage = self.label(), "no product columns, stage skipped");
                    return table.clone();
                }
                table.retain_rows(|row| {
                    cols.iter()
                        .any(|&i| row[i].as_text().as_deref() == Some(wanted.as_str()))
                })
            }
        }
    }
}

/// The five user selections driving the chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSet {
    pub month: Selection,
    pub employee: Selection,
    pub division: Selection,
    pub territory: Selection,
    pub product: Selection,
}

impl FilterSet {
    pub fn get(&self, stage: FilterStage) -> &Selection {
        match stage {
            FilterStage::Month => &self.month,
            FilterStage::Employee => &self.employee,
            FilterStage::Division => &self.division,
            FilterStage::Territory => &self.territory,
            FilterStage::Product => &self.product,
        }
    }

    pub fn set(&mut self, stage: FilterStage, selection: Selection) {
        let slot = match stage {
            FilterStage::Month => &mut self.month,
            FilterStage::Employee => &mut self.employee,
            FilterStage::Division => &mut self.division,
            FilterStage::Territory => &mut self.territory,
            FilterStage::Product => &mut self.product,
        };
        *slot = selection;
    }

    /// Apply the stages in the given order.
    pub fn apply_in_order(&self, table: &Table, order: &[FilterStage]) -> Table {
        order
            .iter()
            .fold(table.clone(), |acc, stage| stage.apply(&acc, self.get(*stage)))
    }

    /// Apply all stages in the standard Month → Employee → Division →
    /// Territory → Product order. The input table is never modified.
    pub fn apply(&self, table: &Table) -> Table {
        let out = self.apply_in_order(table, &FilterStage::ORDER);
        debug!(before = table.len(), after = out.len(), "filters applied");
        out
    }
}
