//! Call activity reporting: load a loosely structured call export, bring its
//! columns to canonical names, filter it, and summarize it.
pub mod catalog;
pub mod config;
pub mod derive;
pub mod error;
pub mod filters;
pub mod loader;
pub mod output;
pub mod reports;
pub mod schema;
pub mod session;
pub mod types;
pub mod util;
