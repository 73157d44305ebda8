//! # Ledger Synth
//!
//! Generates synthetic plain-text accounting entries from a list of recurring or
//! one-off transaction definitions, for seeding ledger tools with realistic data.
//!
//! ## Core Concepts
//!
//! - **Entry Definition**: A template with payee(s), an optional date window, a
//!   recurrence rule (`once`, `day`, `dow`, `probability`) and posting lines
//! - **Posting**: An account plus a fixed amount, a triangular amount range, or no
//!   amount at all (the ledger tool balances the entry against it)
//! - **Firing**: A definition producing a rendered entry for one date
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_synth::*;
//! use rand::SeedableRng;
//!
//! let json = r#"[{"payee": "Landlord", "day": 1,
//!                 "postings": [["Expenses:Rent", 1200], ["Assets:Checking"]]}]"#;
//!
//! let mut entries = load_definitions_from_json(json).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! for text in LedgerGenerator::new(&mut entries, GenerationRange::default(), &mut rng) {
//!     println!("{}", text);
//! }
//! ```

pub mod engine;
pub mod error;
pub mod recurrence;
pub mod render;
pub mod report;
pub mod report_db;
pub mod schema;
pub mod utils;
pub mod validation;

pub use engine::{generate, GenerationRange, LedgerGenerator};
pub use error::{LedgerSynthError, Result};
pub use recurrence::{EntryDefinition, OnceState};
pub use render::{render_entry, Amount, PostingTemplate, DEFAULT_CURRENCY};
pub use report::{
    build_report, render_chart_data, render_table, write_report, NetWorthPoint, QueryResult,
    ReportPage, ReportSource,
};
pub use report_db::SqliteReportSource;
pub use schema::*;
pub use utils::*;
pub use validation::{validate, ValidationWarning, WarningKind};

use log::info;
use std::path::Path;

/// Converts a parsed document into validated definitions, failing on the first bad record.
pub fn load_definitions(document: DefinitionsDocument) -> Result<Vec<EntryDefinition>> {
    let entries = document
        .entries
        .into_iter()
        .map(EntryDefinition::try_from)
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} entry definitions", entries.len());
    Ok(entries)
}

pub fn load_definitions_from_json(json: &str) -> Result<Vec<EntryDefinition>> {
    load_definitions(DefinitionsDocument::from_json(json)?)
}

pub fn load_definitions_from_file(path: impl AsRef<Path>) -> Result<Vec<EntryDefinition>> {
    load_definitions(DefinitionsDocument::from_file(path)?)
}
