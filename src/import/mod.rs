//! One-time migration of legacy CSV exports into typed transactions.

mod classify;
mod legacy_csv;

use anyhow::Result;
use std::path::Path;

pub use classify::{CardExpenseClassifier, DEFAULT_CARD_KEYWORDS};
pub use legacy_csv::{ImportReport, LegacyImporter, LegacyRow, SkippedRow};

/// Read and migrate a legacy export in one step.
pub fn import_file(path: &Path, classifier: &CardExpenseClassifier) -> Result<ImportReport> {
    let rows = LegacyImporter::read(path)?;
    Ok(LegacyImporter::migrate(&rows, classifier))
}
