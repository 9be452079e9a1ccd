pub mod tabular;

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::error::{CatalogError, CatalogResult};

/// Outcome of converting a CSV source into the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub source: PathBuf,
    pub database: PathBuf,
    pub records_converted: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub duration_secs: f64,
}

/// Read `csv_path` and replace the catalog with its rows.
///
/// The replace is a single transaction: if anything fails after parsing, the
/// previous catalog stays untouched. With `dry_run` the file is parsed and
/// counted but nothing is written.
pub fn convert_csv(db: &Database, csv_path: &Path, dry_run: bool) -> CatalogResult<ConvertReport> {
    let start = Instant::now();

    if !csv_path.is_file() {
        return Err(CatalogError::SourceNotFound(csv_path.to_path_buf()));
    }

    info!("Reading CSV file: {}", csv_path.display());
    let file = std::fs::File::open(csv_path)?;
    let parsed = tabular::parse_dramas(file)?;
    info!(
        "Loaded {} records from CSV ({} skipped)",
        parsed.dramas.len(),
        parsed.skipped
    );

    let records_converted = if dry_run {
        parsed.dramas.len()
    } else {
        db.replace_all(&parsed.dramas)?;
        db.count()? as usize
    };

    Ok(ConvertReport {
        source: csv_path.to_path_buf(),
        database: db.path.clone(),
        records_converted,
        skipped: parsed.skipped,
        dry_run,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}
