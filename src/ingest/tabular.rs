use std::io::Read;

use tracing::{debug, warn};

use crate::db::models::{Drama, DRAMA_COLUMNS, DRAMA_COLUMN_COUNT};
use crate::error::{CatalogError, CatalogResult};

/// Rows parsed from a CSV source, plus how many were rejected.
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub dramas: Vec<Drama>,
    pub skipped: usize,
}

/// Parse a kdramas CSV.
///
/// Headers are matched to columns by name, ignoring case, a leading BOM and
/// any punctuation (`tmdb_id`, `TMDB ID` and `tmdbId` are the same column).
/// A header that matches nothing keeps its positional meaning. Malformed rows
/// and rows without a usable `tmdb_id` are skipped.
pub fn parse_dramas<R: Read>(reader: R) -> CatalogResult<ParsedCsv> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CatalogError::Ingestion(format!("cannot read CSV header: {e}")))?
        .clone();
    let columns = column_positions(&headers);
    debug!(?columns, "resolved CSV columns");

    let mut parsed = ParsedCsv::default();

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => {
                return Err(CatalogError::Ingestion(format!("reading CSV failed: {e}")));
            }
            Err(e) => {
                warn!("Skipping malformed CSV row: {e}");
                parsed.skipped += 1;
                continue;
            }
        };

        let field = |col: usize| columns[col].and_then(|i| record.get(i)).unwrap_or("");

        let Some(tmdb_id) = parse_int(field(0)) else {
            warn!("Skipping CSV row {} without a valid tmdb_id", line + 2);
            parsed.skipped += 1;
            continue;
        };

        parsed.dramas.push(Drama {
            tmdb_id,
            title: text(field(1)),
            original_title: text(field(2)),
            overview: text(field(3)),
            first_air_date: text(field(4)),
            last_air_date: text(field(5)),
            status: text(field(6)),
            seasons: parse_int(field(7)),
            episodes: parse_real(field(8)),
            average_runtime: parse_real(field(9)),
            genres: text(field(10)),
            country: text(field(11)),
            language: text(field(12)),
            network: text(field(13)),
            production: text(field(14)),
            rating: parse_real(field(15)),
            vote_count: parse_int(field(16)),
            popularity: parse_real(field(17)),
            main_cast: text(field(18)),
            keywords: text(field(19)),
            poster_path: text(field(20)),
            backdrop_path: text(field(21)),
        });
    }

    Ok(parsed)
}

/// For every catalog column, the index of the CSV field that feeds it.
fn column_positions(headers: &csv::StringRecord) -> [Option<usize>; DRAMA_COLUMN_COUNT] {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    let known: Vec<String> = DRAMA_COLUMNS.iter().map(|c| normalize_header(c)).collect();

    let mut positions = [None; DRAMA_COLUMN_COUNT];
    for (col, name) in known.iter().enumerate() {
        positions[col] = normalized.iter().position(|h| h == name).or_else(|| {
            normalized
                .get(col)
                .filter(|h| !known.contains(h))
                .map(|_| col)
        });
    }
    positions
}

fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn text(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Integers may arrive as `12` or, after spreadsheet round trips, `12.0`.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn parse_real(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
