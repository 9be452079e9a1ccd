use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{AppError, AppResult};
use super::AppState;
use crate::db::models::{DbStats, Drama};
use crate::db::Database;
use crate::error::CatalogResult;
use crate::ingest;
use crate::search::filters::Filters;
use crate::search::{Page, SearchPage};

/// Run `f` against a pooled connection on the blocking thread pool.
async fn with_db<T, F>(state: &AppState, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> CatalogResult<T> + Send + 'static,
{
    let pool = state.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let db = pool.get()?;
        f(&db)
    })
    .await?;
    Ok(result?)
}

/// GET /api
pub async fn api_root() -> Json<Value> {
    Json(json!({
        "message": "K-Drama Database API",
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Query string of `GET /search`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

/// GET /search
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<SearchPage>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let page = Page::clamped(
        params.limit.unwrap_or(state.config.default_page_size),
        params.offset.unwrap_or(0),
        state.config.max_page_size,
    );
    let filters = Filters {
        query: params.q,
        genre: params.genre,
        status: params.status,
        min_rating: params.min_rating,
    };

    let result = with_db(&state, move |db| db.search(&filters, page)).await?;

    tracing::debug!(
        total = result.total,
        limit = page.limit,
        offset = page.offset,
        "Search executed"
    );

    Ok(Json(result))
}

/// GET /drama/{id}
pub async fn get_drama(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Drama>> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let drama = with_db(&state, move |db| db.get_drama(id)).await?;
    Ok(Json(drama))
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<DbStats>> {
    let stats = with_db(&state, |db| db.stats()).await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub database: String,
    pub records_converted: usize,
}

/// POST /convert
///
/// Re-imports the configured CSV. An import that leaves the catalog empty is
/// reported as a failure.
pub async fn convert(State(state): State<AppState>) -> AppResult<Json<ConvertResponse>> {
    let csv_path = state.csv_path.clone();
    let report = with_db(&state, move |db| ingest::convert_csv(db, &csv_path, false)).await?;

    if report.records_converted == 0 {
        return Err(AppError::Catalog(crate::error::CatalogError::Ingestion(
            "No records in database".to_string(),
        )));
    }

    tracing::info!(
        records = report.records_converted,
        skipped = report.skipped,
        "Conversion completed"
    );

    Ok(Json(ConvertResponse {
        success: true,
        message: "Conversion completed successfully".to_string(),
        database: report.database.display().to_string(),
        records_converted: report.records_converted,
    }))
}
