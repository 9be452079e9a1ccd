pub mod filters;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::models::DramaSummary;
use crate::db::Database;
use crate::error::CatalogResult;
use filters::Filters;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// The `(offset, limit)` window of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    /// Window with `limit` capped at `max_limit`.
    pub fn clamped(limit: u32, offset: u64, max_limit: u32) -> Self {
        Page {
            limit: limit.min(max_limit),
            offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub limit: u32,
    pub offset: u64,
    pub has_more: bool,
}

/// One page of search results plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub dramas: Vec<DramaSummary>,
    pub total: i64,
    pub page_info: PageInfo,
}

impl Database {
    /// Run a filtered, paginated search ordered by rating then popularity.
    ///
    /// The window and the count query share one compiled predicate, so `total`
    /// always agrees with what paging through every window returns.
    pub fn search(&self, filters: &Filters, page: Page) -> CatalogResult<SearchPage> {
        let pred = filters.compile();
        let where_clause = pred.where_sql();

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM dramas {where_clause}"),
            pred.param_refs().as_slice(),
            |r| r.get(0),
        )?;

        let limit_idx = pred.next_index();
        let sql = format!(
            "SELECT tmdb_id, title, original_title, overview, first_air_date, status,
                    episodes, rating, genres, network, main_cast, poster_path
             FROM dramas
             {where_clause}
             ORDER BY rating DESC, popularity DESC, tmdb_id ASC
             LIMIT ?{limit_idx} OFFSET ?{}",
            limit_idx + 1
        );

        let limit = i64::from(page.limit);
        let offset = i64::try_from(page.offset).unwrap_or(i64::MAX);
        let mut params = pred.param_refs();
        params.push(&limit);
        params.push(&offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), |row| {
            Ok(DramaSummary {
                tmdb_id: row.get(0)?,
                title: row.get(1)?,
                original_title: row.get(2)?,
                overview: row.get(3)?,
                first_air_date: row.get(4)?,
                status: row.get(5)?,
                episodes: row.get(6)?,
                rating: row.get(7)?,
                genres: row.get(8)?,
                network: row.get(9)?,
                main_cast: row.get(10)?,
                poster_path: row.get(11)?,
            })
        })?;

        let mut dramas = Vec::new();
        for row in rows {
            dramas.push(row?);
        }

        debug!(
            clauses = pred.clauses.len(),
            total,
            returned = dramas.len(),
            "search executed"
        );

        let end = page.offset.saturating_add(u64::from(page.limit));
        Ok(SearchPage {
            dramas,
            total,
            page_info: PageInfo {
                limit: page.limit,
                offset: page.offset,
                has_more: end < total.max(0) as u64,
            },
        })
    }
}
