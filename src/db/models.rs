use serde::{Deserialize, Serialize};

pub const DRAMA_COLUMN_COUNT: usize = 22;

/// Column order of the `dramas` table. Lookup and ingestion both rely on it.
pub const DRAMA_COLUMNS: [&str; DRAMA_COLUMN_COUNT] = [
    "tmdb_id",
    "title",
    "original_title",
    "overview",
    "first_air_date",
    "last_air_date",
    "status",
    "seasons",
    "episodes",
    "average_runtime",
    "genres",
    "country",
    "language",
    "network",
    "production",
    "rating",
    "vote_count",
    "popularity",
    "main_cast",
    "keywords",
    "poster_path",
    "backdrop_path",
];

/// One series row, every column materialised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drama {
    pub tmdb_id: i64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub status: Option<String>,
    pub seasons: Option<i64>,
    pub episodes: Option<f64>,
    pub average_runtime: Option<f64>,
    pub genres: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub network: Option<String>,
    pub production: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<i64>,
    pub popularity: Option<f64>,
    pub main_cast: Option<String>,
    pub keywords: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl Drama {
    /// Map a `SELECT <DRAMA_COLUMNS>` row.
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Drama {
            tmdb_id: row.get(0)?,
            title: row.get(1)?,
            original_title: row.get(2)?,
            overview: row.get(3)?,
            first_air_date: row.get(4)?,
            last_air_date: row.get(5)?,
            status: row.get(6)?,
            seasons: row.get(7)?,
            episodes: row.get(8)?,
            average_runtime: row.get(9)?,
            genres: row.get(10)?,
            country: row.get(11)?,
            language: row.get(12)?,
            network: row.get(13)?,
            production: row.get(14)?,
            rating: row.get(15)?,
            vote_count: row.get(16)?,
            popularity: row.get(17)?,
            main_cast: row.get(18)?,
            keywords: row.get(19)?,
            poster_path: row.get(20)?,
            backdrop_path: row.get(21)?,
        })
    }
}

/// Search-result projection: the full record minus the heavier detail columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DramaSummary {
    pub tmdb_id: i64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<f64>,
    pub rating: Option<f64>,
    pub genres: Option<String>,
    pub network: Option<String>,
    pub main_cast: Option<String>,
    pub poster_path: Option<String>,
}

/// Stats returned by `dramadb stats` and `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbStats {
    pub total_dramas: i64,
    pub rating_stats: RatingStats,
    pub top_genres: Vec<GenreCount>,
    pub available_statuses: Vec<String>,
}

/// Aggregates over rated dramas only (`rating > 0`). All `None` when nothing is rated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingStats {
    pub average: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}
