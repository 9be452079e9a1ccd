use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use dramadb::config::ServerConfig;
use dramadb::db::models::Drama;
use dramadb::db::DbPool;
use dramadb::server::{build_router, AppState};

pub const CSV_HEADER: &str = "tmdb_id,title,original_title,overview,first_air_date,last_air_date,status,seasons,episodes,average_runtime,genres,country,language,network,production,rating,vote_count,popularity,main_cast,keywords,poster_path,backdrop_path\n";

/// A temp directory holding the store, an optional CSV and a static dir.
pub struct TestApp {
    pub dir: tempfile::TempDir,
    pub pool: DbPool,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(mut config: ServerConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<h1>K-Drama</h1>").unwrap();
        config.static_dir = static_dir;

        let pool = DbPool::open(&dir.path().join("kdramas.db"), 4).unwrap();
        let state = AppState::new(pool.clone(), config, dir.path().join("kdramas.csv"));
        TestApp {
            router: build_router(state),
            pool,
            dir,
        }
    }

    pub fn seed(&self, dramas: &[Drama]) {
        self.pool.get().unwrap().replace_all(dramas).unwrap();
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.path().join("kdramas.csv")
    }

    pub fn write_csv(&self, rows: &str) -> PathBuf {
        write_csv(&self.csv_path(), rows)
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri).await
    }

    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.send(Method::POST, uri).await
    }

    async fn send(&self, method: Method, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn write_csv(path: &Path, rows: &str) -> PathBuf {
    std::fs::write(path, format!("{CSV_HEADER}{rows}")).unwrap();
    path.to_path_buf()
}

pub fn drama(id: i64, title: &str, rating: f64, popularity: f64) -> Drama {
    Drama {
        tmdb_id: id,
        title: Some(title.to_string()),
        rating: Some(rating),
        popularity: Some(popularity),
        ..Drama::default()
    }
}

/// Read a response body as JSON, asserting the expected status first.
pub async fn body_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
