//! HTTP-level tests for the catalog API.

mod common;

use axum::http::StatusCode;
use common::{body_json, drama, TestApp};
use dramadb::config::ServerConfig;
use dramadb::db::models::Drama;
use http_body_util::BodyExt;

fn ids(json: &serde_json::Value) -> Vec<i64> {
    json["dramas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["tmdb_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn api_banner_reports_ready() {
    let app = TestApp::new();
    let json = body_json(app.get("/api").await, StatusCode::OK).await;
    assert_eq!(json["status"], "ready");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn search_orders_and_pages() {
    let app = TestApp::new();
    app.seed(&[
        drama(1, "A", 9.0, 100.0),
        drama(2, "B", 9.0, 50.0),
        drama(3, "C", 7.0, 200.0),
    ]);

    let json = body_json(app.get("/search?limit=2&offset=0").await, StatusCode::OK).await;
    assert_eq!(ids(&json), vec![1, 2]);
    assert_eq!(json["total"], 3);
    assert_eq!(json["page_info"]["limit"], 2);
    assert_eq!(json["page_info"]["offset"], 0);
    assert_eq!(json["page_info"]["has_more"], true);

    let json = body_json(app.get("/search?limit=2&offset=2").await, StatusCode::OK).await;
    assert_eq!(ids(&json), vec![3]);
    assert_eq!(json["page_info"]["has_more"], false);
}

#[tokio::test]
async fn search_results_use_the_light_projection() {
    let app = TestApp::new();
    app.seed(&[Drama {
        seasons: Some(1),
        keywords: Some("revenge".into()),
        backdrop_path: Some("/bg.jpg".into()),
        ..drama(1, "The Glory", 8.6, 80.0)
    }]);

    let json = body_json(app.get("/search").await, StatusCode::OK).await;
    let first = &json["dramas"][0];
    assert_eq!(first["title"], "The Glory");
    for omitted in [
        "seasons",
        "average_runtime",
        "country",
        "language",
        "production",
        "vote_count",
        "keywords",
        "backdrop_path",
    ] {
        assert!(first.get(omitted).is_none(), "{omitted} should be omitted");
    }
}

#[tokio::test]
async fn search_filters_combine() {
    let app = TestApp::new();
    app.seed(&[
        Drama {
            overview: Some("Friends from Hospital Playlist".into()),
            genres: Some("Comedy, Drama".into()),
            status: Some("Ended".into()),
            ..drama(1, "Hospital Playlist", 8.7, 40.0)
        },
        Drama {
            genres: Some("Drama, Romance".into()),
            status: Some("Ended".into()),
            ..drama(2, "Crash Landing on You", 8.7, 90.0)
        },
        drama(3, "Unrated", 0.0, 10.0),
    ]);

    let json = body_json(app.get("/search?q=hospital").await, StatusCode::OK).await;
    assert_eq!(ids(&json), vec![1]);

    let json = body_json(
        app.get("/search?genre=Drama&status=Ended&min_rating=8").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids(&json), vec![2, 1]);

    let zero = body_json(app.get("/search?min_rating=0").await, StatusCode::OK).await;
    let none = body_json(app.get("/search").await, StatusCode::OK).await;
    assert_eq!(zero["total"], 3);
    assert_eq!(zero["total"], none["total"]);

    let blank = body_json(app.get("/search?q=%20%20&genre=").await, StatusCode::OK).await;
    assert_eq!(blank["total"], 3);
}

#[tokio::test]
async fn limit_is_clamped_to_configured_maximum() {
    let app = TestApp::with_config(ServerConfig {
        max_page_size: 5,
        ..ServerConfig::default()
    });
    let rows: Vec<Drama> = (1..=12).map(|i| drama(i, "x", 7.0, i as f64)).collect();
    app.seed(&rows);

    let json = body_json(app.get("/search?limit=1000").await, StatusCode::OK).await;
    assert_eq!(json["dramas"].as_array().unwrap().len(), 5);
    assert_eq!(json["page_info"]["limit"], 5);
    assert_eq!(json["page_info"]["has_more"], true);
}

#[tokio::test]
async fn negative_limit_is_a_bad_request() {
    let app = TestApp::new();
    let json = body_json(app.get("/search?limit=-1").await, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn drama_lookup_and_not_found() {
    let app = TestApp::new();
    app.seed(&[Drama {
        country: Some("KR".into()),
        vote_count: Some(42),
        ..drama(7, "Signal", 8.5, 20.0)
    }]);

    let json = body_json(app.get("/drama/7").await, StatusCode::OK).await;
    assert_eq!(json["tmdb_id"], 7);
    assert_eq!(json["country"], "KR");
    assert_eq!(json["vote_count"], 42);
    assert!(json["backdrop_path"].is_null());

    let json = body_json(app.get("/drama/8").await, StatusCode::NOT_FOUND).await;
    assert_eq!(json["error"], "Drama not found");

    let json = body_json(app.get("/drama/abc").await, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn stats_exclude_unrated_and_list_statuses() {
    let app = TestApp::new();
    app.seed(&[
        Drama {
            status: Some("Returning Series".into()),
            genres: Some("Drama".into()),
            ..drama(1, "Rated", 8.5, 1.0)
        },
        Drama {
            status: Some("Ended".into()),
            genres: Some("Drama".into()),
            ..drama(2, "Unrated", 0.0, 1.0)
        },
    ]);

    let json = body_json(app.get("/stats").await, StatusCode::OK).await;
    assert_eq!(json["total_dramas"], 2);
    assert_eq!(json["rating_stats"]["average"], 8.5);
    assert_eq!(json["rating_stats"]["highest"], 8.5);
    assert_eq!(json["rating_stats"]["lowest"], 8.5);
    assert_eq!(json["top_genres"][0]["genre"], "Drama");
    assert_eq!(json["top_genres"][0]["count"], 2);
    assert_eq!(
        json["available_statuses"],
        serde_json::json!(["Ended", "Returning Series"])
    );
}

#[tokio::test]
async fn stats_on_empty_store_are_null() {
    let app = TestApp::new();
    let json = body_json(app.get("/stats").await, StatusCode::OK).await;
    assert_eq!(json["total_dramas"], 0);
    assert!(json["rating_stats"]["average"].is_null());
    assert!(json["rating_stats"]["highest"].is_null());
    assert!(json["rating_stats"]["lowest"].is_null());
}

#[tokio::test]
async fn convert_imports_csv() {
    let app = TestApp::new();
    app.seed(&[drama(999, "Stale", 5.0, 1.0)]);
    app.write_csv(
        "1,Alpha,,Hospital drama,,,Ended,1,16,60,Drama,KR,ko,tvN,,8.1,10,5.0,,,,\n\
         2,Beta,,,,,Ended,1,12,60,Comedy,KR,ko,SBS,,7.2,10,9.0,,,,\n",
    );

    let json = body_json(app.post("/convert").await, StatusCode::OK).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["records_converted"], 2);
    assert!(json["database"].as_str().unwrap().ends_with("kdramas.db"));

    body_json(app.get("/drama/999").await, StatusCode::NOT_FOUND).await;
    let json = body_json(app.get("/search?q=HOSPITAL").await, StatusCode::OK).await;
    assert_eq!(ids(&json), vec![1]);
}

#[tokio::test]
async fn convert_without_csv_is_not_found() {
    let app = TestApp::new();
    let json = body_json(app.post("/convert").await, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "SOURCE_NOT_FOUND");
}

#[tokio::test]
async fn convert_with_no_valid_rows_fails_and_empties_store() {
    let app = TestApp::new();
    app.seed(&[drama(1, "Old", 7.0, 1.0)]);
    app.write_csv(",missing id,,,,,,,,,,,,,,7.0,,1.0,,,,\n");

    let json = body_json(app.post("/convert").await, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(json["code"], "INGESTION_FAILED");

    let stats = body_json(app.get("/stats").await, StatusCode::OK).await;
    assert_eq!(stats["total_dramas"], 0);
    assert!(stats["rating_stats"]["average"].is_null());
}

#[tokio::test]
async fn convert_with_duplicate_ids_keeps_previous_catalog() {
    let app = TestApp::new();
    app.seed(&[drama(1, "Old", 7.0, 1.0)]);
    app.write_csv("5,A,,,,,,,,,,,,,,7.0,,1.0,,,,\n5,B,,,,,,,,,,,,,,7.0,,1.0,,,,\n");

    body_json(app.post("/convert").await, StatusCode::INTERNAL_SERVER_ERROR).await;

    let json = body_json(app.get("/drama/1").await, StatusCode::OK).await;
    assert_eq!(json["title"], "Old");
}

#[tokio::test]
async fn index_and_static_files_are_served() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"<h1>K-Drama</h1>");

    let response = app.get("/static/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn failed_request_does_not_affect_the_next() {
    let app = TestApp::new();
    app.seed(&[drama(1, "A", 8.0, 1.0)]);

    body_json(app.get("/drama/404").await, StatusCode::NOT_FOUND).await;
    let json = body_json(app.get("/drama/1").await, StatusCode::OK).await;
    assert_eq!(json["title"], "A");
}
