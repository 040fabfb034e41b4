#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use cinema_catalog::{build_router, migration::Migrator};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

/// A fresh in-memory database, migrated. One connection so every query sees
/// the same database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn setup_test_app(db: &DatabaseConnection) -> Router {
    build_router(db)
}

pub async fn test_app() -> Router {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    setup_test_app(&db)
}

/// Send one request, returning status, headers and the decoded JSON body
/// (`Value::Null` when empty).
pub async fn send_full(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, json) = send_full(app, method, uri, body).await;
    (status, json)
}

/// POST and return the created id, asserting 201.
pub async fn create(app: &Router, collection: &str, body: Value) -> i64 {
    let (status, json) = send(
        app,
        Method::POST,
        &format!("/api/cinema/{collection}"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_i64().unwrap()
}

pub async fn create_genre(app: &Router, name: &str) -> i64 {
    create(app, "genres", json!({"name": name})).await
}

pub async fn create_actor(app: &Router, first_name: &str, last_name: &str) -> i64 {
    create(
        app,
        "actors",
        json!({"first_name": first_name, "last_name": last_name}),
    )
    .await
}

pub async fn create_hall(app: &Router, name: &str, rows: i64, seats_in_row: i64) -> i64 {
    create(
        app,
        "cinema_halls",
        json!({"name": name, "rows": rows, "seats_in_row": seats_in_row}),
    )
    .await
}

pub async fn create_movie(app: &Router, title: &str, actors: &[i64], genres: &[i64]) -> i64 {
    create(
        app,
        "movies",
        json!({
            "title": title,
            "description": format!("About {title}"),
            "duration": 120,
            "actors": actors,
            "genres": genres,
        }),
    )
    .await
}

pub async fn create_session(app: &Router, show_time: &str, movie: i64, cinema_hall: i64) -> i64 {
    create(
        app,
        "movie_sessions",
        json!({"show_time": show_time, "movie": movie, "cinema_hall": cinema_hall}),
    )
    .await
}
