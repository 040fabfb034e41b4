use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_hall, send, test_app};

#[tokio::test]
async fn test_capacity_is_derived() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/cinema_halls",
        Some(json!({"name": "Hall A", "rows": 10, "seats_in_row": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["capacity"], 200);
    assert_eq!(body["rows"], 10);
}

#[tokio::test]
async fn test_capacity_follows_updates() {
    let app = test_app().await;
    let id = create_hall(&app, "Hall B", 5, 8).await;
    let uri = format!("/api/cinema/cinema_halls/{id}");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"rows": 7}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 56);

    let (_, body) = send(&app, Method::GET, "/api/cinema/cinema_halls", None).await;
    for hall in body.as_array().unwrap() {
        assert_eq!(
            hall["capacity"].as_i64().unwrap(),
            hall["rows"].as_i64().unwrap() * hall["seats_in_row"].as_i64().unwrap()
        );
    }
}

#[tokio::test]
async fn test_negative_counts_are_rejected() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/cinema_halls",
        Some(json!({"name": "Hall C", "rows": -1, "seats_in_row": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["rows"][0],
        "Ensure this value is greater than or equal to 0."
    );
    assert!(body.get("seats_in_row").is_none());

    let (_, body) = send(&app, Method::GET, "/api/cinema/cinema_halls", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_put_requires_every_field() {
    let app = test_app().await;
    let id = create_hall(&app, "Hall D", 3, 3).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/cinema/cinema_halls/{id}"),
        Some(json!({"name": "Hall D"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["rows"][0], "This field is required.");
    assert_eq!(body["seats_in_row"][0], "This field is required.");
}
