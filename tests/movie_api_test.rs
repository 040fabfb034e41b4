use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{
    create_actor, create_genre, create_hall, create_movie, create_session, send, test_app,
};

#[tokio::test]
async fn test_empty_list() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/cinema/movies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_returns_detail_view() {
    let app = test_app().await;
    let keanu = create_actor(&app, "Keanu", "Reeves").await;
    let carrie = create_actor(&app, "Carrie-Anne", "Moss").await;
    let scifi = create_genre(&app, "Sci-Fi").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/movies",
        Some(json!({
            "title": "The Matrix",
            "description": "A hacker learns the truth.",
            "duration": 136,
            "actors": [carrie, keanu],
            "genres": [scifi],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["title"], "The Matrix");
    assert_eq!(body["genres"], json!([{"id": scifi, "name": "Sci-Fi"}]));
    assert_eq!(body["actors"][0]["id"], keanu);
    assert_eq!(body["actors"][0]["full_name"], "Keanu Reeves");
    assert_eq!(body["actors"][1]["id"], carrie);
}

#[tokio::test]
async fn test_list_view_uses_names() {
    let app = test_app().await;
    let keanu = create_actor(&app, "Keanu", "Reeves").await;
    let action = create_genre(&app, "Action").await;
    let scifi = create_genre(&app, "Sci-Fi").await;
    create_movie(&app, "The Matrix", &[keanu], &[action, scifi]).await;

    let (status, body) = send(&app, Method::GET, "/api/cinema/movies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["genres"], json!(["Action", "Sci-Fi"]));
    assert_eq!(body[0]["actors"], json!(["Keanu Reeves"]));
}

#[tokio::test]
async fn test_nonexistent_actor_is_a_validation_error() {
    let app = test_app().await;
    let genre = create_genre(&app, "Drama").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/movies",
        Some(json!({
            "title": "Ghost",
            "description": "Nobody is in it.",
            "duration": 90,
            "actors": [999],
            "genres": [genre],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["actors"][0], "Invalid pk \"999\" - object does not exist.");
    assert!(body.get("genres").is_none());

    let (_, body) = send(&app, Method::GET, "/api/cinema/movies", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_negative_duration_and_missing_fields() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/movies",
        Some(json!({"title": "Short", "duration": -5, "actors": [], "genres": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["duration"][0],
        "Ensure this value is greater than or equal to 0."
    );
    assert_eq!(body["description"][0], "This field is required.");
    assert!(body.get("actors").is_none());
    assert!(body.get("genres").is_none());
}

#[tokio::test]
async fn test_wrongly_typed_fields_are_reported_per_field() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/movies",
        Some(json!({
            "title": "Typo",
            "description": "Bad payload.",
            "duration": "abc",
            "actors": [],
            "genres": [],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"duration": ["A valid integer is required."]}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/movies",
        Some(json!({
            "title": "Typo",
            "description": "Bad payload.",
            "duration": 90,
            "actors": ["one"],
            "genres": [],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["actors"][0],
        "Incorrect type. Expected pk value, received str."
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cinema/movies",
        Some(json!(["not", "an", "object"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["non_field_errors"][0],
        "Invalid data. Expected a dictionary, but got list."
    );
}

#[tokio::test]
async fn test_patch_with_empty_list_clears_relation() {
    let app = test_app().await;
    let actor = create_actor(&app, "Sigourney", "Weaver").await;
    let genre = create_genre(&app, "Horror").await;
    let id = create_movie(&app, "Alien", &[actor], &[genre]).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/cinema/movies/{id}"),
        Some(json!({"actors": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["actors"], json!([]));
    assert_eq!(body["genres"][0]["id"], genre);

    let (_, body) = send(&app, Method::GET, "/api/cinema/movies", None).await;
    assert_eq!(body[0]["actors"], json!([]));
    assert_eq!(body[0]["genres"], json!(["Horror"]));
}

#[tokio::test]
async fn test_put_replaces_association_sets() {
    let app = test_app().await;
    let a1 = create_actor(&app, "Keanu", "Reeves").await;
    let a2 = create_actor(&app, "Hugo", "Weaving").await;
    let a3 = create_actor(&app, "Joe", "Pantoliano").await;
    let g1 = create_genre(&app, "Action").await;
    let g2 = create_genre(&app, "Sci-Fi").await;
    let id = create_movie(&app, "The Matrix", &[a1, a2], &[g1]).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/cinema/movies/{id}"),
        Some(json!({
            "title": "The Matrix Reloaded",
            "description": "Zion under siege.",
            "duration": 138,
            "actors": [a3, a3, a1],
            "genres": [g2],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], "The Matrix Reloaded");
    let actor_ids: Vec<i64> = body["actors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(actor_ids, vec![a1, a3]);
    assert_eq!(body["genres"], json!([{"id": g2, "name": "Sci-Fi"}]));
}

#[tokio::test]
async fn test_patch_keeps_unmentioned_relations() {
    let app = test_app().await;
    let actor = create_actor(&app, "Sigourney", "Weaver").await;
    let genre = create_genre(&app, "Horror").await;
    let id = create_movie(&app, "Alien", &[actor], &[genre]).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/cinema/movies/{id}"),
        Some(json!({"duration": 117})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration"], 117);
    assert_eq!(body["actors"][0]["id"], actor);
    assert_eq!(body["genres"][0]["id"], genre);
}

#[tokio::test]
async fn test_deleting_movie_cascades_to_sessions() {
    let app = test_app().await;
    let actor = create_actor(&app, "Tom", "Hanks").await;
    let genre = create_genre(&app, "Drama").await;
    let hall = create_hall(&app, "Main", 10, 10).await;
    let movie = create_movie(&app, "Cast Away", &[actor], &[genre]).await;
    let session = create_session(&app, "2024-06-01T19:00:00Z", movie, hall).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/cinema/movies/{movie}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/cinema/movie_sessions/{session}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // actors and genres survive
    let (status, _) = send(&app, Method::GET, &format!("/api/cinema/actors/{actor}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/cinema/genres/{genre}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleting_actor_unlinks_it() {
    let app = test_app().await;
    let keep = create_actor(&app, "Keanu", "Reeves").await;
    let gone = create_actor(&app, "Hugo", "Weaving").await;
    let genre = create_genre(&app, "Action").await;
    let movie = create_movie(&app, "The Matrix", &[keep, gone], &[genre]).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/cinema/actors/{gone}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, &format!("/api/cinema/movies/{movie}"), None).await;
    assert_eq!(body["actors"].as_array().unwrap().len(), 1);
    assert_eq!(body["actors"][0]["id"], keep);
}

#[tokio::test]
async fn test_sort_by_duration() {
    let app = test_app().await;
    let actor = create_actor(&app, "Keanu", "Reeves").await;
    let genre = create_genre(&app, "Action").await;
    let short = create_movie(&app, "Short", &[actor], &[genre]).await;
    let long = create_movie(&app, "Long", &[actor], &[genre]).await;
    send(
        &app,
        Method::PATCH,
        &format!("/api/cinema/movies/{long}"),
        Some(json!({"duration": 200})),
    )
    .await;
    send(
        &app,
        Method::PATCH,
        &format!("/api/cinema/movies/{short}"),
        Some(json!({"duration": 80})),
    )
    .await;

    let sort = url_escape::encode_component(r#"["duration","DESC"]"#);
    let (_, body) = send(&app, Method::GET, &format!("/api/cinema/movies?sort={sort}"), None).await;
    assert_eq!(body[0]["id"], long);
    assert_eq!(body[1]["id"], short);
}
