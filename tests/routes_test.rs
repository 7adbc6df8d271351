// ABOUTME: Integration tests for the REST surface
// ABOUTME: Drives the full router over an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use stride_server::cache::memory::InMemoryCache;
use stride_server::config::ServerConfig;
use stride_server::routes::{router, ServerResources};

async fn test_router() -> Router {
    let db = common::create_test_database().await;
    let cache = Arc::new(InMemoryCache::new());
    let config = ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".into(),
        gamification: stride_server::config::GamificationConfig::default(),
    };
    router(Arc::new(ServerResources::new(db, cache, &config)))
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .expect("Failed to build request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, value)
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = test_router().await;
    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn workout_lifecycle_over_http() {
    let app = test_router().await;

    let (status, user) = send_json(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "email": "rest@example.com", "username": "rest_user" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["id"].as_str().expect("User id missing").to_owned();

    let start = chrono::Utc::now() - chrono::Duration::minutes(30);
    let (status, session) = send_json(
        &app,
        "POST",
        "/api/workouts",
        Some(json!({
            "user_id": user_id,
            "name": "Evening run",
            "start_time": start.to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["id"].as_str().expect("Session id missing").to_owned();

    let (status, outcome) = send_json(
        &app,
        "POST",
        &format!("/api/workouts/{session_id}/complete"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["newly_completed"], true);
    assert_eq!(outcome["base_points"], 60);
    assert_eq!(outcome["current_streak"], 1);

    // Replay over HTTP is also a no-op
    let (status, replay) = send_json(
        &app,
        "POST",
        &format!("/api/workouts/{session_id}/complete"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["newly_completed"], false);

    let (status, score) =
        send_json(&app, "GET", &format!("/api/users/{user_id}/score"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["points"], 60);
    assert_eq!(score["workouts_completed"], 1);

    let (status, leaderboard) = send_json(&app, "GET", "/api/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(leaderboard[0]["username"], "rest_user");
    assert_eq!(leaderboard[0]["points"], 60);
}

#[tokio::test]
async fn activity_upsert_reports_challenge_progress() {
    let app = test_router().await;

    let (_, user) = send_json(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "email": "steps@example.com", "username": "steps_user" })),
    )
    .await;
    let user_id = user["id"].as_str().expect("User id missing").to_owned();

    let today = chrono::Utc::now().date_naive();
    let (status, challenge) = send_json(
        &app,
        "POST",
        "/api/challenges",
        Some(json!({
            "name": "Step week",
            "start_date": (today - chrono::Duration::days(1)).to_string(),
            "end_date": (today + chrono::Duration::days(5)).to_string(),
            "target": 5000,
            "target_type": "steps",
            "created_by": user_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let challenge_id = challenge["id"].as_str().expect("Challenge id missing").to_owned();

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/challenges/{challenge_id}/join"),
        Some(json!({ "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user_id}/activity/{today}"),
        Some(json!({ "steps": 7000, "distance": 5.2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activity"]["steps"], 7000);
    assert_eq!(body["challenge_progress"][0]["completed"], true);

    let (status, progress) = send_json(
        &app,
        "GET",
        &format!("/api/challenges/{challenge_id}/progress/{user_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["completed"], true);
}

#[tokio::test]
async fn double_like_is_rejected_over_http() {
    let app = test_router().await;

    let (_, author) = send_json(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "email": "poster@example.com", "username": "poster" })),
    )
    .await;
    let author_id = author["id"].as_str().expect("User id missing").to_owned();

    let (_, fan) = send_json(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "email": "liker@example.com", "username": "liker" })),
    )
    .await;
    let fan_id = fan["id"].as_str().expect("User id missing").to_owned();

    let (status, post) = send_json(
        &app,
        "POST",
        "/api/posts",
        Some(json!({ "user_id": author_id, "content": "New PR today" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = post["id"].as_str().expect("Post id missing").to_owned();

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/posts/{post_id}/like"),
        Some(json!({ "user_id": fan_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = send_json(
        &app,
        "POST",
        &format!("/api/posts/{post_id}/like"),
        Some(json!({ "user_id": fan_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "invalid_input");

    let (_, stored) = send_json(&app, "GET", &format!("/api/posts/{post_id}"), None).await;
    assert_eq!(stored["likes_count"], 1);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/posts/{post_id}/like?user_id={fan_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stored) = send_json(&app, "GET", &format!("/api/posts/{post_id}"), None).await;
    assert_eq!(stored["likes_count"], 0);
}

#[tokio::test]
async fn unknown_user_maps_to_not_found() {
    let app = test_router().await;
    let missing = uuid::Uuid::new_v4();
    let (status, body) = send_json(&app, "GET", &format!("/api/users/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
