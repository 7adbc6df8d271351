// ABOUTME: HTTP route assembly and shared server resources
// ABOUTME: Per-resource routers live in the submodules and share one state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

/// Challenge routes
pub mod challenges;
/// Leaderboard routes
pub mod leaderboard;
/// Social graph routes
pub mod social;
/// User and notification routes
pub mod users;
/// Workout and daily-activity routes
pub mod workouts;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::LeaderboardCache;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::gamification::{ChallengeProgressAggregator, UserLockRegistry, WorkoutCompletionHandler};
use crate::leaderboard::LeaderboardService;

/// Shared state handed to every route handler
pub struct ServerResources {
    /// Database connection pool
    pub db: Database,
    /// Workout completion orchestration
    pub completion: WorkoutCompletionHandler,
    /// Challenge progress aggregation
    pub aggregator: ChallengeProgressAggregator,
    /// Cached leaderboard reads
    pub leaderboard: LeaderboardService,
}

impl ServerResources {
    /// Wire up services over a database and cache backend
    #[must_use]
    pub fn new(db: Database, cache: Arc<dyn LeaderboardCache>, config: &ServerConfig) -> Self {
        let locks = Arc::new(UserLockRegistry::new());
        let aggregator = ChallengeProgressAggregator::new(
            db.clone(),
            Arc::clone(&cache),
            Arc::clone(&locks),
            config.gamification.clone(),
        );
        let completion = WorkoutCompletionHandler::new(
            db.clone(),
            Arc::clone(&cache),
            locks,
            config.gamification.clone(),
            aggregator.clone(),
        );
        let leaderboard = LeaderboardService::new(
            db.clone(),
            cache,
            config.gamification.leaderboard_size,
        );

        Self {
            db,
            completion,
            aggregator,
            leaderboard,
        }
    }
}

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .merge(users::UserRoutes::routes(Arc::clone(&resources)))
        .merge(workouts::WorkoutRoutes::routes(Arc::clone(&resources)))
        .merge(challenges::ChallengeRoutes::routes(Arc::clone(&resources)))
        .merge(social::SocialRoutes::routes(Arc::clone(&resources)))
        .merge(leaderboard::LeaderboardRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Liveness probe
async fn handle_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}
