// ABOUTME: Leaderboard route handlers
// ABOUTME: Global view reads through the process-wide cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use super::ServerResources;
use crate::errors::AppError;

/// Leaderboard routes
pub struct LeaderboardRoutes;

impl LeaderboardRoutes {
    /// Create all leaderboard routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/leaderboard", get(Self::handle_global))
            .with_state(resources)
    }

    /// Global leaderboard, top entries by points
    async fn handle_global(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let entries = resources.leaderboard.global().await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }
}
