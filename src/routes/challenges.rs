// ABOUTME: Challenge management route handlers
// ABOUTME: Joining and reading progress; recomputation happens on triggers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServerResources;
use crate::errors::AppError;
use crate::models::{Challenge, ChallengeTargetType};

/// Payload for creating a challenge
#[derive(Debug, Deserialize)]
pub struct CreateChallengeRequest {
    /// Challenge name
    pub name: String,
    /// Description shown to participants
    #[serde(default)]
    pub description: String,
    /// First day of the window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the window (inclusive)
    pub end_date: NaiveDate,
    /// Numeric target to reach
    pub target: i64,
    /// Metric the target is measured in
    pub target_type: ChallengeTargetType,
    /// Creating user
    pub created_by: Uuid,
}

/// Payload for joining a challenge
#[derive(Debug, Deserialize)]
pub struct JoinChallengeRequest {
    /// Joining user
    pub user_id: Uuid,
}

/// Challenge routes
pub struct ChallengeRoutes;

impl ChallengeRoutes {
    /// Create all challenge routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/challenges", post(Self::handle_create_challenge))
            .route("/api/challenges/:id", get(Self::handle_get_challenge))
            .route("/api/challenges/:id/join", post(Self::handle_join))
            .route(
                "/api/challenges/:id/deactivate",
                post(Self::handle_deactivate),
            )
            .route(
                "/api/challenges/:id/progress/:user_id",
                get(Self::handle_get_progress),
            )
            .route(
                "/api/challenges/:id/leaderboard",
                get(Self::handle_leaderboard),
            )
            .with_state(resources)
    }

    /// Create a challenge
    async fn handle_create_challenge(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreateChallengeRequest>,
    ) -> Result<Response, AppError> {
        if request.target <= 0 {
            return Err(AppError::invalid_input("Challenge target must be positive"));
        }
        resources.db.get_user_required(request.created_by).await?;

        let challenge = Challenge {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            target: request.target,
            target_type: request.target_type,
            created_by: request.created_by,
            is_active: true,
        };

        resources.db.create_challenge(&challenge).await?;
        Ok((StatusCode::CREATED, Json(challenge)).into_response())
    }

    /// Read a challenge
    async fn handle_get_challenge(
        State(resources): State<Arc<ServerResources>>,
        Path(challenge_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let challenge = resources.db.get_challenge_required(challenge_id).await?;
        Ok((StatusCode::OK, Json(challenge)).into_response())
    }

    /// Join a challenge; joining twice is a no-op
    async fn handle_join(
        State(resources): State<Arc<ServerResources>>,
        Path(challenge_id): Path<Uuid>,
        Json(request): Json<JoinChallengeRequest>,
    ) -> Result<Response, AppError> {
        resources.db.get_user_required(request.user_id).await?;
        resources
            .db
            .join_challenge(challenge_id, request.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Deactivate a challenge so it stops accruing progress
    async fn handle_deactivate(
        State(resources): State<Arc<ServerResources>>,
        Path(challenge_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resources.db.deactivate_challenge(challenge_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Read a user's progress toward a challenge
    async fn handle_get_progress(
        State(resources): State<Arc<ServerResources>>,
        Path((challenge_id, user_id)): Path<(Uuid, Uuid)>,
    ) -> Result<Response, AppError> {
        let progress = resources
            .db
            .get_challenge_progress(user_id, challenge_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Progress for user {user_id} in challenge {challenge_id}"
                ))
            })?;
        Ok((StatusCode::OK, Json(progress)).into_response())
    }

    /// Leaderboard restricted to the challenge's participants
    async fn handle_leaderboard(
        State(resources): State<Arc<ServerResources>>,
        Path(challenge_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resources.db.get_challenge_required(challenge_id).await?;
        let entries = resources.leaderboard.for_challenge(challenge_id).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }
}
