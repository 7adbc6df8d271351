// ABOUTME: User account and notification route handlers
// ABOUTME: Profile reads expose streak fields and the score ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServerResources;
use crate::errors::AppError;
use crate::models::User;

/// Default page size for notification listings
const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

/// Payload for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Email address, must be unique
    pub email: String,
    /// Public handle, must be unique
    pub username: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Optional profile bio
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

/// User routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", post(Self::handle_create_user))
            .route("/api/users/:id", get(Self::handle_get_user))
            .route("/api/users/:id/score", get(Self::handle_get_score))
            .route(
                "/api/users/:id/notifications",
                get(Self::handle_list_notifications),
            )
            .route(
                "/api/notifications/:id/read",
                post(Self::handle_mark_notification_read),
            )
            .with_state(resources)
    }

    /// Create a user account
    async fn handle_create_user(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreateUserRequest>,
    ) -> Result<Response, AppError> {
        if request.email.trim().is_empty() || request.username.trim().is_empty() {
            return Err(AppError::invalid_input("Email and username are required"));
        }

        let mut user = User::new(request.email, request.username);
        user.display_name = request.display_name;
        user.bio = request.bio;

        resources.db.create_user(&user).await?;
        Ok((StatusCode::CREATED, Json(user)).into_response())
    }

    /// Read a user profile, including streak fields
    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = resources.db.get_user_required(user_id).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Read a user's score ledger entry
    async fn handle_get_score(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        // Validates the user exists before creating the ledger row
        resources.db.get_user_required(user_id).await?;
        let score = resources.db.get_or_create_score(user_id).await?;
        Ok((StatusCode::OK, Json(score)).into_response())
    }

    /// List a user's notifications, newest first
    async fn handle_list_notifications(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<Uuid>,
        Query(params): Query<LimitParams>,
    ) -> Result<Response, AppError> {
        let limit = params.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT);
        let notifications = resources.db.list_notifications(user_id, limit).await?;
        Ok((StatusCode::OK, Json(notifications)).into_response())
    }

    /// Mark one notification as read
    async fn handle_mark_notification_read(
        State(resources): State<Arc<ServerResources>>,
        Path(notification_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resources.db.mark_notification_read(notification_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
