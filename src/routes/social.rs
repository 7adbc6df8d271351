// ABOUTME: Social graph route handlers: posts, likes, comments, follows
// ABOUTME: Every mutation runs the counter maintainer inside its transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServerResources;
use crate::errors::AppError;
use crate::models::Post;

/// Default page size for feed and comment listings
const DEFAULT_LISTING_LIMIT: usize = 50;

/// Payload for creating a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    /// Author
    pub user_id: Uuid,
    /// Post body
    pub content: String,
}

/// Payload for liking a post or similar single-user actions
#[derive(Debug, Deserialize)]
pub struct UserActionRequest {
    /// Acting user
    pub user_id: Uuid,
}

/// Payload for commenting on a post
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    /// Commenting user
    pub user_id: Uuid,
    /// Comment body
    pub content: String,
}

/// Payload for creating a follow request
#[derive(Debug, Deserialize)]
pub struct CreateFollowRequestRequest {
    /// Requesting user
    pub from_user_id: Uuid,
    /// Requested user
    pub to_user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct UserIdParams {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct FollowEdgeParams {
    follower_id: Uuid,
    following_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

/// Social routes
pub struct SocialRoutes;

impl SocialRoutes {
    /// Create all social routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/posts", post(Self::handle_create_post))
            .route("/api/posts/:id", get(Self::handle_get_post))
            .route("/api/users/:id/feed", get(Self::handle_feed))
            .route(
                "/api/posts/:id/like",
                post(Self::handle_like).delete(Self::handle_unlike),
            )
            .route(
                "/api/posts/:id/comments",
                post(Self::handle_create_comment).get(Self::handle_list_comments),
            )
            .route("/api/comments/:id", delete(Self::handle_delete_comment))
            .route(
                "/api/follow-requests",
                post(Self::handle_create_follow_request),
            )
            .route(
                "/api/follow-requests/:id/accept",
                post(Self::handle_accept_follow_request),
            )
            .route(
                "/api/follow-requests/:id/reject",
                post(Self::handle_reject_follow_request),
            )
            .route("/api/follows", delete(Self::handle_unfollow))
            .with_state(resources)
    }

    /// Create a post
    async fn handle_create_post(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreatePostRequest>,
    ) -> Result<Response, AppError> {
        if request.content.trim().is_empty() {
            return Err(AppError::invalid_input("Post content cannot be empty"));
        }
        resources.db.get_user_required(request.user_id).await?;

        let now = chrono::Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            content: request.content,
            created_at: now,
            updated_at: now,
            likes_count: 0,
            comments_count: 0,
        };

        resources.db.create_post(&post).await?;
        Ok((StatusCode::CREATED, Json(post)).into_response())
    }

    /// Read a post with its denormalized counters
    async fn handle_get_post(
        State(resources): State<Arc<ServerResources>>,
        Path(post_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let post = resources.db.get_post_required(post_id).await?;
        Ok((StatusCode::OK, Json(post)).into_response())
    }

    /// Posts from the user and everyone they follow
    async fn handle_feed(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<Uuid>,
        Query(params): Query<LimitParams>,
    ) -> Result<Response, AppError> {
        let limit = params.limit.unwrap_or(DEFAULT_LISTING_LIMIT);
        let posts = resources.db.list_feed(user_id, limit).await?;
        Ok((StatusCode::OK, Json(posts)).into_response())
    }

    /// Like a post; a second like from the same user is rejected
    async fn handle_like(
        State(resources): State<Arc<ServerResources>>,
        Path(post_id): Path<Uuid>,
        Json(request): Json<UserActionRequest>,
    ) -> Result<Response, AppError> {
        let like = resources.db.like_post(request.user_id, post_id).await?;
        Ok((StatusCode::CREATED, Json(like)).into_response())
    }

    /// Remove a like
    async fn handle_unlike(
        State(resources): State<Arc<ServerResources>>,
        Path(post_id): Path<Uuid>,
        Query(params): Query<UserIdParams>,
    ) -> Result<Response, AppError> {
        resources.db.unlike_post(params.user_id, post_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Comment on a post
    async fn handle_create_comment(
        State(resources): State<Arc<ServerResources>>,
        Path(post_id): Path<Uuid>,
        Json(request): Json<CreateCommentRequest>,
    ) -> Result<Response, AppError> {
        if request.content.trim().is_empty() {
            return Err(AppError::invalid_input("Comment content cannot be empty"));
        }
        let comment = resources
            .db
            .create_comment(request.user_id, post_id, request.content)
            .await?;
        Ok((StatusCode::CREATED, Json(comment)).into_response())
    }

    /// List a post's comments, oldest first
    async fn handle_list_comments(
        State(resources): State<Arc<ServerResources>>,
        Path(post_id): Path<Uuid>,
        Query(params): Query<LimitParams>,
    ) -> Result<Response, AppError> {
        let limit = params.limit.unwrap_or(DEFAULT_LISTING_LIMIT);
        let comments = resources.db.list_comments(post_id, limit).await?;
        Ok((StatusCode::OK, Json(comments)).into_response())
    }

    /// Delete a comment (author only)
    async fn handle_delete_comment(
        State(resources): State<Arc<ServerResources>>,
        Path(comment_id): Path<Uuid>,
        Query(params): Query<UserIdParams>,
    ) -> Result<Response, AppError> {
        resources
            .db
            .delete_comment(comment_id, params.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Request to follow another user
    async fn handle_create_follow_request(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreateFollowRequestRequest>,
    ) -> Result<Response, AppError> {
        resources.db.get_user_required(request.from_user_id).await?;
        resources.db.get_user_required(request.to_user_id).await?;

        let follow_request = resources
            .db
            .create_follow_request(request.from_user_id, request.to_user_id)
            .await?;
        Ok((StatusCode::CREATED, Json(follow_request)).into_response())
    }

    /// Accept a follow request, creating the follow edge
    async fn handle_accept_follow_request(
        State(resources): State<Arc<ServerResources>>,
        Path(request_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let request = resources.db.accept_follow_request(request_id).await?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Reject a follow request
    async fn handle_reject_follow_request(
        State(resources): State<Arc<ServerResources>>,
        Path(request_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let request = resources.db.reject_follow_request(request_id).await?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Remove a follow edge
    async fn handle_unfollow(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<FollowEdgeParams>,
    ) -> Result<Response, AppError> {
        resources
            .db
            .unfollow(params.follower_id, params.following_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
